use std::thread;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::protocol::SCORE_COMMAND;
use crate::config::timing::REGISTER_PACING;
use crate::serial::{SerialIo, SerialLink};

/// Leading score of one polling cycle, or `None` when no usable reading was made
pub type ScoreSample = Option<u64>;

/// Reads the per-player score registers and reduces them to the leading score.
pub struct ScorePoller<P> {
    link: SerialLink<P>,
    max_players: u32,
    pacing: Duration,
}

impl<P: SerialIo> ScorePoller<P> {
    pub fn new(link: SerialLink<P>, max_players: u32) -> Self {
        Self {
            link,
            max_players,
            pacing: REGISTER_PACING,
        }
    }

    /// Override the settling pause before each register query
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn link(&self) -> &SerialLink<P> {
        &self.link
    }

    /// Poll each player register in turn and return the highest score.
    ///
    /// Any reply without a readable value voids the whole cycle: a missing
    /// reading is not the same as a score of zero. A player reporting zero
    /// ends the scan, since later player slots cannot be in use either.
    pub fn poll_scores(&mut self) -> ScoreSample {
        let mut scores = Vec::new();

        for player in 1..=self.max_players {
            if !self.pacing.is_zero() {
                thread::sleep(self.pacing);
            }

            let command = format!("{} {}", SCORE_COMMAND, player);
            let reply = match self.link.query(Some(&command)) {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Score query for player {} failed: {}", player, e);
                    return None;
                }
            };

            let Some(score) = parse_register_value(&reply) else {
                debug!("No score in reply for player {}: {:?}", player, reply);
                return None;
            };

            trace!("Player {} score: {}", player, score);
            scores.push(score);

            if score == 0 {
                break;
            }
        }

        scores.into_iter().max()
    }
}

/// Extract the hexadecimal value following the first `=` that has one.
pub fn parse_register_value(reply: &str) -> Option<u64> {
    reply.match_indices('=').find_map(|(idx, _)| {
        let rest = &reply[idx + 1..];
        let end = rest
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        match u64::from_str_radix(&rest[..end], 16) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Register value {:?} out of range: {}", &rest[..end], e);
                None
            }
        }
    })
}

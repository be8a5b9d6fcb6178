//! Persistent storage of the all-time high score.
//!
//! The record is a single JSON object, `{"highscore": N}`, read once at
//! startup and rewritten whenever a finished game beats it.

mod high_score;

pub use high_score::*;

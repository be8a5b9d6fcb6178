//! Reporting finished games.
//!
//! - **Status**: text formatting (`HIGH Score of 1,234,500 posted to ...`)
//! - **Webhook**: the [`Notifier`] seam and its HTTP implementation
//! - **Dispatch**: minimum-score gate and high score persistence

mod dispatch;
mod status;
mod webhook;

pub use dispatch::{DispatchOutcome, NotificationDispatch};
pub use status::{format_score, format_status};
pub use webhook::{Notifier, WebhookNotifier};

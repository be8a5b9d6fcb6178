//! Score register polling.

mod poller;

pub use poller::*;

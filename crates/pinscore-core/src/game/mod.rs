mod event;
mod tracker;

pub use event::*;
pub use tracker::*;

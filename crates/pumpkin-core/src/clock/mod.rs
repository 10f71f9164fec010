mod countdown;
mod latch;

pub use countdown::{Clock, Countdown, FixedClock, SystemClock, MS_PER_HOUR};
pub use latch::EdgeLatch;

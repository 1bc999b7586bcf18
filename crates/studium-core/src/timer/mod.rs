mod clock;
mod session;

pub use clock::{now_ms, WallClock};
pub use session::{IntervalConfig, Phase, RunMode, SessionMode, SessionTimer};

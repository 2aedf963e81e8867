//! Frame timing.
//!
//! Each view owns one `FrameClock` and ticks it once per rendered frame; the
//! delta drives time-based rotation.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};

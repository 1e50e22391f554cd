//! ecode Engine - Clock Source and Frame Timing
//!
//! This crate handles:
//! - The monotonic clock the event scheduler and entities read time from
//! - A manually driven clock for deterministic stepping
//! - Per-frame bookkeeping (frame counter, last frame duration)
//!
//! # Architecture
//!
//! The game loop owns one [`Clock`] and hands it to the event bus at
//! construction. Everything that needs "now" asks the bus, so a test that
//! swaps in a [`ManualClock`] controls time for the whole world.

pub mod clock;
pub mod frame;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use frame::FrameStats;

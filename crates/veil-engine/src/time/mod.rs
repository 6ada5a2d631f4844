//! Time subsystem.
//!
//! Provides the periodic tick schedule behind `EventSource::set_timer`
//! without coupling to the runtime, so it can be tested with synthetic
//! instants.

mod tick_clock;

pub use tick_clock::{TickClock, interval_for_fps};

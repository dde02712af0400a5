//! Utility modules: throttling.

pub mod throttle;

pub use throttle::Throttle;

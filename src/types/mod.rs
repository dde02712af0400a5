//! Core types for roci-stream.

pub mod fragment;
pub mod message;
pub mod step;

pub use fragment::*;
pub use message::*;
pub use step::*;

//! Stages between the feeders and the sinks.
//!
//! - `EventNormalizer`: receives a feeder's events, emits `BroadcastEvent`
//! - `FanOut`: receives every `BroadcastEvent`, offers it to every sink slot

pub mod fan_out;
pub mod normalizer;

pub use fan_out::FanOut;
pub use normalizer::EventNormalizer;

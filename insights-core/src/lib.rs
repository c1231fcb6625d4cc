#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cursor;
pub mod events;
pub mod feeders;
pub mod processors;
pub mod sinks;
pub mod topology;
pub mod utils;

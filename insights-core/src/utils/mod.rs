pub mod jitter;
pub mod shutdown;
pub mod version;

pub use jitter::jittered;
pub use shutdown::{cancelled, sleep_or_cancel};
pub use version::Version;

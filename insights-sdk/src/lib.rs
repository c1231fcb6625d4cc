#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! Wire objects and HTTP clients for the Chainflip insights bot.
//!
//! The [`objects`] module mirrors the payloads returned by the explorer
//! GraphQL endpoint, the node JSON-RPC endpoint and the Dune analytics API.
//! The [`client`] module (behind the `client` feature) talks to those
//! upstreams and to the announcement platforms.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;

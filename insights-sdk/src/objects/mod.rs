//! Upstream payload types.
//!
//! Only the fields that the bot consumes are modelled; everything else in the
//! upstream responses is ignored by serde.

pub mod assets;
pub mod dune;
pub mod graph;
pub mod rpc;

pub use assets::{Asset, AssetInfo, AssetParseError};

use serde::{Deserialize, Deserializer};

/// Deserialize a base-unit amount that may be encoded either as a JSON string
/// or as a JSON integer.
///
/// Explorer amounts routinely exceed `u64`, so the value is kept textual and
/// scaled later by [`Asset::from_base_units`].
pub(crate) fn base_units<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

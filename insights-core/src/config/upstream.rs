//! Upstream endpoints configuration.

use insights_sdk::client::UpstreamEndpoints;

/// Where feeders fetch from, and how announcements link back.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub endpoints: UpstreamEndpoints,
    /// Prefix of swap links; the swap id is appended.
    pub explorer_url: String,
    /// User agent sent with every outbound request.
    pub user_agent: String,
}

//! Feeder loop configuration.

use crate::feeders::FeederSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by every feeder.
#[derive(Debug, Clone)]
pub struct FeedingConfig {
    /// Directory holding the cursor files.
    pub state_dir: PathBuf,
    /// Grace period before the first poll.
    pub feeding_delay: Duration,
}

/// Settings of one feeder.
#[derive(Debug, Clone)]
pub struct FeederConfig {
    pub enabled: bool,
    pub query_delay: Duration,
    /// Explicit cursor file; defaults to a per-feeder file in the state
    /// directory.
    pub cursor_file: Option<PathBuf>,
}

impl FeederConfig {
    pub fn new(enabled: bool, query_delay: Duration) -> Self {
        Self {
            enabled,
            query_delay,
            cursor_file: None,
        }
    }

    pub fn settings(&self, feeding: &FeedingConfig) -> FeederSettings {
        FeederSettings {
            enabled: self.enabled,
            feeding_delay: feeding.feeding_delay,
            query_delay: self.query_delay,
        }
    }

    /// The cursor file of this feeder, `default_name` resolved against
    /// `state_dir` unless overridden.
    pub fn cursor_path(&self, state_dir: &Path, default_name: &str) -> PathBuf {
        self.cursor_file
            .clone()
            .unwrap_or_else(|| state_dir.join(default_name))
    }
}

/// Per-feeder settings for all eight feeders.
#[derive(Debug, Clone)]
pub struct FeedersConfig {
    pub swap: FeederConfig,
    pub incoming_liquidity: FeederConfig,
    pub epoch: FeederConfig,
    pub funding: FeederConfig,
    pub redemption: FeederConfig,
    pub cex_movement: FeederConfig,
    pub cfe_version: FeederConfig,
    pub swap_limits: FeederConfig,
    /// Saved Dune query producing the daily CEX movement rows.
    pub cex_movement_query_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_path_defaults_to_state_dir() {
        let state_dir = Path::new("/var/lib/insights");
        let mut config = FeederConfig::new(true, Duration::from_secs(60));
        assert_eq!(
            config.cursor_path(state_dir, "last_swap_id"),
            PathBuf::from("/var/lib/insights/last_swap_id")
        );

        config.cursor_file = Some(PathBuf::from("/tmp/swap"));
        assert_eq!(config.cursor_path(state_dir, "last_swap_id"), PathBuf::from("/tmp/swap"));
    }
}

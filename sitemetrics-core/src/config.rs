//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the stats cache coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsCacheConfig {
    /// Maximum age a cached result may have while still being served
    /// without a network call.
    pub freshness_window: Duration,
}

impl Default for StatsCacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(10 * 60),
        }
    }
}

impl StatsCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the freshness window.
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }
}

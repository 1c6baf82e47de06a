//! Registry configuration.

use std::time::Duration;

/// Idle thresholds and sweep cadence for the registry.
///
/// All three are consumed by the periodic sweep: a room or user whose
/// last activity is older than its threshold is removed on the next
/// pass. The gateway can override any of these at startup.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// A room idle longer than this is removed by the sweep.
    pub room_idle_timeout: Duration,

    /// A user idle longer than this is removed by the sweep.
    pub user_idle_timeout: Duration,

    /// How often the sweep runs, independent of request traffic.
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            room_idle_timeout: Duration::from_secs(60 * 60),
            user_idle_timeout: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_thresholds() {
        let config = RegistryConfig::default();
        assert_eq!(config.room_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.user_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }
}

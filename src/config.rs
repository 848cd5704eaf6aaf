use crate::nvme::DEFAULT_ADMIN_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings applied to each admin passthrough command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassthruConfig {
    /// Timeout handed to the driver, in milliseconds. Zero means the default.
    ///
    /// This is advisory: the driver enforces it, the call still blocks until
    /// the driver returns.
    pub timeout_ms: u32,
}

impl Default for PassthruConfig {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_ADMIN_TIMEOUT_MS }
    }
}

impl PassthruConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        self
    }

    /// The timeout that actually goes into the command.
    pub fn effective_timeout_ms(&self) -> u32 {
        if self.timeout_ms == 0 {
            DEFAULT_ADMIN_TIMEOUT_MS
        } else {
            self.timeout_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PassthruConfig::default();
        assert_eq!(cfg.timeout_ms, 5_000);
        assert_eq!(cfg.effective_timeout_ms(), 5_000);
    }

    #[test]
    fn zero_timeout_falls_back() {
        let cfg = PassthruConfig { timeout_ms: 0 };
        assert_eq!(cfg.effective_timeout_ms(), DEFAULT_ADMIN_TIMEOUT_MS);
    }

    #[test]
    fn duration_saturates() {
        let cfg = PassthruConfig::default().with_timeout(Duration::from_secs(2));
        assert_eq!(cfg.timeout_ms, 2_000);
        let cfg = PassthruConfig::default().with_timeout(Duration::from_secs(u64::MAX / 1000));
        assert_eq!(cfg.timeout_ms, u32::MAX);
    }

    #[test]
    fn parses_partial_config() {
        let cfg: PassthruConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PassthruConfig::default());

        let cfg: PassthruConfig = serde_json::from_str(r#"{"timeout_ms": 750}"#).unwrap();
        assert_eq!(cfg.timeout_ms, 750);
    }
}

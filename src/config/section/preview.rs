//! `[preview]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [preview]
//! host_label = "localhost:3000"   # cosmetic address bar prefix
//! watchdog_ms = 5000              # loader is force-hidden after this
//! settle_ms = 100                 # delay between mount and loader fade
//! fade_ms = 300                   # loader fade-out duration
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::super::error::ConfigDiagnostics;

/// Preview document timings and presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSection {
    /// Prefix shown in front of the entry route in the address bar.
    pub host_label: String,

    /// Watchdog timeout that unconditionally hides the loader.
    pub watchdog_ms: u64,

    /// Settle delay after mounting before the loader fades out.
    pub settle_ms: u64,

    /// Loader fade-out duration before removal.
    pub fade_ms: u64,
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            host_label: "localhost:3000".into(),
            watchdog_ms: 5000,
            settle_ms: 100,
            fade_ms: 300,
        }
    }
}

impl PreviewSection {
    pub const fn watchdog(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }

    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.watchdog_ms == 0 {
            diag.error("preview.watchdog_ms", "watchdog timeout must be positive");
        }
        if self.settle_ms >= self.watchdog_ms {
            diag.error_with_hint(
                "preview.settle_ms",
                format!(
                    "settle delay ({}ms) must be shorter than the watchdog ({}ms)",
                    self.settle_ms, self.watchdog_ms
                ),
                "the watchdog would hide the loader before the component settles",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::error::ConfigDiagnostics;
    use crate::config::test_parse_config;

    #[test]
    fn test_preview_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.preview.watchdog_ms, 5000);
        assert_eq!(config.preview.settle_ms, 100);
        assert_eq!(config.preview.host_label, "localhost:3000");
    }

    #[test]
    fn test_settle_longer_than_watchdog_rejected() {
        let config = test_parse_config("[preview]\nwatchdog_ms = 50\nsettle_ms = 100");
        let mut diag = ConfigDiagnostics::new();
        config.preview.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, "preview.settle_ms");
    }
}

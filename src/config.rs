//! Ambient configuration for the validation engine.
//!
//! Kept deliberately small: generation, integration, and performance
//! knobs that a full configuration surface might carry have no
//! counterpart here because nothing in this crate consumes them.

use std::time::Duration;

/// Engine-wide configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a `url_reachable` HEAD request may take before being
    /// treated as unreachable.
    pub url_reachability_timeout: Duration,
    /// Whether `url_reachable: true` is a hard validation failure or
    /// downgraded to a non-fatal diagnostic. Defaults to hard-failing.
    pub url_reachability_hard_fail: bool,
    /// Upper bound on import chain depth, independent of cycle detection.
    pub max_import_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url_reachability_timeout: Duration::from_secs(3),
            url_reachability_hard_fail: true,
            max_import_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.url_reachability_timeout, Duration::from_secs(3));
        assert!(cfg.url_reachability_hard_fail);
        assert_eq!(cfg.max_import_depth, 64);
    }
}

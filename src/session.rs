//! Session expiry policy.
//!
//! Maps each published idle-seconds value to a verdict: quiet, warn the
//! user, or expire the session.

use crate::config::Config;

/// Verdict for a given idle duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionVerdict {
    /// Within the quiet window; nothing to report.
    Fine,
    /// Approaching expiry; carries the idle seconds for display.
    Warn(u64),
    /// Past the expiry threshold; the session should be terminated.
    Expired(u64),
}

/// Threshold policy evaluated against the idle counter.
///
/// The tracker itself knows nothing about thresholds; they belong to
/// whoever consumes the counter stream.
#[derive(Debug)]
pub struct SessionPolicy {
    /// Idle seconds up to (and including) which the session counts as active.
    warn_after: u64,

    /// Idle seconds after which the session expires.
    expire_after: u64,
}

impl SessionPolicy {
    /// Create a policy from config thresholds.
    pub fn from_config(config: &Config) -> Self {
        Self {
            warn_after: config.warn_after_seconds,
            expire_after: config.expire_after_seconds,
        }
    }

    /// Classify an idle-seconds value.
    pub fn evaluate(&self, idle_seconds: u64) -> SessionVerdict {
        if idle_seconds <= self.warn_after {
            SessionVerdict::Fine
        } else if idle_seconds <= self.expire_after {
            SessionVerdict::Warn(idle_seconds)
        } else {
            SessionVerdict::Expired(idle_seconds)
        }
    }

    /// Status line shown while the session approaches expiry.
    pub fn warning_message(idle_seconds: u64) -> String {
        format!("No user activity for {idle_seconds} seconds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_policy() -> SessionPolicy {
        SessionPolicy::from_config(&Config::default())
    }

    #[test]
    fn test_quiet_window() {
        let policy = default_policy();

        for seconds in 0..=4 {
            assert_eq!(policy.evaluate(seconds), SessionVerdict::Fine);
        }
    }

    #[test]
    fn test_warning_window() {
        let policy = default_policy();

        assert_eq!(policy.evaluate(5), SessionVerdict::Warn(5));
        assert_eq!(policy.evaluate(10), SessionVerdict::Warn(10));
        assert_eq!(policy.evaluate(20), SessionVerdict::Warn(20));
    }

    #[test]
    fn test_expiry() {
        let policy = default_policy();

        assert_eq!(policy.evaluate(21), SessionVerdict::Expired(21));
        assert_eq!(policy.evaluate(300), SessionVerdict::Expired(300));
    }

    #[test]
    fn test_warning_message_includes_the_value() {
        assert!(SessionPolicy::warning_message(10).contains("10"));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = Config {
            warn_after_seconds: 60,
            expire_after_seconds: 300,
            ..Default::default()
        };
        let policy = SessionPolicy::from_config(&config);

        assert_eq!(policy.evaluate(60), SessionVerdict::Fine);
        assert_eq!(policy.evaluate(61), SessionVerdict::Warn(61));
        assert_eq!(policy.evaluate(300), SessionVerdict::Warn(300));
        assert_eq!(policy.evaluate(301), SessionVerdict::Expired(301));
    }

    #[test]
    fn test_counter_walkthrough() {
        // A session idling from 0 to past expiry crosses the verdicts in
        // order and exactly once each way.
        let policy = default_policy();
        let verdicts: Vec<_> = (0..=21).map(|s| policy.evaluate(s)).collect();

        assert_eq!(
            verdicts.iter().filter(|v| **v == SessionVerdict::Fine).count(),
            5
        );
        assert_eq!(
            verdicts
                .iter()
                .filter(|v| matches!(v, SessionVerdict::Warn(_)))
                .count(),
            16
        );
        assert_eq!(verdicts.last(), Some(&SessionVerdict::Expired(21)));
    }
}

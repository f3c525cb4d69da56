// Stitching configuration
//
// The thresholds are policy constants, not structural invariants: the
// continuation threshold defines the same-session cutoff, the look-back
// window bounds the history query. They are independent controls.

use std::time::Duration;

const DEFAULT_CONTINUATION_THRESHOLD: Duration = Duration::from_secs(5);
const DEFAULT_LOOKBACK_WINDOW: Duration = Duration::from_secs(30 * 60);
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunable session-stitching policy, passed into the resolver at construction.
#[derive(Debug, Clone)]
pub struct StitchConfig {
    /// Maximum gap between consecutive events for them to share a session.
    /// Exclusive on the continuation side: a gap equal to the threshold
    /// starts a new session.
    pub continuation_threshold: Duration,
    /// How far back the history query looks for the session anchor record.
    /// A safety bound for the query, far wider than any expected session.
    pub lookback_window: Duration,
    /// Upper bound on one history query. A timeout fails the request;
    /// it never silently degrades into "new session".
    pub query_timeout: Duration,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            continuation_threshold: DEFAULT_CONTINUATION_THRESHOLD,
            lookback_window: DEFAULT_LOOKBACK_WINDOW,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl StitchConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `STITCH_CONTINUATION_THRESHOLD_MS`
    /// - `STITCH_LOOKBACK_WINDOW_SECS`
    /// - `STITCH_QUERY_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            continuation_threshold: env_duration_ms(
                "STITCH_CONTINUATION_THRESHOLD_MS",
                defaults.continuation_threshold,
            ),
            lookback_window: env_duration_secs(
                "STITCH_LOOKBACK_WINDOW_SECS",
                defaults.lookback_window,
            ),
            query_timeout: env_duration_ms("STITCH_QUERY_TIMEOUT_MS", defaults.query_timeout),
        }
    }
}

fn env_duration_ms(var: &str, default: Duration) -> Duration {
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!(var, value = %raw, "ignoring unparsable duration, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_duration_secs(var: &str, default: Duration) -> Duration {
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                tracing::warn!(var, value = %raw, "ignoring unparsable duration, using default");
                default
            }
        },
        Err(_) => default,
    }
}

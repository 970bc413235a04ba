use std::time::Duration;

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total attempt budget for one `get` call. Must be at least 1 for any
    /// request to be issued.
    pub retries: u32,
    /// Delay before the first retry in milliseconds; each further retry
    /// quadruples it (exponential strategy, no jitter, no cap).
    pub backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retries: 3,
            backoff_base_ms: 4_000,
        }
    }
}

impl ClientOptions {
    /// Backoff delay scheduled after failed attempt number `attempt`
    /// (1-based): `backoff_base_ms * 4^(attempt - 1)`.
    pub(crate) fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 4u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::ClientOptions;
    use std::time::Duration;

    #[test]
    fn default_backoff_schedule_is_attempt_indexed_powers_of_four() {
        let options = ClientOptions::default();
        assert_eq!(options.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(options.backoff_delay(2), Duration::from_secs(16));
        assert_eq!(options.backoff_delay(3), Duration::from_secs(64));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let options = ClientOptions {
            backoff_base_ms: u64::MAX,
            ..ClientOptions::default()
        };
        assert_eq!(
            options.backoff_delay(40),
            Duration::from_millis(u64::MAX)
        );
    }
}

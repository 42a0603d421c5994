//! Bounded exponential backoff around a [`LookupClient`].
//!
//! This is the only retry policy in the system. Delays carry no jitter: one
//! operator presents one code at a time, so there is no herd to spread out.
//! Anything that fans lookups out across many scanners against one store
//! should add jitter before reusing this.

use std::time::Duration;

use tracing::{debug, warn};
use vinscan_model::{FatalError, LookupOutcome};

use crate::lookup::LookupClient;

/// Retry/backoff knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls allowed, including the first. Clamped to at least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles per attempt.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (0-indexed): `base * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Sum of every wait a fully failing sequence sleeps through.
    pub fn worst_case_sleep(&self) -> Duration {
        (0..self.max_attempts.max(1).saturating_sub(1))
            .map(|attempt| self.delay_after(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Retries [`LookupOutcome::TransientError`]; everything else is terminal.
#[derive(Debug, Clone)]
pub struct RetryingLookup<C> {
    client: C,
    policy: RetryPolicy,
}

impl<C: LookupClient> RetryingLookup<C> {
    /// Wrap `client` with `policy`.
    pub fn new(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// The policy in effect.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Never returns `TransientError`: once the attempts are spent the last
    /// transient detail comes back as [`FatalError::RetriesExhausted`].
    pub async fn lookup_with_retry(&self, code: &str) -> LookupOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let detail = match self.client.lookup(code).await {
                LookupOutcome::TransientError(detail) => detail,
                terminal => {
                    debug!(code, attempt, "lookup settled");
                    return terminal;
                }
            };

            if attempt + 1 >= max_attempts {
                warn!(code, attempts = max_attempts, error = %detail, "lookup retries exhausted");
                return LookupOutcome::FatalError(FatalError::RetriesExhausted {
                    attempts: max_attempts,
                    last: detail,
                });
            }

            let delay = self.policy.delay_after(attempt);
            warn!(
                code,
                attempt = attempt + 1,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %detail,
                "transient lookup failure, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MockLookupClient;
    use chrono::Utc;
    use mockall::Sequence;
    use tokio::time::Instant;
    use vinscan_model::VerificationRecord;

    fn transient() -> LookupOutcome {
        LookupOutcome::TransientError("connect error".to_string())
    }

    #[test]
    fn delays_double_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(0), Duration::from_millis(100));
        assert_eq!(policy.delay_after(1), Duration::from_millis(200));
        assert_eq!(policy.delay_after(2), Duration::from_millis(400));
        assert_eq!(policy.worst_case_sleep(), Duration::from_millis(300));
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(64), Duration::from_millis(100).saturating_mul(u32::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn always_transient_calls_exactly_max_attempts() {
        let mut client = MockLookupClient::new();
        client.expect_lookup().times(3).returning(|_| transient());

        let retrying = RetryingLookup::new(client, RetryPolicy::default());
        let started = Instant::now();
        let outcome = retrying.lookup_with_retry("1HGCM82633A004352").await;

        assert_eq!(
            outcome,
            LookupOutcome::FatalError(FatalError::RetriesExhausted {
                attempts: 3,
                last: "connect error".to_string(),
            })
        );
        // 100ms + 200ms, no wait after the last attempt.
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_returned_after_one_call() {
        let mut client = MockLookupClient::new();
        client
            .expect_lookup()
            .times(1)
            .returning(|_| LookupOutcome::NotFound);

        let retrying = RetryingLookup::new(client, RetryPolicy::default());
        assert_eq!(
            retrying.lookup_with_retry("1HGCM82633A004352").await,
            LookupOutcome::NotFound
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_errors_are_not_retried() {
        let mut client = MockLookupClient::new();
        client
            .expect_lookup()
            .times(1)
            .returning(|_| LookupOutcome::FatalError(FatalError::Unauthorized));

        let retrying = RetryingLookup::new(client, RetryPolicy::default());
        assert_eq!(
            retrying.lookup_with_retry("1HGCM82633A004352").await,
            LookupOutcome::FatalError(FatalError::Unauthorized)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_when_a_retry_succeeds() {
        let mut seq = Sequence::new();
        let mut client = MockLookupClient::new();
        client
            .expect_lookup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| transient());
        client
            .expect_lookup()
            .withf(|code| code == "1HGCM82633A004352")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|code| {
                LookupOutcome::Found(VerificationRecord::new(
                    code,
                    "Silver Accord",
                    Utc::now(),
                ))
            });

        let retrying = RetryingLookup::new(client, RetryPolicy::default());
        let started = Instant::now();
        let outcome = retrying.lookup_with_retry("1HGCM82633A004352").await;

        assert!(outcome.is_found());
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_calls_once() {
        let mut client = MockLookupClient::new();
        client.expect_lookup().times(1).returning(|_| transient());

        let retrying = RetryingLookup::new(
            client,
            RetryPolicy {
                max_attempts: 0,
                backoff_base: Duration::from_millis(100),
            },
        );
        assert!(matches!(
            retrying.lookup_with_retry("1HGCM82633A004352").await,
            LookupOutcome::FatalError(FatalError::RetriesExhausted { attempts: 1, .. })
        ));
    }
}

//! Bounded retry with exponential backoff for generation calls.
//!
//! After attempt `i` (0-indexed) fails, the client waits `base * 2^i` before
//! the next attempt. A success short-circuits; exhausting every attempt
//! yields the fallback apology instead of an error. State is per call.

use crate::generator::{GenerateError, TextGenerator};
use async_trait::async_trait;
use attune_shared::{GenerationRequest, FALLBACK_APOLOGY};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Attempt ceiling and delay schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Scale each delay by a random factor in [0.5, 1.0]
    pub jitter: bool,
    /// Upper bound on a single delay
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            jitter: false,
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with no delay between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            jitter: false,
            max_delay: None,
        }
    }

    /// Deterministic delay after failed attempt `attempt`: `base * 2^attempt`,
    /// capped by `max_delay` when set.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Delay actually waited after failed attempt `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        if !self.jitter {
            return delay;
        }
        let factor: f64 = rand::thread_rng().gen_range(0.5..=1.0);
        // Near Duration::MAX the f64 round trip can exceed the range
        Duration::try_from_secs_f64(delay.as_secs_f64() * factor)
            .map_or(delay, |scaled| scaled.min(delay))
    }

    /// Longest total time spent sleeping between attempts.
    pub fn total_backoff(&self) -> Duration {
        let sleeps = self.max_attempts.saturating_sub(1);
        let head = sleeps.min(u32::BITS);
        let total = (0..head)
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add);
        // From attempt 32 on the factor is pinned at u32::MAX
        total.saturating_add(self.backoff(u32::BITS).saturating_mul(sleeps - head))
    }
}

/// Waits between attempts. Swapped out in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer; other tasks keep running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of a generation call after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Trimmed, non-empty generated text
    Response(String),
    /// Every attempt failed
    Exhausted { fallback: String, attempts: u32 },
}

impl GenerationOutcome {
    pub fn exhausted(attempts: u32) -> Self {
        Self::Exhausted {
            fallback: FALLBACK_APOLOGY.to_string(),
            attempts,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Response(text) => text,
            Self::Exhausted { fallback, .. } => fallback,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Response(text) => text,
            Self::Exhausted { fallback, .. } => fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Generator wrapped with the retry policy.
#[derive(Clone)]
pub struct GenerationClient {
    generator: Arc<dyn TextGenerator>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        sleeper: Arc<dyn Sleeper>,
        mut policy: RetryPolicy,
    ) -> Self {
        policy.max_attempts = policy.max_attempts.max(1);
        Self {
            generator,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate a reply, retrying failures. Never fails.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let max_attempts = self.policy.max_attempts;
        let mut last_error: Option<GenerateError> = None;

        for attempt in 0..max_attempts {
            let error = match self.generator.generate(request).await {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        debug!("Generation succeeded on attempt {}/{}", attempt + 1, max_attempts);
                        return GenerationOutcome::Response(text.to_string());
                    }
                    GenerateError::EmptyResponse
                }
                Err(e) => e,
            };

            warn!("Generation attempt {}/{} failed: {}", attempt + 1, max_attempts, error);
            last_error = Some(error);

            if attempt + 1 < max_attempts {
                let delay = self.policy.delay_for(attempt);
                debug!("Retrying generation in {:?}", delay);
                self.sleeper.sleep(delay).await;
            }
        }

        if let Some(e) = &last_error {
            error!("Generation failed after {} attempts: {}", max_attempts, e);
        }
        GenerationOutcome::exhausted(max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_sequence() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (0..5).map(|i| policy.backoff(i)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(16),
            ]
        );
    }

    #[test]
    fn test_backoff_scales_with_base() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(50),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(50));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_cap() {
        let policy = RetryPolicy {
            max_delay: Some(Duration::from_secs(5)),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(5));
        assert_eq!(policy.backoff(4), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert!(policy.backoff(64) >= policy.backoff(31));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = RetryPolicy {
            jitter: true,
            ..RetryPolicy::default()
        };
        for attempt in 0..5 {
            let full = policy.backoff(attempt);
            for _ in 0..20 {
                let d = policy.delay_for(attempt);
                assert!(d <= full);
                assert!(d >= full / 2);
            }
        }
    }

    #[test]
    fn test_jitter_survives_saturated_backoff() {
        let policy = RetryPolicy {
            max_attempts: u32::MAX,
            base_delay: Duration::MAX,
            jitter: true,
            max_delay: None,
        };
        for attempt in [0, 1, 31, 64, u32::MAX - 1] {
            assert!(policy.delay_for(attempt) <= policy.backoff(attempt));
        }
        assert_eq!(policy.total_backoff(), Duration::MAX);
    }

    #[test]
    fn test_total_backoff() {
        assert_eq!(RetryPolicy::default().total_backoff(), Duration::from_secs(15));
        assert_eq!(RetryPolicy::immediate(5).total_backoff(), Duration::ZERO);

        let single = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(single.total_backoff(), Duration::ZERO);

        let many = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_nanos(1),
            ..RetryPolicy::default()
        };
        let expected = (0..39).fold(Duration::ZERO, |acc, i| acc + many.backoff(i));
        assert_eq!(many.total_backoff(), expected);
    }

    #[test]
    fn test_outcome_text() {
        let ok = GenerationOutcome::Response("hello".to_string());
        assert_eq!(ok.text(), "hello");
        assert!(!ok.is_fallback());

        let gone = GenerationOutcome::exhausted(5);
        assert_eq!(gone.text(), FALLBACK_APOLOGY);
        assert!(gone.is_fallback());
        assert_eq!(gone.into_text(), FALLBACK_APOLOGY);
    }
}

//! Bounded retry with exponential backoff.
//!
//! The default policy never retries: a failed request aborts the download as
//! soon as it happens. `--retries N` allows up to `N` extra attempts for
//! failures that are plausibly transient (connect/timeout errors, 429, 5xx).

use std::time::Duration;

use log::warn;

use crate::error::AppError;

const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Outcome of a single failed attempt.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Worth trying again (if the policy allows).
    Transient(AppError),
    /// Retrying cannot help.
    Permanent(AppError),
}

impl Failure {
    fn into_error(self) -> AppError {
        match self {
            Failure::Transient(e) | Failure::Permanent(e) => e,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_retries(0)
    }
}

impl RetryPolicy {
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Backoff before retry number `retry` (0-based): `base * 2^retry`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or the retry budget is spent.
    pub fn run<T>(&self, mut op: impl FnMut() -> Result<T, Failure>) -> Result<T, AppError> {
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(Failure::Transient(err)) if retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    warn!(
                        "attempt {} failed: {err}; retrying in {:.1}s",
                        retry + 1,
                        delay.as_secs_f64()
                    );
                    std::thread::sleep(delay);
                    retry += 1;
                }
                Err(failure) => return Err(failure.into_error()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::with_retries(10);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(6), Duration::from_secs(60));
        assert_eq!(policy.delay_for(40), Duration::from_secs(60));
    }

    #[test]
    fn default_policy_fails_on_first_error() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::default().run(|| {
            calls += 1;
            Err(Failure::Transient(AppError::transport("boom")))
        });
        assert_eq!(calls, 1);
        assert_eq!(result.unwrap_err().message(), "boom");
    }

    #[test]
    fn transient_failures_are_retried_until_success() {
        let mut calls = 0;
        let result = instant(3).run(|| {
            calls += 1;
            if calls < 3 {
                Err(Failure::Transient(AppError::transport("flaky")))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn retry_budget_is_bounded() {
        let mut calls = 0;
        let result: Result<(), _> = instant(2).run(|| {
            calls += 1;
            Err(Failure::Transient(AppError::transport("down")))
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = instant(5).run(|| {
            calls += 1;
            Err(Failure::Permanent(AppError::transport("403")))
        });
        assert_eq!(calls, 1);
        assert_eq!(result.unwrap_err().exit_code(), crate::error::EXIT_TRANSPORT);
    }
}

use std::thread;
use std::time::Duration;

use crate::error::ScanError;

/// Bounded retry with doubling backoff. Every registry and flat-record call
/// in the crate goes through [`RetryPolicy::run`]; nothing else retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_tries: usize,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 3,
            initial_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_tries: usize, initial_delay: Duration) -> Self {
        Self {
            max_tries: max_tries.max(1),
            initial_delay,
        }
    }

    /// Policy that retries immediately. Used by tests.
    pub fn immediate(max_tries: usize) -> Self {
        Self::new(max_tries, Duration::ZERO)
    }

    /// The sleep schedule between attempts: initial delay, doubling each
    /// retry, one entry per retry slot.
    pub fn backoff_delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_tries.saturating_sub(1) as u32).map(|slot| self.initial_delay * (1 << slot))
    }

    /// Attempt `op` up to `max_tries` times, sleeping the backoff schedule
    /// between failures. The final failure is logged with `label` context
    /// and returned as the terminal error.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T, ScanError>
    where
        F: FnMut() -> Result<T, ScanError>,
    {
        let mut delays = self.backoff_delays();
        let mut attempt = 1usize;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let Some(delay) = delays.next() else {
                        tracing::error!(label, attempts = attempt, error = %err, "giving up");
                        return Err(err);
                    };
                    tracing::warn!(
                        label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "fetch failed, retrying"
                    );
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn delays_double_from_initial() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let delays: Vec<_> = policy.backoff_delays().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[test]
    fn succeeds_on_third_attempt() {
        let policy = RetryPolicy::immediate(3);
        let mut calls = 0usize;
        let payload = policy
            .run("test", || {
                calls += 1;
                if calls < 3 {
                    Err(ScanError::EntrezHttp("boom".to_string()))
                } else {
                    Ok("payload")
                }
            })
            .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(payload, "payload");
    }

    #[test]
    fn exhausts_and_returns_last_error() {
        let policy = RetryPolicy::immediate(2);
        let mut calls = 0usize;
        let err = policy
            .run::<(), _>("test", || {
                calls += 1;
                Err(ScanError::UniprotHttp(format!("attempt {calls}")))
            })
            .unwrap_err();
        assert_eq!(calls, 2);
        assert_matches!(err, ScanError::UniprotHttp(message) if message == "attempt 2");
    }
}

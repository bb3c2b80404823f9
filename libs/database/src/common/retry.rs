use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff for startup work such as the first database connect.
///
/// Defaults: 3 retries after the initial attempt, 100ms doubling up to 5s,
/// with jitter.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Scale each delay into the 50%..100% band
    pub use_jitter: bool,
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    pub fn with_initial_delay(self, initial_delay_ms: u64) -> Self {
        Self {
            initial_delay_ms,
            ..self
        }
    }

    pub fn with_max_delay(self, max_delay_ms: u64) -> Self {
        Self {
            max_delay_ms,
            ..self
        }
    }

    pub fn without_jitter(self) -> Self {
        Self {
            use_jitter: false,
            ..self
        }
    }

    /// Sleep durations between attempts, in order, one per retry
    fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(move |retry| {
            let scaled = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(retry as i32);
            let capped = (scaled as u64).min(self.max_delay_ms);
            let ms = if self.use_jitter {
                jitter(capped)
            } else {
                capped
            };
            Duration::from_millis(ms)
        })
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Run `operation` until it succeeds or the retries in `config` run out.
///
/// The last error is returned unchanged.
///
/// ```ignore
/// use database::common::{RetryConfig, retry_with_backoff};
///
/// let db = retry_with_backoff(
///     || database::postgres::connect(&url),
///     RetryConfig::new().with_max_retries(5),
/// )
/// .await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delays = config.delays();
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let Some(delay) = delays.next() else {
            warn!(attempts = attempt, "Giving up: {}", error);
            return Err(error);
        };

        debug!(
            attempt,
            max_retries = config.max_retries,
            delay_ms = delay.as_millis() as u64,
            "Attempt failed: {}",
            error
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// [`retry_with_backoff`] with the default [`RetryConfig`]
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}

/// Somewhere in 50%..100% of `delay_ms`
fn jitter(delay_ms: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::SystemTime::now()) % 51;
    delay_ms * percent / 100
}

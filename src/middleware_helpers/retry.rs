use crate::errors::ServiceError;
use metrics::counter;
use rand::Rng;
use sea_orm::{sqlx, DbErr, RuntimeErr};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Factor to multiply delay by after each attempt
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Short, jittered retries for transactions that lost a lock race.
    pub fn lock_contention() -> Self {
        Self {
            max_attempts: 30,
            initial_delay: Duration::from_millis(2),
            max_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
        }
    }
}

/// Retry policy for determining if an error is retryable
pub trait RetryPolicy<E> {
    fn is_retryable(&self, error: &E) -> bool;
}

/// Retries transactions aborted by lock contention: SQLite `BUSY`/`LOCKED`
/// and Postgres deadlock or serialization failures. Business errors such as
/// insufficient stock are final.
pub struct LockContentionPolicy;

impl RetryPolicy<ServiceError> for LockContentionPolicy {
    fn is_retryable(&self, error: &ServiceError) -> bool {
        match error {
            ServiceError::DatabaseError(err) => is_lock_contention(err),
            _ => false,
        }
    }
}

pub fn is_lock_contention(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) => db_err
            .code()
            .map_or(false, |code| is_contention_code(&code)),
        _ => false,
    }
}

fn is_contention_code(code: &str) -> bool {
    match code {
        // deadlock_detected, serialization_failure
        "40P01" | "40001" => true,
        // SQLite extended codes keep the primary code in the low byte.
        other => other
            .parse::<i32>()
            .map_or(false, |code| matches!(code & 0xff, 5 | 6)),
    }
}

/// Execute an async function with retries
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    policy: impl RetryPolicy<E>,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    debug!("Operation succeeded after {} attempts", attempts);
                }
                return Ok(result);
            }
            Err(error) => {
                if !policy.is_retryable(&error) {
                    return Err(error);
                }
                if attempts >= config.max_attempts {
                    warn!("Operation failed after {} attempts: {}", attempts, error);
                    return Err(error);
                }

                counter!("bikeshop.db.retries", 1);
                let jitter_ms = rand::thread_rng().gen_range(0..=delay.as_millis() as u64);
                let wait = delay + Duration::from_millis(jitter_ms);
                debug!("Attempt {} failed: {}. Retrying in {:?}", attempts, error, wait);

                sleep(wait).await;

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_factor).min(config.max_delay.as_secs_f64()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_factor: 2.0,
        }
    }

    struct Always;

    impl RetryPolicy<String> for Always {
        fn is_retryable(&self, _: &String) -> bool {
            true
        }
    }

    #[test]
    fn contention_codes_cover_sqlite_and_postgres() {
        assert!(is_contention_code("5"));
        assert!(is_contention_code("517"));
        assert!(is_contention_code("6"));
        assert!(is_contention_code("40P01"));
        assert!(is_contention_code("40001"));
        assert!(!is_contention_code("2067"));
        assert!(!is_contention_code("23505"));
    }

    #[test]
    fn business_errors_are_not_retried() {
        let policy = LockContentionPolicy;
        assert!(!policy.is_retryable(&ServiceError::InsufficientStock("x".into())));
        assert!(!policy.is_retryable(&ServiceError::NotFound("x".into())));
        assert!(!policy.is_retryable(&ServiceError::DatabaseError(DbErr::Custom("x".into()))));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(&quick(), Always, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(format!("busy {}", n))
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(&quick(), Always, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("busy".to_string())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

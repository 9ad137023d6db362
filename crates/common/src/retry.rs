//! 启动阶段的重试机制
//!
//! 仅用于建立基础设施连接；请求路径上不做任何重试。

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

/// 重试配置
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 初始延迟
    pub initial_delay: Duration,
    /// 最大延迟
    pub max_delay: Duration,
    /// 退避乘数
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            multiplier: 2.0,
        }
    }

    /// 计算第 n 次重试的延迟
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = (delay_ms as u64).min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }
}

/// 连接类错误的特征片段
const RETRYABLE_PATTERNS: &[&str] = &[
    "connection refused",
    "connection reset",
    "timed out",
    "timeout",
    "temporarily unavailable",
    "too many connections",
    "could not connect",
    "no route to host",
    "broken pipe",
];

/// 判断错误是否值得重试
pub fn is_retryable_error(error: &str) -> bool {
    let lower = error.to_lowercase();
    RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p))
}

/// 带指数退避的异步重试
///
/// 只有连接类错误会被重试；其余错误立即返回。
/// 所有尝试都失败时返回最后一次的错误。
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e)
                if attempt + 1 >= config.max_attempts.max(1)
                    || !is_retryable_error(&e.to_string()) =>
            {
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    error = %e,
                    "Operation failed, no more retries"
                );
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_retry_eventually_succeeds() {
        let counter = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(&fast(), "test", || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("connection refused".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let counter = AtomicU32::new(0);
        let result: Result<(), &str> = with_retry(&fast(), "test", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("connection timed out") }
        })
        .await;

        assert_eq!(result.unwrap_err(), "connection timed out");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let counter = AtomicU32::new(0);
        let result: Result<(), &str> = with_retry(&fast(), "test", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("password authentication failed") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let config = RetryConfig::new(0, Duration::from_millis(1), Duration::from_millis(1));
        let counter = AtomicU32::new(0);
        let _: Result<(), &str> = with_retry(&config, "test", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig::new(5, Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(1));
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error("Connection refused (os error 111)"));
        assert!(is_retryable_error("pool timed out while waiting for an open connection"));
        assert!(!is_retryable_error("password authentication failed"));
    }
}

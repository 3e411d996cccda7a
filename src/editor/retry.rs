//! 一時的な失敗に対する指数バックオフ

use crate::config::Config;
use photo_edit_common::EditError;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// attempt 回目（0始まり）の失敗後の待機時間
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// `is_transient()` な失敗だけを最大 `max_retries` 回まで再試行する
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<T, EditError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EditError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "一時的なエラー、{:?}後に再試行 ({}/{}): {}",
                    delay,
                    attempt + 1,
                    policy.max_retries,
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use crate::error::AppResult;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// 轮询页面状态的间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识订单 / 发票
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 反复执行返回布尔值的 JS 表达式，直到为 true 或超时
    ///
    /// 页面跳转期间执行上下文可能暂时不可用，这类错误按"尚未满足"处理。
    pub async fn poll_until(&self, js_code: &str, timeout: Duration) -> AppResult<bool> {
        poll_with_retry(|| self.eval_as::<bool>(js_code), timeout).await
    }
}

/// 反复执行 `probe` 直到返回 `Ok(true)` 或超时
///
/// 至少执行一次。超时返回 `Ok(false)`；`probe` 的错误在超时前视为"尚未满足"，
/// 只有最后一次执行仍然出错时才返回该错误。
pub async fn poll_with_retry<F, Fut>(mut probe: F, timeout: Duration) -> AppResult<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let last_err = match probe().await {
            Ok(true) => return Ok(true),
            Ok(false) => None,
            Err(e) => {
                debug!("轮询时页面暂不可用: {}", e);
                Some(e)
            }
        };
        if Instant::now() >= deadline {
            return match last_err {
                Some(e) => Err(e),
                None => Ok(false),
            };
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// 把字符串转义为 JS 字面量
pub fn js_literal(value: &str) -> AppResult<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context_destroyed() -> AppError {
        AppError::Other("Execution context was destroyed".to_string())
    }

    #[tokio::test]
    async fn error_during_navigation_is_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let reached = poll_with_retry(
            || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(context_destroyed()),
                    _ => Ok(true),
                }
            },
            Duration::from_secs(2),
        )
        .await;

        assert!(reached.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_error_is_returned_after_deadline() {
        let result = poll_with_retry(
            || async { Err(context_destroyed()) },
            Duration::from_millis(250),
        )
        .await;
        assert!(matches!(result, Err(AppError::Other(ref m)) if m.contains("context")));
    }

    #[tokio::test]
    async fn recovered_but_unmet_condition_is_false() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = poll_with_retry(
            || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(context_destroyed()),
                    _ => Ok(false),
                }
            },
            Duration::from_millis(250),
        )
        .await;
        assert!(!result.unwrap());
    }
}

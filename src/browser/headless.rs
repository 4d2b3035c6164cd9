use crate::error::{AppError, AppResult, BrowserError};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::Path;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 启动无头浏览器并导航到指定 URL
///
/// 未指定 `executable` 时由 chromiumoxide 自动查找本机的 Chrome / Chromium。
pub async fn launch_headless_browser(
    url: &str,
    executable: Option<&Path>,
) -> AppResult<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");
    debug!("目标 URL: {}", url);

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
    ]);
    if let Some(path) = executable {
        builder = builder.chrome_executable(path);
    }
    let config = builder.build().map_err(|message| {
        error!("配置无头浏览器失败: {}", message);
        AppError::from(BrowserError::LaunchFailed { message })
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        AppError::from(BrowserError::LaunchFailed {
            message: e.to_string(),
        })
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page(url)
        .await
        .map_err(|e| AppError::navigation_failed(url, e))?;

    info!("✅ 无头浏览器已导航到: {}", url);
    Ok((browser, page))
}

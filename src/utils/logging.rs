//! 日志工具模块
//!
//! 初始化 tracing 输出，并提供启动信息的格式化输出
use crate::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，`verbose` 为真时为 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息（不输出凭据）
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 发票批量下载");
    info!("📄 清单: {} / {}", config.csv_path.display(), config.xlsx_path.display());
    info!("📂 PDF 目录: {}", config.download_dir.display());
    info!("🧭 发票定位策略: {:?}", config.locate_strategy);
    info!("{}", "=".repeat(60));
}

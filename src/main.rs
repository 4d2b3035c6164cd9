use anyhow::Result;
use download_invoices::utils::logging;
use download_invoices::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 可选
    let _ = dotenvy::dotenv();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let outcome = App::initialize(config).await?.run().await?;
    tracing::info!(
        "批次完成: {} 条结果, 报告 {}",
        outcome.report.len(),
        outcome.report_path.display()
    );

    Ok(())
}

//! 发票批次驱动 - 编排层
//!
//! ## 职责
//!
//! 1. **加载清单**：CSV 优先，其次 XLSX
//! 2. **校验记录**：丢弃无效订单号，确定文件名
//! 3. **逐条处理**：严格按顺序调用 `InvoiceFlow`，会话同一时间只属于一条记录
//! 4. **汇总结果**：每条结果交给 `ResultAggregator`，结束时写出报告
//! 5. **退出登录**：报告写出后退出账户
//!
//! 任意一条记录返回环境故障时，已完成的结果仍会写入报告，其余记录不再处理。

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{PageRenderer, SessionDriver};
use crate::models::{load_work_list, BatchReport};
use crate::services::{normalize, ResultAggregator};
use crate::workflow::{InvoiceCtx, InvoiceFlow};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 批次的最终产物
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// 读取的清单文件
    pub source: Option<PathBuf>,
    pub report: BatchReport,
    pub report_path: PathBuf,
}

/// 运行一个完整批次
pub async fn run_batch(
    session: &dyn SessionDriver,
    renderer: &dyn PageRenderer,
    return_href: &str,
    config: &Config,
) -> AppResult<BatchOutcome> {
    let started_at = Utc::now();

    info!("\n📁 正在读取发票清单...");
    let work_list = load_work_list(&config.csv_path, &config.xlsx_path, &config.xlsx_sheet).await?;
    let records = normalize(&work_list.candidates);

    log_batch_loaded(
        records.len(),
        work_list.candidates.len() - records.len(),
        &work_list.source_label(),
    );

    let flow = InvoiceFlow::new(config);
    let mut aggregator = ResultAggregator::new(config.report_dir.clone());
    let total = records.len();

    for (idx, request) in records.iter().enumerate() {
        let ctx = InvoiceCtx::new(idx + 1, total, return_href);
        info!(
            "{} 下载订单 {} 的发票到文件: {}",
            ctx, request.order_id, request.pdf_filename
        );

        match flow.run(session, renderer, request, &ctx).await {
            Ok(result) => aggregator.record(result),
            Err(e) => {
                error!("{} ❌ 环境故障，批次中止: {}", ctx, e);
                match aggregator.flush(started_at).await {
                    Ok(path) => warn!(
                        "已完成的 {} 条结果写入: {}",
                        aggregator.report().len(),
                        path.display()
                    ),
                    Err(flush_err) => error!("写入部分报告失败: {}", flush_err),
                }
                return Err(e);
            }
        }
    }

    let report_path = aggregator.flush(started_at).await?;
    let report = aggregator.into_report();
    print_final_stats(&report, &report_path);

    session.sign_out().await?;

    Ok(BatchOutcome {
        source: work_list.source,
        report,
        report_path,
    })
}

// ========== 日志辅助函数 ==========

fn log_batch_loaded(total: usize, dropped: usize, source: &str) {
    info!("✓ 将从 {} 下载 {} 张发票", source, total);
    if dropped > 0 {
        warn!("⚠️ {} 条记录缺少有效的 order_id，已忽略", dropped);
    }
}

fn print_final_stats(report: &BatchReport, report_path: &std::path::Path) {
    let saved = report.downloaded_count();
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已保存: {}/{}", saved, report.len());
    info!("❌ 未找到: {}", report.len() - saved);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_path.display());
}

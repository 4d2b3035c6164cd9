//! 结果汇总 - 业务能力层
//!
//! 按到达顺序收集每条记录的结果，批次结束时写出一份 JSON 报告

use crate::error::{AppError, AppResult};
use crate::models::{BatchReport, FetchResult};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 结果汇总器
///
/// 由批次驱动显式持有，不存在全局状态。
pub struct ResultAggregator {
    report_dir: PathBuf,
    report: BatchReport,
}

impl ResultAggregator {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            report: BatchReport::default(),
        }
    }

    /// 追加一条结果
    pub fn record(&mut self, result: FetchResult) {
        debug!(
            "记录结果: {} -> {} (downloaded={})",
            result.order_id, result.pdf_filename, result.downloaded
        );
        self.report.results.push(result);
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    pub fn into_report(self) -> BatchReport {
        self.report
    }

    /// 写出报告，文件名包含批次开始时间（毫秒）
    ///
    /// 同名文件已存在时追加 `-1`、`-2` ... 后缀，不会覆盖之前的报告。
    pub async fn flush(&self, batch_started_at: DateTime<Utc>) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.report_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.report_dir.display().to_string(), e))?;

        let body = serde_json::to_vec_pretty(&self.report)?;
        let stem = format!("invoices-report-{}", batch_started_at.timestamp_millis());

        let mut attempt = 0usize;
        loop {
            let path = report_path(&self.report_dir, &stem, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(&body)
                        .await
                        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
                    file.flush()
                        .await
                        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(AppError::file_write_failed(path.display().to_string(), e)),
            }
        }
    }
}

fn report_path(dir: &Path, stem: &str, attempt: usize) -> PathBuf {
    if attempt == 0 {
        dir.join(format!("{}.json", stem))
    } else {
        dir.join(format!("{}-{}.json", stem, attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedInvoiceRequest;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn request(order_id: &str) -> NormalizedInvoiceRequest {
        NormalizedInvoiceRequest {
            order_id: order_id.to_string(),
            pdf_filename: format!("{}.pdf", order_id),
        }
    }

    #[tokio::test]
    async fn flush_writes_results_in_arrival_order() {
        let dir = TempDir::new().unwrap();
        let mut aggregator = ResultAggregator::new(dir.path().join("reports"));
        aggregator.record(FetchResult::saved(&request("a")));
        aggregator.record(FetchResult::not_found(&request("b")));

        let started = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let path = aggregator.flush(started).await.unwrap();

        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "invoices-report-1700000000123.json"
        );
        let written: Vec<FetchResult> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, aggregator.report().results);
        assert_eq!(written[0].order_id, "a");
        assert_eq!(written[1].order_id, "b");
    }

    #[tokio::test]
    async fn same_timestamp_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let started = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let first = ResultAggregator::new(dir.path()).flush(started).await.unwrap();
        let second = ResultAggregator::new(dir.path()).flush(started).await.unwrap();

        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("-1.json"));
    }

    #[tokio::test]
    async fn empty_batch_writes_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = ResultAggregator::new(dir.path())
            .flush(Utc::now())
            .await
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.trim(), "[]");
    }
}

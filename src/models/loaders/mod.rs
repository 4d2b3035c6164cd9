pub mod csv_loader;
pub mod xlsx_loader;

pub use csv_loader::{load_csv_rows, parse_csv_rows};
pub use xlsx_loader::{load_xlsx_rows, rows_from_grid};

use crate::error::{AppError, AppResult};
use crate::models::invoice::InvoiceRequest;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// 从表格读出的待处理清单
#[derive(Debug, Clone, Default)]
pub struct WorkList {
    /// 实际读取的文件；两个文件都不存在时为 `None`
    pub source: Option<PathBuf>,
    pub candidates: Vec<InvoiceRequest>,
}

impl WorkList {
    pub fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(无数据源)".to_string())
    }
}

/// 加载发票清单
///
/// CSV 存在时只读 CSV（即使它没有可用的行），否则读 XLSX，
/// 两者都不存在时返回空清单。
pub async fn load_work_list(primary: &Path, fallback: &Path, sheet: &str) -> AppResult<WorkList> {
    if file_exists(primary).await? {
        let rows = load_csv_rows(primary).await?;
        info!("✓ 从 {} 读取到 {} 行", primary.display(), rows.len());
        return Ok(WorkList {
            source: Some(primary.to_path_buf()),
            candidates: rows.iter().map(InvoiceRequest::from_row).collect(),
        });
    }
    info!("未找到 {}", primary.display());

    if file_exists(fallback).await? {
        let rows = load_xlsx_rows(fallback, sheet).await?;
        info!("✓ 从 {} 读取到 {} 行", fallback.display(), rows.len());
        return Ok(WorkList {
            source: Some(fallback.to_path_buf()),
            candidates: rows.iter().map(InvoiceRequest::from_row).collect(),
        });
    }
    info!("未找到 {}", fallback.display());

    Ok(WorkList::default())
}

async fn file_exists(path: &Path) -> AppResult<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
}

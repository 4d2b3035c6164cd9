//! 页面渲染器 - 把当前页面打印为 PDF 并写入下载目录

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::session::PageRenderer;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 使用 CDP `Page.printToPDF` 的渲染器
pub struct PdfRenderer {
    page: Page,
    download_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(page: Page, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            page,
            download_dir: download_dir.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for PdfRenderer {
    async fn render_and_save(&self, dom_root: &str, filename: &str) -> AppResult<PathBuf> {
        let render_failed = |message: String| -> AppError {
            BrowserError::RenderFailed {
                filename: filename.to_string(),
                message,
            }
            .into()
        };

        // 记录校验已去掉路径分隔符，这里只防止目录穿越
        let file_name = Path::new(filename)
            .file_name()
            .ok_or_else(|| render_failed("文件名无效".to_string()))?;
        let target = self.download_dir.join(file_name);

        self.page.find_element(dom_root).await.map_err(|_| {
            AppError::from(BrowserError::ElementNotFound {
                selector: dom_root.to_string(),
            })
        })?;

        let params = PrintToPdfParams {
            print_background: Some(true),
            ..Default::default()
        };
        let bytes = self
            .page
            .pdf(params)
            .await
            .map_err(|e| render_failed(e.to_string()))?;
        if bytes.is_empty() {
            return Err(render_failed("生成的 PDF 为空".to_string()));
        }

        fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.download_dir.display().to_string(), e))?;
        fs::write(&target, &bytes)
            .await
            .map_err(|e| AppError::file_write_failed(target.display().to_string(), e))?;

        debug!("PDF 已写入 {} ({} 字节)", target.display(), bytes.len());
        Ok(target)
    }
}

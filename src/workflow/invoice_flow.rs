//! 发票处理流程 - 流程层
//!
//! 核心职责：定义"一条发票记录"的完整处理流程
//!
//! 流程顺序：
//! 1. 搜索订单号
//! 2. 查找发票入口（找不到 → 记录 NotFound）
//! 3. 打开发票页（限时，超时 → 整个批次中止）
//! 4. 转换为 PDF（限时，失败或超时 → 整个批次中止）
//! 5. 无论结果如何，回到订单历史页

use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::{PageRenderer, SessionDriver};
use crate::models::{FetchResult, NormalizedInvoiceRequest};
use crate::workflow::invoice_ctx::InvoiceCtx;

/// 交给渲染器的页面根节点
pub const INVOICE_DOM_ROOT: &str = "body";

/// 发票处理流程
///
/// - 编排单条记录的 搜索 → 查找 → 打开 → 转换 → 返回
/// - 不持有会话，会话由调用方借给它
/// - 返回 `Err` 代表环境故障，调用方应中止批次
pub struct InvoiceFlow {
    invoice_path_fragment: String,
    navigation_timeout: Duration,
    render_timeout: Duration,
}

impl InvoiceFlow {
    /// 创建新的发票处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            invoice_path_fragment: config.invoice_path_fragment.clone(),
            navigation_timeout: config.navigation_timeout(),
            render_timeout: config.render_timeout(),
        }
    }

    pub async fn run(
        &self,
        session: &dyn SessionDriver,
        renderer: &dyn PageRenderer,
        request: &NormalizedInvoiceRequest,
        ctx: &InvoiceCtx,
    ) -> AppResult<FetchResult> {
        if request.order_id.trim().is_empty() || request.pdf_filename.trim().is_empty() {
            warn!("{} ⚠️ 记录缺少订单号或文件名，跳过", ctx);
            session.navigate_to(&ctx.return_href).await?;
            return Ok(FetchResult::skipped(request));
        }

        let outcome = self.fetch_invoice(session, renderer, request, ctx).await;
        let returned = session.navigate_to(&ctx.return_href).await;

        match (outcome, returned) {
            (Ok(result), Ok(())) => Ok(result),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), back) => {
                if let Err(back_err) = back {
                    error!("{} 返回订单历史页也失败了: {}", ctx, back_err);
                }
                Err(e)
            }
        }
    }

    async fn fetch_invoice(
        &self,
        session: &dyn SessionDriver,
        renderer: &dyn PageRenderer,
        request: &NormalizedInvoiceRequest,
        ctx: &InvoiceCtx,
    ) -> AppResult<FetchResult> {
        // ========== 1. 搜索 ==========
        info!("{} 🔍 搜索订单 {}", ctx, request.order_id);
        session.search(&request.order_id).await?;

        // ========== 2. 查找发票入口 ==========
        if !session.locate_invoice_affordance(&request.order_id).await? {
            warn!("{} ⚠️ 订单 {} 没有找到发票", ctx, request.order_id);
            return Ok(FetchResult::not_found(request));
        }

        // ========== 3. 等待发票页 ==========
        let reached = session
            .current_location_includes(&self.invoice_path_fragment, self.navigation_timeout)
            .await?;
        if !reached {
            let actual = session
                .current_location()
                .await
                .unwrap_or_else(|_| "(未知)".to_string());
            error!("{} ❌ 没有进入发票页面, 当前: {}", ctx, actual);
            return Err(BrowserError::NavigationTimeout {
                expected: self.invoice_path_fragment.clone(),
                actual,
                timeout_ms: self.navigation_timeout.as_millis() as u64,
            }
            .into());
        }

        // ========== 4. 转换为 PDF ==========
        let saved = timeout(
            self.render_timeout,
            renderer.render_and_save(INVOICE_DOM_ROOT, &request.pdf_filename),
        )
        .await
        .map_err(|_| -> AppError {
            BrowserError::RenderTimeout {
                filename: request.pdf_filename.clone(),
                timeout_ms: self.render_timeout.as_millis() as u64,
            }
            .into()
        })??;

        info!("{} ✓ 已保存 {}", ctx, saved.display());
        Ok(FetchResult::saved(request))
    }
}

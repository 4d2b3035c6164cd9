//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **凭据检查**：在连接浏览器之前确认 EMAIL / PASSWORD 存在
//! 2. **资源管理**：持有 Browser、会话驱动和渲染器
//! 3. **会话准备**：登录并打开订单历史页
//! 4. **向下委托**：委托 `invoice_batch::run_batch` 处理整个批次

use crate::browser;
use crate::config::{BrowserMode, Config, Credentials};
use crate::infrastructure::{ChromiumSession, JsExecutor, PdfRenderer};
use crate::orchestrator::invoice_batch::{run_batch, BatchOutcome};
use crate::utils::logging::log_startup;
use anyhow::Result;
use chromiumoxide::Browser;

/// 应用主结构
pub struct App {
    config: Config,
    credentials: Credentials,
    _browser: Browser,
    session: ChromiumSession,
    renderer: PdfRenderer,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 凭据缺失时不做任何浏览器操作
        let credentials = Credentials::from_env()?;

        log_startup(&config);

        let (browser, page) = match config.browser_mode {
            BrowserMode::Attach => {
                browser::connect_to_browser_and_page(
                    config.browser_debug_port,
                    Some(&config.target_url),
                    config.target_title.as_deref(),
                )
                .await?
            }
            BrowserMode::Headless => {
                browser::launch_headless_browser(
                    &config.target_url,
                    config.chrome_executable.as_deref(),
                )
                .await?
            }
        };

        let renderer = PdfRenderer::new(page.clone(), config.download_dir.clone());
        let session = ChromiumSession::new(JsExecutor::new(page), &config);

        Ok(Self {
            config,
            credentials,
            _browser: browser,
            session,
            renderer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchOutcome> {
        self.session
            .sign_in(&self.config.target_url, &self.credentials)
            .await?;
        let return_href = self.session.open_order_history().await?;

        let outcome = run_batch(&self.session, &self.renderer, &return_href, &self.config).await?;
        Ok(outcome)
    }
}

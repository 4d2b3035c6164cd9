//! # Download Invoices
//!
//! 按表格清单批量下载订单发票并保存为 PDF
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `SessionDriver` / `PageRenderer` - 会话驱动与渲染器接口
//! - `ChromiumSession` / `PdfRenderer` - 基于 chromiumoxide 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理数据，不接触浏览器
//! - `record_normalizer` - 过滤无效记录，确定 PDF 文件名
//! - `ResultAggregator` - 收集结果并写出批次报告
//!
//! ### ③ 流程层（Workflow）
//! - `InvoiceCtx` - 上下文封装（序号 + 返回地址）
//! - `InvoiceFlow` - 单条记录的流程（搜索 → 查找 → 打开 → 转换 → 返回）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/invoice_batch` - 清单加载、逐条处理、报告、退出登录
//! - `orchestrator/batch_processor` - 应用入口，管理浏览器和登录

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use infrastructure::{LocateStrategy, PageRenderer, SessionDriver};
pub use models::{BatchReport, FetchResult, InvoiceRequest, NormalizedInvoiceRequest};
pub use orchestrator::{run_batch, App, BatchOutcome};
pub use workflow::{InvoiceCtx, InvoiceFlow};

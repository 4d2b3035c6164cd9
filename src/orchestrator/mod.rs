//! 编排层（Orchestration Layer）
//!
//! ```text
//! batch_processor (App: 凭据、浏览器、登录)
//!     ↓
//! invoice_batch (清单 → 校验 → 逐条处理 → 报告 → 退出登录)
//!     ↓
//! workflow::InvoiceFlow (处理单条记录)
//!     ↓
//! services (校验 / 汇总)
//!     ↓
//! infrastructure (会话驱动 / 渲染器)
//! ```

pub mod batch_processor;
pub mod invoice_batch;

pub use batch_processor::App;
pub use invoice_batch::{run_batch, BatchOutcome};

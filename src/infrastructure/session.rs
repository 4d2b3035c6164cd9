//! 会话驱动与页面渲染器的接口
//!
//! 工作流只通过这两个 trait 观察和操作浏览器会话，
//! 具体的 DOM 选择器全部留在实现里。

use crate::error::{AppResult, ConfigError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// 订单列表容器
pub const ORDERS_CONTAINER: &str = "div#ordersContainer";
/// 发票入口的文字
pub const VIEW_INVOICE_TEXT: &str = "View invoice";

/// 查找发票入口的策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocateStrategy {
    /// 在订单列表容器中查找文字为 "View invoice" 的元素
    ContainerText,
    /// 逐个扫描订单卡片，找到包含订单号的那一张，再点击其中的发票链接
    OrderCardScan,
}

impl FromStr for LocateStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "container_text" => Ok(LocateStrategy::ContainerText),
            "order_card_scan" => Ok(LocateStrategy::OrderCardScan),
            other => Err(ConfigError::InvalidValue {
                var_name: "LOCATE_STRATEGY".to_string(),
                value: other.to_string(),
                expected: "container_text | order_card_scan".to_string(),
            }),
        }
    }
}

/// 会话驱动：一个独占的、有状态的浏览上下文
///
/// 同一时间只能有一个工作流使用它。
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// 在订单搜索框中输入并提交搜索
    async fn search(&self, term: &str) -> AppResult<()>;

    /// 在 `timeout` 内当前地址是否包含 `fragment`
    async fn current_location_includes(&self, fragment: &str, timeout: Duration) -> AppResult<bool>;

    /// 当前地址
    async fn current_location(&self) -> AppResult<String>;

    /// 在容器中找到包含 `text_match` 的元素并点击，找不到返回 `false`
    async fn find_and_activate(
        &self,
        container_selector: &str,
        text_match: &str,
    ) -> AppResult<bool>;

    /// 跳转到指定地址
    async fn navigate_to(&self, href: &str) -> AppResult<()>;

    /// 找到并点击该订单的发票入口
    async fn locate_invoice_affordance(&self, _order_id: &str) -> AppResult<bool> {
        self.find_and_activate(ORDERS_CONTAINER, VIEW_INVOICE_TEXT).await
    }

    /// 退出登录
    async fn sign_out(&self) -> AppResult<()>;
}

/// 页面渲染器：把当前页面转换为 PDF 并保存
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 渲染 `dom_root` 所在页面并以 `filename` 保存，完成后返回文件路径
    async fn render_and_save(&self, dom_root: &str, filename: &str) -> AppResult<PathBuf>;
}

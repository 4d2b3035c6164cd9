//! 发票处理上下文
//!
//! 封装"我正在处理清单中的第几条，处理完回到哪里"这一信息

use std::fmt::Display;

/// 发票处理上下文
#[derive(Debug, Clone)]
pub struct InvoiceCtx {
    /// 记录在清单中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 清单中的记录总数
    pub total: usize,

    /// 每条记录处理完后返回的订单历史页地址
    pub return_href: String,
}

impl InvoiceCtx {
    /// 创建新的上下文
    pub fn new(index: usize, total: usize, return_href: impl Into<String>) -> Self {
        Self {
            index,
            total,
            return_href: return_href.into(),
        }
    }
}

impl Display for InvoiceCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[发票 {}/{}]", self.index, self.total)
    }
}

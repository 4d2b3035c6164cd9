use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 表格单元格的值
///
/// CSV 的每个单元格都是文本；XLSX 保留单元格的原始类型，
/// 因此数字 `0` 这样的订单号在后续校验中会被丢弃。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl FieldValue {
    /// 仅当值是非空（非纯空白）字符串时返回
    pub fn as_non_empty_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// 表头 → 单元格值
pub type SheetRow = HashMap<String, FieldValue>;

/// 从表格中读出的一条待处理记录（尚未校验）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceRequest {
    pub order_id: Option<FieldValue>,
    pub pdf_filename: Option<FieldValue>,
}

impl InvoiceRequest {
    /// 按表头取出 `order_id` / `pdf_filename`，多余的列忽略
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            order_id: row.get("order_id").cloned(),
            pdf_filename: row.get("pdf_filename").cloned(),
        }
    }
}

/// 校验并补全文件名之后的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInvoiceRequest {
    pub order_id: String,
    pub pdf_filename: String,
}

impl NormalizedInvoiceRequest {
    /// 已规范化的记录重新作为候选记录
    pub fn to_candidate(&self) -> InvoiceRequest {
        InvoiceRequest {
            order_id: Some(FieldValue::Text(self.order_id.clone())),
            pdf_filename: Some(FieldValue::Text(self.pdf_filename.clone())),
        }
    }
}

pub const MSG_SAVED: &str = "Successfully saved PDF";
pub const MSG_NOT_FOUND: &str = "Could not find an invoice for this order ID";

/// 单条记录的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub order_id: String,
    pub pdf_filename: String,
    pub downloaded: bool,
    pub message: String,
}

impl FetchResult {
    pub fn saved(request: &NormalizedInvoiceRequest) -> Self {
        Self::build(request, true, MSG_SAVED)
    }

    pub fn not_found(request: &NormalizedInvoiceRequest) -> Self {
        Self::build(request, false, MSG_NOT_FOUND)
    }

    /// 记录本不该进入工作流时的结果：不下载，没有说明
    pub fn skipped(request: &NormalizedInvoiceRequest) -> Self {
        Self::build(request, false, "")
    }

    fn build(request: &NormalizedInvoiceRequest, downloaded: bool, message: &str) -> Self {
        Self {
            order_id: request.order_id.clone(),
            pdf_filename: request.pdf_filename.clone(),
            downloaded,
            message: message.to_string(),
        }
    }
}

/// 一个批次的全部结果，按输入顺序排列，序列化为 JSON 数组
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchReport {
    pub results: Vec<FetchResult>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn downloaded_count(&self) -> usize {
        self.results.iter().filter(|r| r.downloaded).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_str_rejects_numbers_and_blanks() {
        assert_eq!(FieldValue::from("111-222").as_non_empty_str(), Some("111-222"));
        assert_eq!(FieldValue::from("").as_non_empty_str(), None);
        assert_eq!(FieldValue::from(" \t ").as_non_empty_str(), None);
        assert_eq!(FieldValue::Number(0.0).as_non_empty_str(), None);
        assert_eq!(FieldValue::Empty.as_non_empty_str(), None);
    }

    #[test]
    fn from_row_ignores_extra_columns() {
        let mut row = SheetRow::new();
        row.insert("order_id".into(), "111-222".into());
        row.insert("notes".into(), "ignored".into());
        let req = InvoiceRequest::from_row(&row);
        assert_eq!(req.order_id, Some(FieldValue::from("111-222")));
        assert_eq!(req.pdf_filename, None);
    }

    #[test]
    fn report_serializes_as_bare_array() {
        let request = NormalizedInvoiceRequest {
            order_id: "111-222".into(),
            pdf_filename: "inv.pdf".into(),
        };
        let report = BatchReport {
            results: vec![FetchResult::not_found(&request)],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "order_id": "111-222",
                "pdf_filename": "inv.pdf",
                "downloaded": false,
                "message": "Could not find an invoice for this order ID"
            }])
        );
    }
}

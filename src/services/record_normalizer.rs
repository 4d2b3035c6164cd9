//! 记录校验 - 业务能力层
//!
//! 丢弃订单号不合法的记录，并为每条记录确定 PDF 文件名

use crate::models::{InvoiceRequest, NormalizedInvoiceRequest};

/// PDF 文件扩展名
pub const PDF_EXTENSION: &str = ".pdf";

/// 文件名中不允许出现的路径分隔符
const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

/// 校验并规范化候选记录
///
/// - 订单号不是非空字符串的记录直接丢弃
/// - 保持输入顺序，不按订单号去重
pub fn normalize(candidates: &[InvoiceRequest]) -> Vec<NormalizedInvoiceRequest> {
    candidates.iter().filter_map(normalize_one).collect()
}

/// 规范化单条记录，订单号无效时返回 `None`
pub fn normalize_one(candidate: &InvoiceRequest) -> Option<NormalizedInvoiceRequest> {
    let order_id = candidate.order_id.as_ref()?.as_non_empty_str()?;

    let base_name = candidate
        .pdf_filename
        .as_ref()
        .and_then(|f| f.as_non_empty_str())
        .unwrap_or(order_id);

    Some(NormalizedInvoiceRequest {
        order_id: order_id.to_string(),
        pdf_filename: with_pdf_extension(&flatten_path(base_name)),
    })
}

/// 把路径分隔符替换为 `_`，保证 PDF 直接落在下载目录中，且报告里的文件名就是磁盘上的文件名
pub fn flatten_path(name: &str) -> String {
    name.replace(PATH_SEPARATORS, "_")
}

/// 文件名中不含 `.pdf`（不区分大小写）时追加扩展名
pub fn with_pdf_extension(name: &str) -> String {
    if name.to_ascii_lowercase().contains(PDF_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, PDF_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn candidate(order_id: FieldValue, pdf_filename: Option<&str>) -> InvoiceRequest {
        InvoiceRequest {
            order_id: Some(order_id),
            pdf_filename: pdf_filename.map(FieldValue::from),
        }
    }

    #[test]
    fn appends_extension_to_given_filename() {
        let out = normalize(&[candidate("111-222".into(), Some("inv"))]);
        assert_eq!(
            out,
            vec![NormalizedInvoiceRequest {
                order_id: "111-222".into(),
                pdf_filename: "inv.pdf".into(),
            }]
        );
    }

    #[test]
    fn defaults_filename_to_order_id() {
        let out = normalize(&[
            candidate("111-222".into(), None),
            candidate("333-444".into(), Some("")),
            candidate("555-666".into(), Some("  ")),
        ]);
        let names: Vec<_> = out.iter().map(|r| r.pdf_filename.as_str()).collect();
        assert_eq!(names, vec!["111-222.pdf", "333-444.pdf", "555-666.pdf"]);
    }

    #[test]
    fn existing_extension_is_not_duplicated() {
        assert_eq!(with_pdf_extension("inv.pdf"), "inv.pdf");
        assert_eq!(with_pdf_extension("INV.PDF"), "INV.PDF");
        assert_eq!(with_pdf_extension("inv"), "inv.pdf");
    }

    #[test]
    fn invalid_order_ids_are_dropped() {
        let out = normalize(&[
            candidate("".into(), Some("a")),
            candidate("   ".into(), Some("b")),
            candidate(FieldValue::Number(0.0), Some("c")),
            candidate(FieldValue::Empty, Some("d")),
            InvoiceRequest::default(),
            candidate("111-222".into(), Some("e")),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].pdf_filename, "e.pdf");
    }

    #[test]
    fn never_emits_empty_fields() {
        let inputs = vec![
            candidate("x".into(), None),
            candidate("y".into(), Some("")),
            candidate("".into(), None),
            candidate(FieldValue::Bool(true), Some("z")),
        ];
        for r in normalize(&inputs) {
            assert!(!r.order_id.is_empty());
            assert!(!r.pdf_filename.is_empty());
        }
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let once = normalize(&[
            candidate("111-222".into(), Some("inv")),
            candidate("333-444".into(), None),
            candidate("555-666".into(), Some("Report.Pdf")),
        ]);
        let again: Vec<_> = once.iter().map(|r| r.to_candidate()).collect();
        assert_eq!(normalize(&again), once);
    }

    #[test]
    fn path_separators_are_flattened() {
        let out = normalize(&[
            candidate("111-222".into(), Some("2024/inv")),
            candidate("333-444".into(), Some("x.pdf/..")),
            candidate("555/666".into(), None),
            candidate("777-888".into(), Some("..\\secret")),
        ]);
        let names: Vec<_> = out.iter().map(|r| r.pdf_filename.as_str()).collect();
        assert_eq!(names, vec!["2024_inv.pdf", "x.pdf_..", "555_666.pdf", ".._secret.pdf"]);
        assert_eq!(out[2].order_id, "555/666");

        let again: Vec<_> = out.iter().map(|r| r.to_candidate()).collect();
        assert_eq!(normalize(&again), out);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let out = normalize(&[
            candidate("111-222".into(), Some("first")),
            candidate("111-222".into(), Some("second")),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].pdf_filename, "first.pdf");
        assert_eq!(out[1].pdf_filename, "second.pdf");
    }
}

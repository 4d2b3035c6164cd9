use crate::error::{AppError, AppResult, FileError};
use crate::models::invoice::{FieldValue, SheetRow};
use std::path::Path;
use tokio::fs;

/// 读取 CSV 文件：第一行为表头，每一行映射为 表头 → 值
pub async fn load_csv_rows(path: &Path) -> AppResult<Vec<SheetRow>> {
    let content = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    parse_csv_rows(&content).map_err(|source| {
        FileError::CsvParseFailed {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// 解析 CSV 内容
///
/// 列数不齐的行也接受：缺失的列不会出现在该行中，多出的列被丢弃。
pub fn parse_csv_rows(content: &[u8]) -> Result<Vec<SheetRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: SheetRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), FieldValue::Text(value.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

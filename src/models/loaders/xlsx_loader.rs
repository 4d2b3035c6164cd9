use crate::error::{AppResult, FileError};
use crate::models::invoice::{FieldValue, SheetRow};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 读取 XLSX 文件中的指定工作表，找不到该表时使用第一张表
pub async fn load_xlsx_rows(path: &Path, sheet: &str) -> AppResult<Vec<SheetRow>> {
    let path: PathBuf = path.to_path_buf();
    let sheet = sheet.to_string();

    // calamine 是同步读取
    tokio::task::spawn_blocking(move || read_xlsx_rows(&path, &sheet)).await?
}

fn read_xlsx_rows(path: &Path, sheet: &str) -> AppResult<Vec<SheetRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| xlsx_error(path, e))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = if sheet_names.iter().any(|name| name == sheet) {
        sheet.to_string()
    } else {
        match sheet_names.first() {
            Some(first) => {
                warn!("工作表 '{}' 不存在，改用第一张表 '{}'", sheet, first);
                first.clone()
            }
            None => {
                warn!("{} 中没有任何工作表", path.display());
                return Ok(Vec::new());
            }
        }
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| xlsx_error(path, e))?;
    debug!("工作表 '{}' 大小: {:?}", sheet_name, range.get_size());

    Ok(rows_from_grid(range.rows()))
}

/// 第一行作为表头，其余每行转换为 表头 → 值
///
/// 空单元格不会出现在行中，整行为空的行被跳过，表头为空的列被忽略。
pub fn rows_from_grid<'a>(mut grid: impl Iterator<Item = &'a [Data]>) -> Vec<SheetRow> {
    let headers: Vec<String> = match grid.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => return Vec::new(),
    };

    grid.filter_map(|cells| {
        let row: SheetRow = headers
            .iter()
            .zip(cells.iter())
            .filter(|(header, _)| !header.is_empty())
            .filter_map(|(header, cell)| match cell_value(cell) {
                FieldValue::Empty => None,
                value => Some((header.clone(), value)),
            })
            .collect();
        (!row.is_empty()).then_some(row)
    })
    .collect()
}

fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Int(i) => FieldValue::Number(*i as f64),
        Data::Float(f) => FieldValue::Number(*f),
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::DateTime(dt) => FieldValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => FieldValue::Text(s.clone()),
        _ => FieldValue::Empty,
    }
}

fn xlsx_error(path: &Path, err: impl std::fmt::Display) -> crate::error::AppError {
    FileError::XlsxParseFailed {
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

//! 表格适配服务 - 业务能力层
//!
//! 只负责"读表头 / 读数据行 / 合并导出"能力，不关心流程。
//! 编排层通过 `SpreadsheetAdapter` 接口使用本服务，
//! 不与任何具体表格库耦合。
//!
//! ## 技术栈
//! - `calamine` 读取 .xlsx / .xls
//! - `rust_xlsxwriter` 写出 .xlsx
//! - `csv` 读写 .csv

use crate::error::{AppError, AppResult, ExportError, ParseError};
use crate::models::ExtractedRow;
use calamine::{open_workbook_auto, DataType, Reader};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 导出文件名的固定前缀
pub const EXPORT_PREFIX: &str = "extracted_";

/// 表格适配接口
///
/// 会话层注入此接口，屏蔽具体表格库。
pub trait SpreadsheetAdapter {
    /// 读取第一个工作表的首行作为表头
    ///
    /// 单元格值按列顺序返回，空白（去空格后）单元格被过滤。
    /// 文件无法解码返回 `ParseError`；工作表没有内容返回空序列
    /// （调用方必须将空表头当作校验错误处理，而不是崩溃）。
    fn read_headers(&self, path: &Path) -> AppResult<Vec<String>>;

    /// 读取第一个工作表的全部数据行（按表头取键的记录）
    fn read_rows(&self, path: &Path) -> AppResult<Vec<ExtractedRow>>;

    /// 合并新行并导出
    ///
    /// 读取原表格的已有数据行，按产出顺序在其后追加 `new_rows`，
    /// 按 `header_set` 的列顺序重写第一个工作表，
    /// 并以固定前缀命名写到原文件同目录。
    /// 导出是全有或全无的：任何读写失败都不会留下残缺文件。
    ///
    /// 返回导出文件的路径。
    fn merge_and_export(
        &self,
        path: &Path,
        header_set: &[String],
        new_rows: &[ExtractedRow],
    ) -> AppResult<PathBuf>;
}

/// 表格文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Excel,
    Csv,
}

/// 基于 calamine / rust_xlsxwriter / csv 的表格适配实现
pub struct WorkbookAdapter;

impl WorkbookAdapter {
    pub fn new() -> Self {
        Self
    }

    /// 根据扩展名判定表格格式
    fn format_for(path: &Path) -> AppResult<SheetFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xls" => Ok(SheetFormat::Excel),
            "csv" => Ok(SheetFormat::Csv),
            _ => Err(AppError::Parse(ParseError::UnsupportedFormat {
                path: path.display().to_string(),
            })),
        }
    }

    /// 读出第一个工作表的全部单元格（字符串化）
    fn read_all_cells(&self, path: &Path) -> AppResult<Vec<Vec<String>>> {
        match Self::format_for(path)? {
            SheetFormat::Excel => self.read_excel_cells(path),
            SheetFormat::Csv => self.read_csv_cells(path),
        }
    }

    fn read_excel_cells(&self, path: &Path) -> AppResult<Vec<Vec<String>>> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| AppError::parse_open_failed(path.display().to_string(), e))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| {
                AppError::Parse(ParseError::NoSheet {
                    path: path.display().to_string(),
                })
            })?;

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            AppError::Parse(ParseError::ReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        let rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_string().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(rows)
    }

    fn read_csv_cells(&self, path: &Path) -> AppResult<Vec<Vec<String>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| AppError::parse_open_failed(path.display().to_string(), e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                AppError::Parse(ParseError::ReadFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })
            })?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(rows)
    }

    /// 首行原始单元格（未过滤，用于按位置对齐数据行）
    fn raw_header_row(cells: &[Vec<String>]) -> Vec<String> {
        cells.first().cloned().unwrap_or_default()
    }

    /// 导出文件路径：原目录 + 固定前缀 + 原文件名（Excel 统一导出 .xlsx）
    fn export_path(path: &Path, format: SheetFormat) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "export".to_string());
        let ext = match format {
            SheetFormat::Excel => "xlsx",
            SheetFormat::Csv => "csv",
        };
        let file_name = format!("{}{}.{}", EXPORT_PREFIX, stem, ext);
        path.parent()
            .map(|p| p.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name))
    }

    /// 序列化为 .xlsx 字节
    fn serialize_xlsx(
        header_set: &[String],
        rows: &[ExtractedRow],
    ) -> AppResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, header) in header_set.iter().enumerate() {
            worksheet.write_string(0, col as u16, header)?;
        }
        for (i, row) in rows.iter().enumerate() {
            for (col, value) in row.to_cells(header_set).iter().enumerate() {
                worksheet.write_string((i + 1) as u32, col as u16, value)?;
            }
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    /// 序列化为 .csv 字节
    fn serialize_csv(
        header_set: &[String],
        rows: &[ExtractedRow],
    ) -> AppResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(header_set).map_err(|e| {
            AppError::Export(ExportError::SerializeFailed {
                source: Box::new(e),
            })
        })?;
        for row in rows {
            writer.write_record(row.to_cells(header_set)).map_err(|e| {
                AppError::Export(ExportError::SerializeFailed {
                    source: Box::new(e),
                })
            })?;
        }

        writer.into_inner().map_err(|e| {
            AppError::Export(ExportError::SerializeFailed {
                source: Box::new(e),
            })
        })
    }

    /// 全有或全无地写出文件：先写临时文件，再原子替换
    fn write_atomically(target: &Path, bytes: &[u8]) -> AppResult<()> {
        let temp_path = target.with_extension("tmp");
        fs::write(&temp_path, bytes)
            .map_err(|e| AppError::export_write_failed(temp_path.display().to_string(), e))?;
        fs::rename(&temp_path, target)
            .map_err(|e| AppError::export_write_failed(target.display().to_string(), e))?;
        Ok(())
    }
}

impl SpreadsheetAdapter for WorkbookAdapter {
    fn read_headers(&self, path: &Path) -> AppResult<Vec<String>> {
        let cells = self.read_all_cells(path)?;
        let headers: Vec<String> = Self::raw_header_row(&cells)
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        debug!("读取表头 {} 列: {:?}", headers.len(), headers);

        Ok(headers)
    }

    fn read_rows(&self, path: &Path) -> AppResult<Vec<ExtractedRow>> {
        let cells = self.read_all_cells(path)?;
        let raw_headers = Self::raw_header_row(&cells);

        let rows = cells
            .iter()
            .skip(1)
            .map(|row| {
                let mut values = HashMap::new();
                for (i, header) in raw_headers.iter().enumerate() {
                    let header = header.trim();
                    if header.is_empty() {
                        continue;
                    }
                    let cell = row.get(i).cloned().unwrap_or_default();
                    values.insert(header.to_string(), cell);
                }
                ExtractedRow::from_values(values)
            })
            .collect();

        Ok(rows)
    }

    fn merge_and_export(
        &self,
        path: &Path,
        header_set: &[String],
        new_rows: &[ExtractedRow],
    ) -> AppResult<PathBuf> {
        let format = Self::format_for(path).map_err(|e| {
            AppError::Export(ExportError::ReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        // 重新读取原表格的已有数据行；任何读取失败都算导出失败
        let mut combined = self.read_rows(path).map_err(|e| {
            AppError::Export(ExportError::ReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        combined.extend(new_rows.iter().cloned());

        let bytes = match format {
            SheetFormat::Excel => Self::serialize_xlsx(header_set, &combined)?,
            SheetFormat::Csv => Self::serialize_csv(header_set, &combined)?,
        };

        let export_path = Self::export_path(path, format);
        Self::write_atomically(&export_path, &bytes)?;

        info!(
            "✓ 已导出 {} 行（原有 {} + 新增 {}）到 {}",
            combined.len(),
            combined.len() - new_rows.len(),
            new_rows.len(),
            export_path.display()
        );

        Ok(export_path)
    }
}

impl Default for WorkbookAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_dispatch() {
        assert!(matches!(
            WorkbookAdapter::format_for(Path::new("模板.xlsx")),
            Ok(SheetFormat::Excel)
        ));
        assert!(matches!(
            WorkbookAdapter::format_for(Path::new("旧表.XLS")),
            Ok(SheetFormat::Excel)
        ));
        assert!(matches!(
            WorkbookAdapter::format_for(Path::new("数据.csv")),
            Ok(SheetFormat::Csv)
        ));
        assert!(matches!(
            WorkbookAdapter::format_for(Path::new("说明.txt")),
            Err(AppError::Parse(ParseError::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn test_export_path_has_fixed_prefix() {
        let out = WorkbookAdapter::export_path(Path::new("/data/进货单.xlsx"), SheetFormat::Excel);
        assert_eq!(out, PathBuf::from("/data/extracted_进货单.xlsx"));

        let out = WorkbookAdapter::export_path(Path::new("rows.csv"), SheetFormat::Csv);
        assert_eq!(out.file_name().unwrap(), "extracted_rows.csv");
    }

    #[test]
    fn test_csv_roundtrip_headers_and_rows() {
        let dir = std::env::temp_dir().join(format!("doc_batch_extract_csv_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("模板.csv");
        fs::write(&path, "姓名,金额, ,备注\n张三,12.5,忽略,好\n").unwrap();

        let adapter = WorkbookAdapter::new();

        // 空白表头列被过滤
        let headers = adapter.read_headers(&path).unwrap();
        assert_eq!(headers, vec!["姓名", "金额", "备注"]);

        // 数据行按表头取键，空白表头列的数据被忽略
        let rows = adapter.read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("姓名"), "张三");
        assert_eq!(rows[0].get("金额"), "12.5");
        assert_eq!(rows[0].get("备注"), "好");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_csv_merge_with_empty_new_rows_preserves_original() {
        let dir =
            std::env::temp_dir().join(format!("doc_batch_extract_merge_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("原表.csv");
        fs::write(&path, "A,B\n1,2\n3,4\n").unwrap();

        let adapter = WorkbookAdapter::new();
        let headers = adapter.read_headers(&path).unwrap();

        let export_path = adapter.merge_and_export(&path, &headers, &[]).unwrap();

        let rows = adapter.read_rows(&export_path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("A"), "1");
        assert_eq!(rows[1].get("B"), "4");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_headers_empty_first_row_yields_empty_set() {
        let dir =
            std::env::temp_dir().join(format!("doc_batch_extract_blank_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("空表头.csv");
        fs::write(&path, " , ,\n").unwrap();

        let adapter = WorkbookAdapter::new();
        let headers = adapter.read_headers(&path).unwrap();
        assert!(headers.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }
}

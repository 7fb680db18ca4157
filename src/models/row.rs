//! 提取结果行
//!
//! 关键不变式：无论实际请求了哪些列，每一行都包含表头集合中
//! 每一列的条目（未请求或未找到的列为空字符串），
//! 保证下游合并导出时行形状始终与表头一致。

use serde::Serialize;
use std::collections::HashMap;

/// 一个文档的提取结果，已归一化到完整表头宽度
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ExtractedRow {
    values: HashMap<String, String>,
}

impl ExtractedRow {
    /// 将原始提取结果归一化到完整表头宽度
    ///
    /// 表头中每一列都会有条目；原始结果中缺失的列补空字符串，
    /// 表头之外的键被丢弃。
    pub fn normalized(header_set: &[String], raw: &HashMap<String, String>) -> Self {
        let values = header_set
            .iter()
            .map(|h| (h.clone(), raw.get(h).cloned().unwrap_or_default()))
            .collect();
        Self { values }
    }

    /// 从已经对齐的键值对直接构建（用于读取已有表格行）
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 取某一列的值（不存在时返回空字符串）
    pub fn get(&self, header: &str) -> &str {
        self.values.get(header).map(String::as_str).unwrap_or("")
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// 按表头顺序展开为单元格序列（用于导出）
    pub fn to_cells(&self, header_set: &[String]) -> Vec<String> {
        header_set.iter().map(|h| self.get(h).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalized_fills_missing_headers() {
        let header_set = headers(&["A", "B", "C"]);
        let mut raw = HashMap::new();
        raw.insert("A".to_string(), "x".to_string());

        let row = ExtractedRow::normalized(&header_set, &raw);

        assert_eq!(row.width(), 3);
        assert_eq!(row.get("A"), "x");
        assert_eq!(row.get("B"), "");
        assert_eq!(row.get("C"), "");
    }

    #[test]
    fn test_normalized_drops_unknown_keys() {
        let header_set = headers(&["A"]);
        let mut raw = HashMap::new();
        raw.insert("A".to_string(), "x".to_string());
        raw.insert("不存在的列".to_string(), "y".to_string());

        let row = ExtractedRow::normalized(&header_set, &raw);

        assert_eq!(row.width(), 1);
        assert_eq!(row.get("不存在的列"), "");
    }

    #[test]
    fn test_to_cells_follows_header_order() {
        let header_set = headers(&["C", "A", "B"]);
        let mut raw = HashMap::new();
        raw.insert("A".to_string(), "1".to_string());
        raw.insert("B".to_string(), "2".to_string());
        raw.insert("C".to_string(), "3".to_string());

        let row = ExtractedRow::normalized(&header_set, &raw);

        assert_eq!(row.to_cells(&header_set), vec!["3", "1", "2"]);
    }
}

//! 提取模板数据模型
//!
//! 模板是一条命名的指令预设 {id, label, prompt}；
//! 特殊的"自定义"变体从用户输入的自由文本取提示词。

use serde::Deserialize;

/// 提取模板预设
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionTemplate {
    /// 模板 ID
    pub id: String,
    /// 显示名称
    pub label: String,
    /// 提示词（预设模板的提示词是只读的）
    pub prompt: String,
}

/// 当前激活的模板：预设之一，或者自定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSelection {
    /// 预设模板（按 ID 引用）
    Preset(String),
    /// 自定义提示词（文本保存在会话中）
    Custom,
}

/// 内置模板预设
///
/// 未提供模板预设文件时使用。
pub fn builtin_templates() -> Vec<ExtractionTemplate> {
    vec![
        ExtractionTemplate {
            id: "general".to_string(),
            label: "通用提取".to_string(),
            prompt: "请仔细阅读这份文档，提取出指定字段的内容。\
                     如果某个字段在文档中不存在，返回空字符串。"
                .to_string(),
        },
        ExtractionTemplate {
            id: "invoice".to_string(),
            label: "发票".to_string(),
            prompt: "这是一张发票。请提取指定字段，金额保留原始数字格式，\
                     日期统一为 YYYY-MM-DD 格式。"
                .to_string(),
        },
        ExtractionTemplate {
            id: "receipt".to_string(),
            label: "收据".to_string(),
            prompt: "这是一张收据。请提取指定字段，注意区分商户名称和付款方名称，\
                     金额保留原始数字格式。"
                .to_string(),
        },
        ExtractionTemplate {
            id: "id_card".to_string(),
            label: "证件".to_string(),
            prompt: "这是一张证件（身份证/名片等）。请提取指定字段，\
                     姓名、证件号等信息需要逐字符准确。"
                .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_have_unique_ids() {
        let templates = builtin_templates();
        let mut ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn test_builtin_templates_non_empty_prompts() {
        for t in builtin_templates() {
            assert!(!t.prompt.trim().is_empty(), "模板 {} 的提示词为空", t.id);
        }
    }
}

use crate::models::template::ExtractionTemplate;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 模板预设文件结构
#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<ExtractionTemplate>,
}

/// 从 TOML 文件加载模板预设列表
///
/// 文件格式：
/// ```toml
/// [[templates]]
/// id = "invoice"
/// label = "发票"
/// prompt = "这是一张发票。请提取指定字段……"
/// ```
pub async fn load_templates_from_toml(path: &Path) -> Result<Vec<ExtractionTemplate>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取模板文件: {}", path.display()))?;

    let file: TemplateFile = toml::from_str(&content)
        .with_context(|| format!("无法解析模板文件: {}", path.display()))?;

    if file.templates.is_empty() {
        anyhow::bail!("模板文件中没有定义任何模板: {}", path.display());
    }

    tracing::info!("成功加载 {} 个模板预设", file.templates.len());

    Ok(file.templates)
}

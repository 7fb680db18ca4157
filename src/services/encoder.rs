//! 文档编码服务 - 业务能力层
//!
//! 只负责"把文件变成可传输的内联表示"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `base64` crate 编码文件内容
//! - 产出 data URL（data:<媒体类型>;base64,<内容>），可直接放进模型请求

use crate::error::{AppError, EncodingError, ValidationError};
use crate::models::Document;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// 文档编码服务
///
/// 职责：
/// - 根据扩展名判定媒体类型
/// - 读取文件字节并编码为 data URL
/// - 执行上传时的文件类型校验策略
/// - 只处理文件，不出现批处理状态
pub struct DocumentEncoder;

impl DocumentEncoder {
    /// 创建新的文档编码服务
    pub fn new() -> Self {
        Self
    }

    /// 根据文件扩展名判定媒体类型
    ///
    /// 未知扩展名返回 None。
    pub fn media_type_for(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "bmp" => Some("image/bmp"),
            "tif" | "tiff" => Some("image/tiff"),
            "pdf" => Some("application/pdf"),
            _ => None,
        }
    }

    /// 媒体类型是否在接受范围内（图片或 PDF）
    pub fn is_supported(media_type: &str) -> bool {
        media_type.contains("image") || media_type.contains("pdf")
    }

    /// 将单个文件编码为文档
    ///
    /// 文件无法读取时返回 `EncodingError`，
    /// 类型不支持时返回 `EncodingError::UnsupportedType`。
    pub async fn encode(&self, path: &Path) -> std::result::Result<Document, AppError> {
        let media_type = Self::media_type_for(path)
            .filter(|m| Self::is_supported(m))
            .ok_or_else(|| {
                AppError::Encoding(EncodingError::UnsupportedType {
                    path: path.display().to_string(),
                })
            })?;

        let bytes = fs::read(path)
            .await
            .map_err(|e| AppError::encoding_read_failed(path.display().to_string(), e))?;

        let payload = STANDARD.encode(&bytes);
        let data_url = format!("data:{};base64,{}", media_type, payload);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        debug!(
            "已编码文档: {} ({}, {} 字节)",
            file_name,
            media_type,
            bytes.len()
        );

        Ok(Document::new(file_name, media_type, data_url))
    }

    /// 批量上传入口：执行文件类型校验策略
    ///
    /// 校验策略（保留自原系统的观察行为）：
    /// - 全部无效且至少选了一个文件 → 整个选择被拒绝，返回校验错误
    /// - 有效/无效混合 → 无效文件被静默丢弃，有效文件全部编码
    pub async fn ingest_batch(
        &self,
        paths: &[PathBuf],
    ) -> std::result::Result<Vec<Document>, AppError> {
        let (valid, invalid): (Vec<&PathBuf>, Vec<&PathBuf>) = paths.iter().partition(|p| {
            Self::media_type_for(p)
                .map(Self::is_supported)
                .unwrap_or(false)
        });

        if valid.is_empty() && !paths.is_empty() {
            return Err(AppError::Validation(ValidationError::NoValidFiles {
                selected: paths.len(),
            }));
        }

        for p in &invalid {
            debug!("已忽略无效文件: {}", p.display());
        }

        let mut documents = Vec::with_capacity(valid.len());
        for path in valid {
            documents.push(self.encode(path).await?);
        }

        Ok(documents)
    }

    /// 从文件夹加载所有有效文档
    ///
    /// 按文件名排序，保证上传顺序稳定。
    pub async fn ingest_folder(&self, folder_path: &str) -> Result<Vec<Document>> {
        let folder = PathBuf::from(folder_path);

        if !folder.exists() {
            anyhow::bail!("文件夹不存在: {}", folder_path);
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&folder)
            .await
            .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();

        let documents = self
            .ingest_batch(&paths)
            .await
            .with_context(|| format!("加载文档文件夹失败: {}", folder_path))?;

        info!("✓ 找到 {} 个待处理的文档", documents.len());

        Ok(documents)
    }
}

impl Default for DocumentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for_known_extensions() {
        assert_eq!(
            DocumentEncoder::media_type_for(Path::new("发票.PNG")),
            Some("image/png")
        );
        assert_eq!(
            DocumentEncoder::media_type_for(Path::new("scan.jpeg")),
            Some("image/jpeg")
        );
        assert_eq!(
            DocumentEncoder::media_type_for(Path::new("合同.pdf")),
            Some("application/pdf")
        );
        assert_eq!(DocumentEncoder::media_type_for(Path::new("数据.xlsx")), None);
        assert_eq!(DocumentEncoder::media_type_for(Path::new("无扩展名")), None);
    }

    #[test]
    fn test_is_supported() {
        assert!(DocumentEncoder::is_supported("image/png"));
        assert!(DocumentEncoder::is_supported("application/pdf"));
        assert!(!DocumentEncoder::is_supported("text/plain"));
    }

    #[test]
    fn test_ingest_batch_all_invalid_rejected() {
        let encoder = DocumentEncoder::new();
        let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.docx")];

        let result = tokio_test::block_on(encoder.ingest_batch(&paths));

        match result {
            Err(AppError::Validation(ValidationError::NoValidFiles { selected })) => {
                assert_eq!(selected, 2);
            }
            other => panic!("期望整批被拒绝，实际得到: {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_ingest_batch_empty_selection_is_ok() {
        let encoder = DocumentEncoder::new();
        let documents = tokio_test::block_on(encoder.ingest_batch(&[])).unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_encode_and_mixed_batch_filtering() {
        let dir = std::env::temp_dir().join(format!("doc_batch_extract_enc_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let png = dir.join("one.png");
        let txt = dir.join("two.txt");
        tokio::fs::write(&png, b"\x89PNG fake").await.unwrap();
        tokio::fs::write(&txt, b"hello").await.unwrap();

        let encoder = DocumentEncoder::new();

        // 单文件编码：data URL 前缀正确
        let doc = encoder.encode(&png).await.unwrap();
        assert_eq!(doc.file_name, "one.png");
        assert_eq!(doc.media_type, "image/png");
        assert!(doc.data_url.starts_with("data:image/png;base64,"));

        // 混合批次：无效文件被静默丢弃
        let documents = encoder
            .ingest_batch(&[png.clone(), txt.clone()])
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, "one.png");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}

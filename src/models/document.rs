//! 文档数据模型
//!
//! 上传后的文档是不可变的：文件名 + 媒体类型 + 编码后的内联载荷

use std::fmt::Display;

/// 一个已编码的待提取文档
///
/// 上传（编码）完成后不再变化，随会话一起存活，
/// 由用户显式移除或清空批次时销毁。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// 文件名（作为文档标识）
    pub file_name: String,

    /// 媒体类型，如 image/png、application/pdf
    pub media_type: String,

    /// data URL 形式的内联载荷（data:<媒体类型>;base64,<内容>）
    pub data_url: String,
}

impl Document {
    /// 创建新的文档
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data_url: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data_url: data_url.into(),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {} ({})]", self.file_name, self.media_type)
    }
}

use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 用户输入校验错误
    Validation(ValidationError),
    /// 表格解析错误
    Parse(ParseError),
    /// 文档编码错误
    Encoding(EncodingError),
    /// 提取服务错误
    Extraction(ExtractionError),
    /// 导出错误
    Export(ExportError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Parse(e) => write!(f, "表格解析错误: {}", e),
            AppError::Encoding(e) => write!(f, "文档编码错误: {}", e),
            AppError::Extraction(e) => write!(f, "提取错误: {}", e),
            AppError::Export(e) => write!(f, "导出错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Parse(e) => Some(e),
            AppError::Encoding(e) => Some(e),
            AppError::Extraction(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 用户输入校验错误
///
/// 此类错误只阻止批处理进入 loading 状态，不改变已有的批处理结果。
#[derive(Debug)]
pub enum ValidationError {
    /// 没有待处理的文档
    NoDocuments,
    /// 没有上传表格模板
    NoSpreadsheet,
    /// 表头为空（表格首行没有可用列名）
    EmptyHeaderSet,
    /// 没有选中任何列
    NoSelectedColumns,
    /// 自定义提示词为空
    EmptyCustomPrompt,
    /// 选择的文件中没有任何有效文件（图片/PDF）
    NoValidFiles {
        selected: usize,
    },
    /// 模板 ID 不存在
    UnknownTemplate {
        id: String,
    },
    /// 批处理正在进行中
    AlreadyRunning,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoDocuments => write!(f, "请先选择至少一个文档"),
            ValidationError::NoSpreadsheet => write!(f, "请先上传表格模板"),
            ValidationError::EmptyHeaderSet => {
                write!(f, "表格首行没有可用的列名，请检查模板文件")
            }
            ValidationError::NoSelectedColumns => write!(f, "请至少选择一个需要提取的列"),
            ValidationError::EmptyCustomPrompt => write!(f, "自定义提示词不能为空"),
            ValidationError::NoValidFiles { selected } => {
                write!(
                    f,
                    "所选的 {} 个文件均不是图片或 PDF，本次选择已被拒绝",
                    selected
                )
            }
            ValidationError::UnknownTemplate { id } => {
                write!(f, "未知的提取模板: {}", id)
            }
            ValidationError::AlreadyRunning => write!(f, "批处理正在进行中，请等待完成"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 表格解析错误
#[derive(Debug)]
pub enum ParseError {
    /// 无法打开表格文件
    OpenFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 工作簿中没有工作表
    NoSheet {
        path: String,
    },
    /// 读取工作表内容失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 不支持的表格格式
    UnsupportedFormat {
        path: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::OpenFailed { path, source } => {
                write!(f, "无法打开表格文件 ({}): {}", path, source)
            }
            ParseError::NoSheet { path } => write!(f, "工作簿中没有工作表: {}", path),
            ParseError::ReadFailed { path, source } => {
                write!(f, "读取工作表失败 ({}): {}", path, source)
            }
            ParseError::UnsupportedFormat { path } => {
                write!(f, "不支持的表格格式: {}", path)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::OpenFailed { source, .. } | ParseError::ReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文档编码错误
#[derive(Debug)]
pub enum EncodingError {
    /// 读取文档文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 不支持的文档类型
    UnsupportedType {
        path: String,
    },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::ReadFailed { path, source } => {
                write!(f, "读取文档失败 ({}): {}", path, source)
            }
            EncodingError::UnsupportedType { path } => {
                write!(f, "不支持的文档类型（仅支持图片和 PDF）: {}", path)
            }
        }
    }
}

impl std::error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodingError::ReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 提取服务错误
///
/// 一个文档提取失败即中止剩余批处理，已完成的行保留。
#[derive(Debug)]
pub enum ExtractionError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
    /// 模型输出无法解析为结构化结果
    MalformedOutput {
        snippet: String,
    },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::ApiCallFailed { model, source } => {
                write!(f, "模型 API 调用失败 (模型: {}): {}", model, source)
            }
            ExtractionError::EmptyContent { model } => {
                write!(f, "模型返回内容为空 (模型: {})", model)
            }
            ExtractionError::MalformedOutput { snippet } => {
                write!(f, "模型输出不是有效的 JSON 对象: {}", snippet)
            }
        }
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 导出错误
///
/// 导出失败不改变批处理状态，提取结果仍然保留，可重新导出。
#[derive(Debug)]
pub enum ExportError {
    /// 重新读取原表格失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 序列化工作簿失败
    SerializeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写出文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::ReadFailed { path, source } => {
                write!(f, "重新读取原表格失败 ({}): {}", path, source)
            }
            ExportError::SerializeFailed { source } => {
                write!(f, "序列化工作簿失败: {}", source)
            }
            ExportError::WriteFailed { path, source } => {
                write!(f, "写出文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::ReadFailed { source, .. }
            | ExportError::SerializeFailed { source }
            | ExportError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量不存在
    EnvVarNotFound {
        var_name: String,
    },
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarNotFound { var_name } => {
                write!(f, "环境变量 {} 不存在", var_name)
            }
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(ExportError::SerializeFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建表格打开失败错误
    pub fn parse_open_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Parse(ParseError::OpenFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文档读取失败错误
    pub fn encoding_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Encoding(EncodingError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建提取 API 调用失败错误
    pub fn extraction_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Extraction(ExtractionError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建导出写出失败错误
    pub fn export_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Export(ExportError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = std::result::Result<T, AppError>;

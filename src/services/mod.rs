//! 业务能力层（Services）
//!
//! 每个服务只描述"我能做什么"，只处理单个文件/文档，不关心流程顺序。

pub mod encoder;
pub mod extraction;
pub mod spreadsheet;

pub use encoder::DocumentEncoder;
pub use extraction::{ExtractionClient, LlmExtractionClient};
pub use spreadsheet::{SpreadsheetAdapter, WorkbookAdapter, EXPORT_PREFIX};

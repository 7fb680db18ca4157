//! 数据模型层

pub mod document;
pub mod loaders;
pub mod row;
pub mod template;

pub use document::Document;
pub use loaders::load_templates_from_toml;
pub use row::ExtractedRow;
pub use template::{builtin_templates, ExtractionTemplate, TemplateSelection};

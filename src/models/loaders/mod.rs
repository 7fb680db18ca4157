//! 数据加载器

pub mod template_loader;

pub use template_loader::load_templates_from_toml;

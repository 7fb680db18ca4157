//! # Doc Batch Extract
//!
//! 一个把文档批量交给模型做字段提取并回填表格的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 数据类型与加载器
//! - `Document` - 已编码的待提取文档（文件名 + 媒体类型 + data URL）
//! - `ExtractedRow` - 归一化到完整表头宽度的提取结果行
//! - `ExtractionTemplate` - 命名的指令预设
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件/文档
//! - `DocumentEncoder` - 文件 → data URL 编码能力 + 上传校验策略
//! - `ExtractionClient` / `LlmExtractionClient` - 单文档字段提取能力
//! - `SpreadsheetAdapter` / `WorkbookAdapter` - 表头读取 / 合并导出能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次提取会话的完整状态
//! - `Session` - 显式会话状态机（文档、表头、选中列、模板、批处理状态）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 顺序批量提取，增量进度，快速失败
//! - `orchestrator/app` - 应用装配与整体流程
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{builtin_templates, Document, ExtractedRow, ExtractionTemplate, TemplateSelection};
pub use orchestrator::{run_batch, run_session_batch, App, BatchOutcome};
pub use services::{
    DocumentEncoder, ExtractionClient, LlmExtractionClient, SpreadsheetAdapter, WorkbookAdapter,
};
pub use workflow::{BatchState, BatchStatus, RunInputs, Session};

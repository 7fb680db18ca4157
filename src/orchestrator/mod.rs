//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_runner` - 批量提取执行器
//! - 按上传顺序逐个文档调用提取客户端（严格顺序，无并发）
//! - 把每个结果归一化到完整表头宽度
//! - 发布增量进度
//! - 快速失败：一个文档失败即中止，保留已产出的行
//!
//! ### `app` - 应用装配
//! - 管理应用生命周期（初始化、运行）
//! - 装载文档、表格模板、提取模板
//! - 提取成功后合并导出
//!
//! ## 层次关系
//!
//! ```text
//! app (装配 + 整体流程)
//!     ↓
//! batch_runner (处理 Vec<Document>)
//!     ↓
//! workflow::Session (会话状态机)
//!     ↓
//! services (能力层：encoder / extraction / spreadsheet)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管装配，batch_runner 管批量循环
//! 2. **向下依赖**：编排层 → workflow → services → models
//! 3. **无业务逻辑**：只做调度和统计，不做具体提取判断

pub mod app;
pub mod batch_runner;

// 重新导出主要类型
pub use app::App;
pub use batch_runner::{run_batch, run_session_batch, BatchOutcome};

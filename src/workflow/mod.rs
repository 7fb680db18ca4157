//! 流程层（Workflow）
//!
//! 定义一次提取会话的完整状态与转换函数。

pub mod session;

pub use session::{BatchState, BatchStatus, RunInputs, Session};

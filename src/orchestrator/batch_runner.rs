//! 批量提取执行器 - 编排层
//!
//! ## 职责
//!
//! 驱动一次批处理运行：按上传顺序逐个文档调用提取客户端，
//! 把每个结果归一化到完整表头宽度，并在每个文档完成后
//! 立即发布增量进度。
//!
//! ## 设计特点
//!
//! - **严格顺序**：同一时刻最多一个在途请求，无并发、无重叠
//! - **快速失败**：任何一个文档提取失败立即停止迭代，
//!   已产出的行保留，后续文档不再尝试
//! - **无重试**：失败不重试、不跳过，由用户显式重新启动
//! - **增量可观察**：每完成一个文档，行数即等于已完成请求数

use crate::models::ExtractedRow;
use crate::services::ExtractionClient;
use crate::workflow::{BatchStatus, RunInputs, Session};
use tracing::{error, info};

/// 一次批处理运行的结果
#[derive(Debug)]
pub struct BatchOutcome {
    /// 已产出的行（按上传顺序；失败时为失败前的部分）
    pub rows: Vec<ExtractedRow>,
    /// 失败信息（None 表示全部成功）
    pub error: Option<String>,
}

/// 按上传顺序逐个文档执行提取
///
/// `on_progress` 在每个文档完成后被调用一次，
/// 参数为（已产出的行，文档总数）。
pub async fn run_batch<C: ExtractionClient>(
    client: &C,
    inputs: &RunInputs,
    mut on_progress: impl FnMut(&[ExtractedRow], usize),
) -> BatchOutcome {
    let total = inputs.documents.len();
    let mut rows: Vec<ExtractedRow> = Vec::with_capacity(total);

    for (index, document) in inputs.documents.iter().enumerate() {
        info!(
            "[文档 {}/{}] 📤 正在提取: {}",
            index + 1,
            total,
            document.file_name
        );

        match client
            .extract(document, &inputs.instructions, &inputs.selected)
            .await
        {
            Ok(raw) => {
                // 归一化到完整表头宽度：未请求/未找到的列补空字符串
                let row = ExtractedRow::normalized(&inputs.header_set, &raw);
                rows.push(row);
                on_progress(&rows, total);

                info!("[文档 {}/{}] ✓ 提取完成", index + 1, total);
            }
            Err(e) => {
                error!(
                    "[文档 {}/{}] ❌ 提取失败，批处理中止: {}",
                    index + 1,
                    total,
                    e
                );
                return BatchOutcome {
                    rows,
                    error: Some(e.to_string()),
                };
            }
        }
    }

    BatchOutcome { rows, error: None }
}

/// 编排一次完整的会话批处理
///
/// idle → loading（校验前置条件、捕获输入）→ 顺序提取 → success / error。
/// 这是"用户点击开始"对应的唯一入口。
pub async fn run_session_batch<C: ExtractionClient>(
    session: &mut Session,
    client: &C,
    on_progress: impl FnMut(&[ExtractedRow], usize),
) -> crate::error::AppResult<BatchStatus> {
    let inputs = session.begin_run()?;

    let outcome = run_batch(client, &inputs, on_progress).await;
    session.finish_run(outcome.rows, outcome.error);

    Ok(session.batch().status)
}

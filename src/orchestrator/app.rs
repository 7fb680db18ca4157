//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源装配和整体流程：
//!
//! 1. **应用初始化**：启动日志、构建服务、装载会话输入
//! 2. **文档装载**：从文件夹编码所有有效文档
//! 3. **表格装载**：读取表格模板的表头并应用列选择
//! 4. **批量提取**：委托 batch_runner 顺序处理
//! 5. **合并导出**：提取成功后把新行并回原表格并写出
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文档的细节
//! - **向下委托**：委托 batch_runner 驱动会话状态机
//! - **导出独立**：导出失败不改变批处理状态，结果仍保留

use crate::config::Config;
use crate::error::{AppError, ConfigError};
use crate::models::{builtin_templates, load_templates_from_toml};
use crate::orchestrator::batch_runner;
use crate::services::{DocumentEncoder, LlmExtractionClient, SpreadsheetAdapter, WorkbookAdapter};
use crate::utils::logging;
use crate::workflow::{BatchStatus, Session};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info};

/// 应用主结构
pub struct App {
    config: Config,
    adapter: WorkbookAdapter,
    client: LlmExtractionClient,
    session: Session,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config.llm_model_name);

        if config.llm_api_key.trim().is_empty() {
            return Err(AppError::Config(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            })
            .into());
        }

        // 加载模板预设（文件优先，否则内置）
        let templates = if config.template_file.trim().is_empty() {
            builtin_templates()
        } else {
            load_templates_from_toml(Path::new(&config.template_file)).await?
        };

        let mut session = Session::new(templates);

        // 应用模板选择：自定义提示词优先于预设 ID
        if !config.custom_prompt.trim().is_empty() {
            session.use_custom_template();
            session.set_custom_text(&config.custom_prompt);
        } else {
            session
                .set_template(&config.template_id)
                .context("应用提取模板失败")?;
        }

        // 装载文档
        let encoder = DocumentEncoder::new();
        let documents = encoder.ingest_folder(&config.document_folder).await?;
        session.add_documents(documents);

        // 装载表格模板（上传成功后默认全选所有列）
        let adapter = WorkbookAdapter::new();
        session
            .upload_spreadsheet(&adapter, Path::new(&config.spreadsheet_path))
            .context("上传表格模板失败")?;

        info!(
            "✓ 表格模板已装载: {} ({} 列)",
            config.spreadsheet_path,
            session.header_set().len()
        );

        // 应用列选择（为空表示全选）
        if !config.selected_columns.trim().is_empty() {
            session.clear_selected_columns();
            for name in config
                .selected_columns
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                session.toggle_column(name);
            }
        }

        let client = LlmExtractionClient::new(&config);

        Ok(Self {
            config,
            adapter,
            client,
            session,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        let total = self.session.documents().len();
        logging::log_run_inputs(
            total,
            self.session.header_set().len(),
            self.session.selected_columns().len(),
        );
        if let Ok(text) = self.session.instructions() {
            info!("📝 指令: {}", logging::truncate_text(&text, 80));
        }

        // 顺序批量提取，进度随每个文档完成即时可见
        let status =
            batch_runner::run_session_batch(&mut self.session, &self.client, |rows, total| {
                info!("📊 进度: {}/{}", rows.len(), total);
            })
            .await?;

        match status {
            BatchStatus::Success => {
                let rows = &self.session.batch().rows;
                let spreadsheet_path = self
                    .session
                    .spreadsheet_path()
                    .context("批处理成功但表格模板丢失")?;

                // 合并导出；失败不影响已有的提取结果
                let export_path = self.adapter.merge_and_export(
                    spreadsheet_path,
                    self.session.header_set(),
                    rows,
                )?;

                info!("💾 导出完成: {}", export_path.display());
                logging::print_final_stats(rows.len(), total, &self.config.output_log_file);
                Ok(())
            }
            BatchStatus::Error => {
                let done = self.session.batch().rows.len();
                if let Some(message) = &self.session.batch().error {
                    error!("❌ 批处理中止: {}", message);
                }
                error!(
                    "⚠️ 已完成 {}/{} 个文档，结果已保留；修正后可重新运行",
                    done, total
                );
                Ok(())
            }
            // run_session_batch 之后只会是 Success 或 Error
            _ => Ok(()),
        }
    }

    /// 当前会话（只读）
    pub fn session(&self) -> &Session {
        &self.session
    }
}

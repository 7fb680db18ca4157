//! 会话状态机 - 流程层
//!
//! 把原来散落的全局 UI 状态收拢为一个显式的会话结构，
//! 所有状态变更都通过定义好的转换函数进行，没有环境单例。
//!
//! ## 批处理状态转换
//!
//! ```text
//! idle → loading → { success | error }
//! ```
//!
//! - 进入 loading 必须满足全部前置条件（缺一即拒绝，fail closed）
//! - loading 中不允许再次启动
//! - 到达 success / error 后，由用户显式重新启动（重新校验前置条件）

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{Document, ExtractedRow, ExtractionTemplate, TemplateSelection};
use crate::services::SpreadsheetAdapter;
use std::path::{Path, PathBuf};

/// 批处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// 等待启动
    Idle,
    /// 正在逐个处理文档
    Loading,
    /// 全部文档处理完成
    Success,
    /// 某个文档提取失败，批处理已中止
    Error,
}

/// 批处理结果状态
///
/// `rows` 按上传顺序保存已产出的行；失败时保留已完成的部分。
#[derive(Debug, Clone)]
pub struct BatchState {
    pub status: BatchStatus,
    pub rows: Vec<ExtractedRow>,
    pub error: Option<String>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self {
            status: BatchStatus::Idle,
            rows: Vec::new(),
            error: None,
        }
    }
}

/// 一次批处理运行在启动时捕获的输入
///
/// loading 期间对会话的修改不影响已启动的运行。
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub documents: Vec<Document>,
    pub instructions: String,
    pub selected: Vec<String>,
    pub header_set: Vec<String>,
}

/// 提取会话
///
/// 持有：文档列表、表头集合、选中列、模板选择、批处理状态。
/// 无持久化，随进程存活。
pub struct Session {
    documents: Vec<Document>,
    spreadsheet_path: Option<PathBuf>,
    header_set: Vec<String>,
    selected: Vec<String>,
    templates: Vec<ExtractionTemplate>,
    selection: TemplateSelection,
    custom_text: String,
    batch: BatchState,
}

impl Session {
    /// 创建新会话
    ///
    /// 默认激活第一个预设模板；没有预设时为自定义。
    pub fn new(templates: Vec<ExtractionTemplate>) -> Self {
        let selection = templates
            .first()
            .map(|t| TemplateSelection::Preset(t.id.clone()))
            .unwrap_or(TemplateSelection::Custom);

        Self {
            documents: Vec::new(),
            spreadsheet_path: None,
            header_set: Vec::new(),
            selected: Vec::new(),
            templates,
            selection,
            custom_text: String::new(),
            batch: BatchState::default(),
        }
    }

    // ========== 文档 ==========

    /// 追加文档（保持上传顺序）
    pub fn add_documents(&mut self, documents: Vec<Document>) {
        self.documents.extend(documents);
    }

    /// 按文件名移除文档
    pub fn remove_document(&mut self, file_name: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.file_name != file_name);
        self.documents.len() != before
    }

    /// 清空文档列表
    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    // ========== 表格模板 ==========

    /// 上传表格模板并读取表头
    ///
    /// 解析失败时整个上传被拒绝，表格相关状态被重置。
    /// 上传成功后默认全选所有列。
    pub fn upload_spreadsheet(
        &mut self,
        adapter: &dyn SpreadsheetAdapter,
        path: &Path,
    ) -> AppResult<()> {
        match adapter.read_headers(path) {
            Ok(headers) => {
                self.spreadsheet_path = Some(path.to_path_buf());
                self.selected = headers.clone();
                self.header_set = headers;
                Ok(())
            }
            Err(e) => {
                self.remove_spreadsheet();
                Err(e)
            }
        }
    }

    /// 移除表格模板（整体重置表格相关状态）
    pub fn remove_spreadsheet(&mut self) {
        self.spreadsheet_path = None;
        self.header_set.clear();
        self.selected.clear();
    }

    pub fn spreadsheet_path(&self) -> Option<&Path> {
        self.spreadsheet_path.as_deref()
    }

    pub fn header_set(&self) -> &[String] {
        &self.header_set
    }

    // ========== 选中列 ==========

    /// 切换某列的选中状态
    ///
    /// 不在表头集合中的列名被忽略。返回切换后是否选中。
    pub fn toggle_column(&mut self, name: &str) -> bool {
        if !self.header_set.iter().any(|h| h == name) {
            return false;
        }
        if let Some(pos) = self.selected.iter().position(|s| s == name) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(name.to_string());
            true
        }
    }

    /// 全选
    pub fn select_all_columns(&mut self) {
        self.selected = self.header_set.clone();
    }

    /// 清空选中
    pub fn clear_selected_columns(&mut self) {
        self.selected.clear();
    }

    /// 当前选中列（按表头顺序）
    pub fn selected_columns(&self) -> Vec<String> {
        self.header_set
            .iter()
            .filter(|h| self.selected.contains(h))
            .cloned()
            .collect()
    }

    // ========== 模板选择 ==========

    /// 激活一个预设模板
    pub fn set_template(&mut self, id: &str) -> AppResult<()> {
        if !self.templates.iter().any(|t| t.id == id) {
            return Err(AppError::Validation(ValidationError::UnknownTemplate {
                id: id.to_string(),
            }));
        }
        self.selection = TemplateSelection::Preset(id.to_string());
        Ok(())
    }

    /// 切换到自定义模板
    ///
    /// 上次输入的自定义文本会被恢复（而不是上一个预设的提示词）。
    pub fn use_custom_template(&mut self) {
        self.selection = TemplateSelection::Custom;
    }

    /// 更新自定义提示词文本
    ///
    /// 预设模板的提示词是只读的：本方法只写自定义文本，
    /// 即使当前激活的是预设模板也不影响它。
    pub fn set_custom_text(&mut self, text: impl Into<String>) {
        self.custom_text = text.into();
    }

    pub fn selection(&self) -> &TemplateSelection {
        &self.selection
    }

    pub fn templates(&self) -> &[ExtractionTemplate] {
        &self.templates
    }

    /// 解析当前生效的指令文本
    pub fn instructions(&self) -> AppResult<String> {
        match &self.selection {
            TemplateSelection::Preset(id) => self
                .templates
                .iter()
                .find(|t| t.id == *id)
                .map(|t| t.prompt.clone())
                .ok_or_else(|| {
                    AppError::Validation(ValidationError::UnknownTemplate { id: id.clone() })
                }),
            TemplateSelection::Custom => {
                if self.custom_text.trim().is_empty() {
                    Err(AppError::Validation(ValidationError::EmptyCustomPrompt))
                } else {
                    Ok(self.custom_text.clone())
                }
            }
        }
    }

    // ========== 批处理状态转换 ==========

    pub fn batch(&self) -> &BatchState {
        &self.batch
    }

    /// 校验启动批处理的全部前置条件（fail closed）
    pub fn validate_ready(&self) -> AppResult<()> {
        if self.batch.status == BatchStatus::Loading {
            return Err(AppError::Validation(ValidationError::AlreadyRunning));
        }
        if self.documents.is_empty() {
            return Err(AppError::Validation(ValidationError::NoDocuments));
        }
        if self.spreadsheet_path.is_none() {
            return Err(AppError::Validation(ValidationError::NoSpreadsheet));
        }
        if self.header_set.is_empty() {
            return Err(AppError::Validation(ValidationError::EmptyHeaderSet));
        }
        if self.selected.is_empty() {
            return Err(AppError::Validation(ValidationError::NoSelectedColumns));
        }
        // 自定义模板文本为空也算前置条件不满足
        self.instructions()?;
        Ok(())
    }

    /// idle → loading：校验前置条件并捕获本次运行的输入
    ///
    /// 之前的结果行被清空；校验失败时状态保持不变。
    pub fn begin_run(&mut self) -> AppResult<RunInputs> {
        self.validate_ready()?;

        let inputs = RunInputs {
            documents: self.documents.clone(),
            instructions: self.instructions()?,
            selected: self.selected_columns(),
            header_set: self.header_set.clone(),
        };

        self.batch = BatchState {
            status: BatchStatus::Loading,
            rows: Vec::new(),
            error: None,
        };

        Ok(inputs)
    }

    /// loading → success / error：写回运行结果
    ///
    /// 失败时已产出的行保留，可见但不再继续。
    pub fn finish_run(&mut self, rows: Vec<ExtractedRow>, error: Option<String>) {
        self.batch.rows = rows;
        match error {
            Some(message) => {
                self.batch.status = BatchStatus::Error;
                self.batch.error = Some(message);
            }
            None => {
                self.batch.status = BatchStatus::Success;
                self.batch.error = None;
            }
        }
    }
}

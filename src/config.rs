/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 待处理文档所在目录
    pub document_folder: String,
    /// 表格模板文件路径（.xlsx / .xls / .csv）
    pub spreadsheet_path: String,
    /// 提取模板 ID（为空时使用自定义提示词）
    pub template_id: String,
    /// 自定义提示词（template_id 为空时生效）
    pub custom_prompt: String,
    /// 需要提取的列（逗号分隔，为空表示全选）
    pub selected_columns: String,
    /// 模板预设文件路径（为空时使用内置模板）
    pub template_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_folder: "documents".to_string(),
            spreadsheet_path: "template.xlsx".to_string(),
            template_id: "general".to_string(),
            custom_prompt: String::new(),
            selected_columns: String::new(),
            template_file: String::new(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            document_folder: std::env::var("DOCUMENT_FOLDER").unwrap_or(default.document_folder),
            spreadsheet_path: std::env::var("SPREADSHEET_PATH").unwrap_or(default.spreadsheet_path),
            template_id: std::env::var("TEMPLATE_ID").unwrap_or(default.template_id),
            custom_prompt: std::env::var("CUSTOM_PROMPT").unwrap_or(default.custom_prompt),
            selected_columns: std::env::var("SELECTED_COLUMNS").unwrap_or(default.selected_columns),
            template_file: std::env::var("TEMPLATE_FILE").unwrap_or(default.template_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}

//! 提取服务 - 业务能力层
//!
//! 只负责"单个文档的字段提取"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//! - 文档以 data URL 形式通过 Vision API 传入

use crate::config::Config;
use crate::error::{AppError, AppResult, ExtractionError};
use crate::models::Document;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, warn};

/// 提取客户端接口（外部协作方边界）
///
/// 约定：
/// - 只请求调用方选中的 `target_fields`，绝不发送完整表头
///   （这是隐私/成本边界）
/// - 找到的字段返回其值；未找到的字段可以省略或返回空字符串
/// - 网络失败、响应损坏、无法产出结构化结果时返回 `ExtractionError`
#[allow(async_fn_in_trait)]
pub trait ExtractionClient {
    /// 对单个文档执行字段提取
    async fn extract(
        &self,
        document: &Document,
        instructions: &str,
        target_fields: &[String],
    ) -> AppResult<HashMap<String, String>>;
}

/// 基于 LLM 的提取客户端
///
/// 职责：
/// - 调用模型 API 对单个文档做字段提取
/// - 把模型输出解析为 字段名 → 值 的映射
/// - 只处理单个文档
/// - 不出现 Vec<Document>
/// - 不关心流程顺序
pub struct LlmExtractionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmExtractionClient {
    /// 创建新的提取客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 构建提取请求的消息
    ///
    /// 返回 (system_message, user_text)
    fn build_messages(instructions: &str, target_fields: &[String]) -> (String, String) {
        let system_message = "你是一个专业的文档信息提取助手。\
                             你会收到一份文档（图片或 PDF）和一组字段名。\
                             只返回一个 JSON 对象，键为给定的字段名，值为从文档中提取的内容。\
                             未找到的字段返回空字符串。\
                             不要返回任何解释、Markdown 或 JSON 以外的内容。"
            .to_string();

        let field_list = target_fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("  {}. {}", i + 1, f))
            .collect::<Vec<_>>()
            .join("\n");

        let user_text = format!(
            r#"{}

需要提取的字段：
{}

只返回一个 JSON 对象，键必须与上面的字段名完全一致。"#,
            instructions, field_list
        );

        (system_message, user_text)
    }

    /// 解析模型的提取响应
    ///
    /// 剥掉可能存在的 Markdown 代码围栏，按 JSON 对象解析，
    /// 标量值统一转为字符串。
    fn parse_extraction_response(&self, response: &str) -> AppResult<HashMap<String, String>> {
        let response = response.trim();

        if response.is_empty() {
            return Err(AppError::Extraction(ExtractionError::EmptyContent {
                model: self.model_name.clone(),
            }));
        }

        // 剥掉 ```json ... ``` 围栏
        let fence_re =
            Regex::new(r"(?s)^\s*```(?:json|JSON)?\s*(.*?)\s*```\s*$").expect("代码围栏正则");
        let body = fence_re
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(response);

        let value: serde_json::Value = serde_json::from_str(body).map_err(|_| {
            AppError::Extraction(ExtractionError::MalformedOutput {
                snippet: snippet_of(response),
            })
        })?;

        let object = value.as_object().ok_or_else(|| {
            AppError::Extraction(ExtractionError::MalformedOutput {
                snippet: snippet_of(response),
            })
        })?;

        let mut fields = HashMap::new();
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                // 嵌套结构不在约定内，保留紧凑 JSON 文本
                other => other.to_string(),
            };
            fields.insert(key.clone(), text);
        }

        Ok(fields)
    }
}

impl ExtractionClient for LlmExtractionClient {
    async fn extract(
        &self,
        document: &Document,
        instructions: &str,
        target_fields: &[String],
    ) -> AppResult<HashMap<String, String>> {
        debug!(
            "调用提取 API，模型: {}, 文档: {}, 字段数: {}",
            self.model_name,
            document.file_name,
            target_fields.len()
        );

        let (system_message, user_text) = Self::build_messages(instructions, target_fields);

        // 构建消息列表
        let mut messages = Vec::new();

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| AppError::extraction_api_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));

        // 构建用户消息内容：文本 + 文档（Vision API）
        let content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText { text: user_text },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: document.data_url.clone(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| AppError::extraction_api_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(2048u32)
            .build()
            .map_err(|e| AppError::extraction_api_failed(&self.model_name, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("提取 API 调用失败: {}", e);
            AppError::extraction_api_failed(&self.model_name, e)
        })?;

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Extraction(ExtractionError::EmptyContent {
                    model: self.model_name.clone(),
                })
            })?;

        self.parse_extraction_response(&content)
    }
}

/// 截取响应片段用于错误信息
fn snippet_of(response: &str) -> String {
    const MAX_LEN: usize = 120;
    if response.chars().count() > MAX_LEN {
        response.chars().take(MAX_LEN).collect::<String>() + "..."
    } else {
        response.to_string()
    }
}

//! LLM 客户端抽象
//!
//! 所有后端（Anthropic / Mock）实现 LlmClient：发送一段对话 + 可选工具目录，
//! 返回纯文本或一个或多个 tool_use 请求。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::types::{GenerationRequest, ModelResponse};

/// LLM 调用失败（传输层）；编排器内部不做重试
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited (retry after {retry_after_ms} ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<ModelResponse, LlmError>;

    /// 获取累计 token 使用统计：(input_tokens, output_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

//! Anthropic Messages API 客户端
//!
//! 通过 reqwest 调用 `{base_url}/v1/messages`（可配置 base_url，兼容代理）；
//! 鉴权可用 x-api-key，也可用 `Authorization: Bearer`（走 Bearer 鉴权的代理），两者可同时设置。
//! 请求体直接序列化 GenerationRequest，响应解析为 ModelResponse 并累计 token 使用。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::llm::types::{
    ContentBlock, ConversationMessage, GenerationRequest, ModelResponse, StopReason, ToolChoice,
    ToolDefinition,
};
use crate::llm::{LlmClient, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: Arc<AtomicU64>,
    pub output_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, input: u64, output: u64) {
        self.input_tokens.fetch_add(input, Ordering::Relaxed);
        self.output_tokens.fetch_add(output, Ordering::Relaxed);
        self.total_tokens.fetch_add(input + output, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.input_tokens.load(Ordering::Relaxed),
            self.output_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// 鉴权凭据
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    /// 以 x-api-key 发送
    pub api_key: Option<String>,
    /// 以 Authorization: Bearer 发送
    pub auth_token: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.auth_token.is_none()
    }
}

/// 请求体：GenerationRequest 加上 model
#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [ConversationMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<StopReason>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Anthropic 客户端：持有 reqwest Client、endpoint、model 与凭据
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    model: String,
    credentials: Credentials,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl AnthropicClient {
    pub fn new(
        base_url: Option<&str>,
        model: &str,
        credentials: Credentials,
        request_timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let base = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{base}/v1/messages"),
            model: model.to_string(),
            credentials,
            usage: TokenUsage::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, body: &MessagesBody<'_>) -> RequestBuilder {
        let mut req = self
            .client
            .post(&self.endpoint)
            .header("anthropic-version", ANTHROPIC_VERSION);
        if let Some(key) = &self.credentials.api_key {
            req = req.header("x-api-key", key);
        }
        if let Some(token) = &self.credentials.auth_token {
            req = req.bearer_auth(token);
        }
        req.json(body)
    }
}

fn map_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e.to_string())
    }
}

/// 非 2xx 状态码映射为 LlmError；429 读取 retry-after（秒）
fn map_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
            retry_after_ms: retry_after.unwrap_or(1) * 1000,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth(message),
        _ => LlmError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<ModelResponse, LlmError> {
        let body = MessagesBody {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: &request.messages,
            tools: request.tools.as_deref(),
            tool_choice: request.tool_choice,
        };

        let resp = self
            .request(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "anthropic request failed");
            return Err(map_status(status, retry_after, &text));
        }

        let parsed: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            self.usage.add(usage.input_tokens, usage.output_tokens);
        }

        Ok(ModelResponse {
            content: parsed.content,
            stop_reason: parsed.stop_reason.unwrap_or(StopReason::EndTurn),
        })
    }
}

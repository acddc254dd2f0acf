//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按顺序返回预置的响应，并记录每次收到的请求，便于断言调用次数、tools 字段与消息序列。

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::llm::types::{GenerationRequest, ModelResponse};
use crate::llm::{LlmClient, LlmError};

/// 脚本化 Mock：每次 generate 弹出一条预置结果
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<ModelResponse, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    /// 可混入错误结果（模拟传输失败）
    pub fn scripted(script: Vec<Result<ModelResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的请求（按调用顺序）
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<ModelResponse, LlmError> {
        self.requests.lock().await.push(request.clone());
        self.script.lock().await.pop_front().unwrap_or_else(|| {
            Err(LlmError::Api {
                status: 500,
                message: "mock script exhausted".to_string(),
            })
        })
    }
}

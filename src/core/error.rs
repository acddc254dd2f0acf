//! 问答链路错误类型
//!
//! 工具相关错误（ToolNotFound / InvalidArguments / ToolExecutionFailed / ToolTimeout）在
//! ToolExecutor::dispatch 中被渲染为工具结果文本，模型可见并自行应对；
//! Llm（传输失败）不做重试，直接向调用方传播。

use thiserror::Error;

use crate::llm::LlmError;

/// 生成与工具调用过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM 调用本身失败（网络、鉴权、限流、超时）
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// 工具执行过程异常终止（panic）
    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    /// 消息序列违反协议（如终止响应没有文本块）
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Config error: {0}")]
    Config(String),
}

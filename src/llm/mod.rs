//! LLM 层：客户端抽象、对话类型与实现（Anthropic / Mock）

pub mod anthropic;
pub mod mock;
pub mod traits;
pub mod types;

pub use anthropic::{AnthropicClient, Credentials, TokenUsage};
pub use mock::MockLlmClient;
pub use traits::{LlmClient, LlmError};
pub use types::{
    check_tool_pairing, ContentBlock, ConversationMessage, GenerationRequest, ModelResponse, Role,
    StopReason, ToolChoice, ToolDefinition, ToolResultBlock, ToolUseBlock,
};

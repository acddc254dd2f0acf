//! Messages API 形状的对话类型
//!
//! ConversationMessage 由若干 ContentBlock 组成：文本、模型发出的 tool_use、编排器回填的 tool_result。
//! 序列化格式与 Anthropic Messages API 一致，可直接作为请求体的一部分。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 消息角色（system 单独放在请求顶层，不进入 messages）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 内容块
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// 模型请求调用的一个工具
#[derive(Clone, Debug, PartialEq)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolUseBlock {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

impl From<ToolUseBlock> for ContentBlock {
    fn from(b: ToolUseBlock) -> Self {
        ContentBlock::ToolUse {
            id: b.id,
            name: b.name,
            input: b.input,
        }
    }
}

/// 编排器执行工具后的结果，tool_use_id 必须对应此前某个 ToolUseBlock.id
#[derive(Clone, Debug, PartialEq)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub content: String,
    /// 调用失败时置位，序列化为 `"is_error": true`
    pub is_error: bool,
}

impl From<ToolResultBlock> for ContentBlock {
    fn from(b: ToolResultBlock) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: b.tool_use_id,
            content: b.content,
            is_error: b.is_error.then_some(true),
        }
    }
}

/// 单条对话消息；一次查询内只追加、不修改
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ConversationMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// 一轮内所有工具结果合并为一条 user 消息
    pub fn tool_results(results: Vec<ToolResultBlock>) -> Self {
        Self {
            role: Role::User,
            content: results.into_iter().map(ContentBlock::from).collect(),
        }
    }

    pub fn is_tool_use(&self) -> bool {
        self.role == Role::Assistant
            && self
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    pub fn is_tool_result(&self) -> bool {
        self.role == Role::User
            && self
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolResult { .. }))
    }
}

/// 提供给模型的工具描述（名称、说明、参数 JSON Schema）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// 工具选择模式；目前只使用 auto（由模型决定是否调用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    Auto,
}

/// 一次生成请求
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub system: String,
    pub messages: Vec<ConversationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// 响应停止原因
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

/// 模型响应：内容块 + 停止原因
#[derive(Clone, Debug, PartialEq)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
}

impl ModelResponse {
    /// 纯文本响应
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
        }
    }

    /// 工具调用响应（可含多个 tool_use）
    pub fn tool_use(calls: Vec<ToolUseBlock>) -> Self {
        Self {
            content: calls.into_iter().map(ContentBlock::from).collect(),
            stop_reason: StopReason::ToolUse,
        }
    }

    /// 停止原因为 tool_use 且至少含一个 tool_use 块
    pub fn is_tool_use(&self) -> bool {
        self.stop_reason == StopReason::ToolUse && !self.tool_uses().is_empty()
    }

    pub fn tool_uses(&self) -> Vec<ToolUseBlock> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolUseBlock::new(id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// 首个内容块的文本；首块不是文本时返回 None
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// 检查每个 tool_result 都对应此前出现过且仅被回填一次的 tool_use id
pub fn check_tool_pairing(messages: &[ConversationMessage]) -> Result<(), String> {
    let mut issued: HashSet<&str> = HashSet::new();
    let mut answered: HashSet<&str> = HashSet::new();
    for msg in messages {
        for block in &msg.content {
            match block {
                ContentBlock::ToolUse { id, .. } => {
                    issued.insert(id.as_str());
                }
                ContentBlock::ToolResult { tool_use_id, .. } => {
                    if !issued.contains(tool_use_id.as_str()) {
                        return Err(format!("tool_result without tool_use: {tool_use_id}"));
                    }
                    if !answered.insert(tool_use_id.as_str()) {
                        return Err(format!("duplicate tool_result: {tool_use_id}"));
                    }
                }
                ContentBlock::Text { .. } => {}
            }
        }
    }
    Ok(())
}

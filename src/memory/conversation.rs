//! 短期记忆：会话问答历史
//!
//! 保留最近 N 轮对话（user/assistant 对），超出时自动剪枝；render 渲染为注入 system prompt 的文本。

use serde::{Deserialize, Serialize};

/// 历史消息角色
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 最近 N 轮对话（每轮含 user + assistant，故实际保留 max_turns*2 条消息）
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
        }
    }

    /// 记录一问一答
    pub fn push_exchange(&mut self, question: &str, answer: &str) {
        self.messages.push(Message::user(question));
        self.messages.push(Message::assistant(answer));
        self.prune();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// 超出 max_turns*2 时丢弃最旧的消息，保留最近部分
    fn prune(&mut self) {
        if self.messages.len() > self.max_turns * 2 {
            let keep = self.max_turns * 2;
            self.messages.drain(..self.messages.len() - keep);
        }
    }

    /// 渲染为 "User: ...\nAssistant: ..."；无消息时返回 None
    pub fn render(&self) -> Option<String> {
        if self.messages.is_empty() {
            return None;
        }
        Some(
            self.messages
                .iter()
                .map(|m| format!("{}: {}", m.role.label(), m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

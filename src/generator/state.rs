//! 生成循环状态
//!
//! Phase 显式表达三个状态（等待模型 / 执行工具 / 完成）；RoundState 只存活于一次 generate 调用，
//! 持有轮次计数、已累积的对话与本次查询的全部引用。

use crate::llm::{ConversationMessage, ModelResponse};
use crate::tools::SourceCitation;

/// 提供工具的最大轮数；达到后再发一次不带工具的请求，强制得到纯文本
pub const MAX_TOOL_ROUNDS: usize = 2;

/// 状态机阶段
#[derive(Debug)]
pub enum Phase {
    /// 请求待发送；offer_tools 决定本次请求是否附带工具目录与 tool_choice
    AwaitingModel { offer_tools: bool },
    /// 模型返回了 tool_use，待执行
    ExecutingTools(ModelResponse),
    /// 终止响应
    Done(ModelResponse),
}

/// 单次查询的轮次状态
#[derive(Debug)]
pub struct RoundState {
    /// 已完成的工具轮数
    pub round: usize,
    pub messages: Vec<ConversationMessage>,
    /// 跨轮累积的引用（按工具调用顺序）
    pub citations: Vec<SourceCitation>,
    /// 已发出的生成请求数
    pub requests: usize,
}

impl RoundState {
    pub fn new(query: &str) -> Self {
        Self {
            round: 0,
            messages: vec![ConversationMessage::user_text(query)],
            citations: Vec::new(),
            requests: 0,
        }
    }

    /// 一轮工具执行结束：轮数 +1，并返回下一次请求是否仍提供工具
    pub fn finish_round(&mut self) -> bool {
        self.round += 1;
        self.round < MAX_TOOL_ROUNDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_round_withdraws_tools() {
        let mut state = RoundState::new("q");
        assert!(state.finish_round());
        assert!(!state.finish_round());
        assert_eq!(state.round, MAX_TOOL_ROUNDS);
    }

    #[test]
    fn test_initial_conversation_is_single_user_turn() {
        let state = RoundState::new("What is Python?");
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0], ConversationMessage::user_text("What is Python?"));
    }
}

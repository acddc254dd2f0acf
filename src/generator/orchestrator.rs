//! 带工具调用的生成循环
//!
//! AwaitingModel -> (tool_use) ExecutingTools -> AwaitingModel ... -> Done。
//! 最多 MAX_TOOL_ROUNDS 轮提供工具；最后一轮工具执行后的请求不带 tools / tool_choice，保证以纯文本结束。
//! 同一响应中的多个 tool_use 并发执行，结果按请求顺序合并为一条 user 消息。
//! 工具失败以文本回填给模型，不中断；LLM 调用失败直接返回错误，不重试。

use std::sync::Arc;

use futures_util::future::join_all;

use crate::core::AgentError;
use crate::generator::prompt::{build_system, GenerationSettings};
use crate::generator::state::{Phase, RoundState};
use crate::llm::{
    check_tool_pairing, ConversationMessage, GenerationRequest, LlmClient, ModelResponse,
    ToolChoice, ToolDefinition, ToolResultBlock,
};
use crate::tools::{SourceCitation, ToolExecutor};

/// 一次生成的结果：最终回答与本次查询内全部工具调用产生的引用
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub answer: String,
    pub citations: Vec<SourceCitation>,
    /// 执行过的工具轮数
    pub rounds: usize,
    /// 发出的生成请求数
    pub requests: usize,
}

/// 生成编排器：持有 LLM、system prompt 与采样参数，可在并发查询间共享
pub struct Generator {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    settings: GenerationSettings,
}

impl Generator {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    fn request(
        &self,
        system: &str,
        messages: &[ConversationMessage],
        tools: Option<&Vec<ToolDefinition>>,
    ) -> GenerationRequest {
        GenerationRequest {
            system: system.to_string(),
            messages: messages.to_vec(),
            tools: tools.cloned(),
            tool_choice: tools.map(|_| ToolChoice::Auto),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// 生成回答
    ///
    /// tools 为 None（或目录为空）时只发一次请求，直接返回首个文本块。
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&ToolExecutor>,
    ) -> Result<GenerationOutcome, AgentError> {
        let system = build_system(&self.system_prompt, history);
        let catalog = tools.filter(|t| !t.is_empty());
        let definitions = catalog.map(|t| t.definitions());

        let mut state = RoundState::new(query);
        let mut phase = Phase::AwaitingModel {
            offer_tools: definitions.is_some(),
        };

        loop {
            phase = match phase {
                Phase::AwaitingModel { offer_tools } => {
                    let request = self.request(
                        &system,
                        &state.messages,
                        definitions.as_ref().filter(|_| offer_tools),
                    );
                    debug_assert!(
                        check_tool_pairing(&request.messages).is_ok(),
                        "unpaired tool_result in conversation"
                    );
                    state.requests += 1;
                    tracing::debug!(
                        round = state.round,
                        request = state.requests,
                        offer_tools,
                        "generation request"
                    );
                    let response = self.llm.generate(&request).await?;
                    if offer_tools && response.is_tool_use() {
                        Phase::ExecutingTools(response)
                    } else {
                        Phase::Done(response)
                    }
                }
                Phase::ExecutingTools(response) => {
                    let Some(executor) = catalog else {
                        return Err(AgentError::ProtocolViolation(
                            "tool_use response without a tool catalog".to_string(),
                        ));
                    };
                    self.run_tool_round(executor, response, &mut state).await;
                    let offer_tools = state.finish_round();
                    Phase::AwaitingModel { offer_tools }
                }
                Phase::Done(response) => {
                    let answer = response.first_text().map(str::to_string).ok_or_else(|| {
                        AgentError::ProtocolViolation(
                            "terminal response does not start with a text block".to_string(),
                        )
                    })?;
                    tracing::info!(
                        rounds = state.round,
                        requests = state.requests,
                        citations = state.citations.len(),
                        "generation done"
                    );
                    return Ok(GenerationOutcome {
                        answer,
                        citations: state.citations,
                        rounds: state.round,
                        requests: state.requests,
                    });
                }
            };
        }
    }

    /// 执行响应中的全部 tool_use：追加 assistant 轮，再追加一条包含全部结果的 user 轮
    async fn run_tool_round(
        &self,
        executor: &ToolExecutor,
        response: ModelResponse,
        state: &mut RoundState,
    ) {
        let calls = response.tool_uses();
        state.messages.push(ConversationMessage::assistant(response.content));

        let outputs = join_all(
            calls
                .iter()
                .map(|call| executor.dispatch(&call.name, call.input.clone())),
        )
        .await;

        let mut results = Vec::with_capacity(calls.len());
        for (call, output) in calls.into_iter().zip(outputs) {
            state.citations.extend(output.citations);
            results.push(ToolResultBlock {
                tool_use_id: call.id,
                content: output.text,
                is_error: output.is_error,
            });
        }
        state.messages.push(ConversationMessage::tool_results(results));
    }
}

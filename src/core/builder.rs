//! 协调器构建器：统一的初始化逻辑
//!
//! 从 AppConfig 创建 LLM、注册课程工具（search_course_content / get_course_outline）、
//! 创建会话存储，组装为 QueryCoordinator。LLM 与会话存储可替换（测试注入 Mock）。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{AgentError, QueryCoordinator};
use crate::generator::{Generator, SYSTEM_PROMPT};
use crate::llm::{AnthropicClient, Credentials, LlmClient};
use crate::memory::{InMemorySessionStore, SessionStore};
use crate::retrieval::CourseRetriever;
use crate::tools::{CourseOutlineTool, CourseSearchTool, ToolExecutor, ToolRegistry};

/// 根据配置创建 LLM 后端
pub fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, AgentError> {
    match cfg.llm.provider.to_lowercase().as_str() {
        "anthropic" => {
            let credentials = Credentials {
                api_key: cfg.llm.resolve_api_key(),
                auth_token: cfg.llm.resolve_auth_token(),
            };
            if credentials.is_empty() {
                return Err(AgentError::Config(
                    "missing credentials (llm.api_key / ANTHROPIC_API_KEY or llm.auth_token / ANTHROPIC_AUTH_TOKEN)"
                        .to_string(),
                ));
            }
            let bearer = credentials.auth_token.is_some();
            let client = AnthropicClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                credentials,
                cfg.llm.timeouts.request,
            )?;
            tracing::info!(
                model = %client.model(),
                endpoint = %client.endpoint(),
                bearer,
                "Using Anthropic LLM"
            );
            Ok(Arc::new(client))
        }
        other => Err(AgentError::Config(format!("unknown llm provider: {other}"))),
    }
}

/// 构建课程工具注册表（注册顺序即工具目录顺序）
pub fn build_tool_registry(retriever: Arc<dyn CourseRetriever>) -> Result<ToolRegistry, AgentError> {
    let mut tools = ToolRegistry::new();
    tools.register(CourseSearchTool::new(retriever.clone()))?;
    tools.register(CourseOutlineTool::new(retriever))?;
    tracing::debug!(tools = ?tools.tool_names(), "course tools registered");
    Ok(tools)
}

/// QueryCoordinator 构建器
pub struct CoordinatorBuilder {
    config: AppConfig,
    retriever: Arc<dyn CourseRetriever>,
    llm: Option<Arc<dyn LlmClient>>,
    sessions: Option<Arc<dyn SessionStore>>,
    system_prompt: String,
}

impl CoordinatorBuilder {
    pub fn new(config: AppConfig, retriever: Arc<dyn CourseRetriever>) -> Self {
        Self {
            config,
            retriever,
            llm: None,
            sessions: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// 使用指定 LLM（不从配置创建）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    pub fn build(self) -> Result<QueryCoordinator, AgentError> {
        let llm = match self.llm {
            Some(llm) => llm,
            None => create_llm_from_config(&self.config)?,
        };
        let sessions: Arc<dyn SessionStore> = match self.sessions {
            Some(sessions) => sessions,
            None => Arc::new(
                InMemorySessionStore::new(self.config.app.max_history)
                    .with_max_sessions(self.config.app.max_sessions),
            ),
        };
        let registry = build_tool_registry(self.retriever.clone())?;
        let executor = ToolExecutor::new(registry, self.config.tools.tool_timeout_secs);
        let generator = Generator::new(llm, self.system_prompt)
            .with_settings(self.config.llm.generation_settings());
        Ok(QueryCoordinator::new(generator, executor, sessions, self.retriever))
    }
}

//! 查询协调器
//!
//! 每个问题：解析或新建会话 -> 读取历史（仅当调用方给出会话 ID）-> 带工具目录调用 Generator ->
//! 取回本次查询的引用 -> 把问答追加到会话历史。
//! 引用随 GenerationOutcome 返回，协调器与工具都不保存跨查询状态，可被并发请求共享。

use std::sync::Arc;

use serde::Serialize;

use crate::core::AgentError;
use crate::generator::Generator;
use crate::memory::{SessionId, SessionStore};
use crate::retrieval::CourseRetriever;
use crate::tools::{SourceCitation, ToolExecutor};

/// 一次查询的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub citations: Vec<SourceCitation>,
}

/// 课程统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

pub struct QueryCoordinator {
    generator: Generator,
    tools: ToolExecutor,
    sessions: Arc<dyn SessionStore>,
    retriever: Arc<dyn CourseRetriever>,
}

/// 发给模型的用户消息
fn question_prompt(question: &str) -> String {
    format!("Answer this question about course materials: {question}")
}

impl QueryCoordinator {
    pub fn new(
        generator: Generator,
        tools: ToolExecutor,
        sessions: Arc<dyn SessionStore>,
        retriever: Arc<dyn CourseRetriever>,
    ) -> Self {
        Self {
            generator,
            tools,
            sessions,
            retriever,
        }
    }

    /// 回答问题
    ///
    /// 未给出 session_id 时新建会话，历史为 None；问答仍记录到新会话中，但该 ID 不返回给调用方，
    /// 这类会话只能等存储按容量淘汰（见 InMemorySessionStore::with_max_sessions）。
    /// 需要多轮对话的调用方应先 create_session 再传入 ID。
    /// LLM 调用失败时直接返回错误，不记录问答。
    pub async fn query(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<QueryOutcome, AgentError> {
        let (session_id, history) = match session_id {
            Some(id) => (id.to_string(), self.sessions.history(id).await),
            None => (self.sessions.create_session().await, None),
        };
        tracing::info!(
            session_id = %session_id,
            has_history = history.is_some(),
            "query"
        );

        let outcome = self
            .generator
            .generate(&question_prompt(question), history.as_deref(), Some(&self.tools))
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "query failed");
                e
            })?;

        self.sessions
            .add_exchange(&session_id, question, &outcome.answer)
            .await;

        Ok(QueryOutcome {
            answer: outcome.answer,
            citations: outcome.citations,
        })
    }

    pub async fn create_session(&self) -> SessionId {
        self.sessions.create_session().await
    }

    pub async fn clear_session(&self, session_id: &str) {
        self.sessions.clear_session(session_id).await;
    }

    pub async fn course_analytics(&self) -> CourseAnalytics {
        let course_titles = self.retriever.course_titles().await;
        CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        }
    }

    /// LLM 累计 token 使用：(input, output, total)
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.generator.token_usage()
    }
}

//! 会话管理
//!
//! SessionStore 是查询协调器依赖的会话能力：创建会话、读取渲染后的历史、追加一问一答。
//! InMemorySessionStore 以 RwLock 保护的 HashMap 保存，同一会话的并发写由写锁串行化；
//! 会话数超过上限时按创建顺序淘汰最旧的会话。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::conversation::ConversationMemory;

/// 会话 ID
pub type SessionId = String;

/// 默认最多保留的会话数
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// 会话能力
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 新建会话并返回 ID
    async fn create_session(&self) -> SessionId;

    /// 渲染后的历史；会话不存在或为空时返回 None
    async fn history(&self, session_id: &str) -> Option<String>;

    /// 追加一问一答；会话不存在时自动创建
    async fn add_exchange(&self, session_id: &str, question: &str, answer: &str);

    /// 清空会话历史
    async fn clear_session(&self, session_id: &str);
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<SessionId, ConversationMemory>,
    /// 创建顺序，用于淘汰
    order: VecDeque<SessionId>,
}

impl Sessions {
    fn get_or_insert(
        &mut self,
        id: &str,
        max_history: usize,
        max_sessions: usize,
    ) -> &mut ConversationMemory {
        if !self.by_id.contains_key(id) {
            while self.by_id.len() >= max_sessions {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.by_id.remove(&oldest);
                tracing::debug!(session_id = %oldest, "session evicted");
            }
            self.order.push_back(id.to_string());
        }
        self.by_id
            .entry(id.to_string())
            .or_insert_with(|| ConversationMemory::new(max_history))
    }
}

/// 内存会话存储（进程重启后丢失）
pub struct InMemorySessionStore {
    sessions: RwLock<Sessions>,
    /// 每个会话保留的问答轮数
    max_history: usize,
    max_sessions: usize,
}

impl InMemorySessionStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            max_history,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// 会话数上限（至少 1）
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self) -> SessionId {
        let id = format!("session_{}", uuid::Uuid::new_v4());
        self.sessions
            .write()
            .await
            .get_or_insert(&id, self.max_history, self.max_sessions);
        tracing::debug!(session_id = %id, "session created");
        id
    }

    async fn history(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.by_id.get(session_id).and_then(|mem| mem.render())
    }

    async fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        self.sessions
            .write()
            .await
            .get_or_insert(session_id, self.max_history, self.max_sessions)
            .push_exchange(question, answer);
    }

    async fn clear_session(&self, session_id: &str) {
        if let Some(mem) = self.sessions.write().await.by_id.get_mut(session_id) {
            mem.clear();
        }
    }
}

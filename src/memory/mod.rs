//! 记忆层：会话问答历史（短期记忆）与会话存储

pub mod conversation;
pub mod session;

pub use conversation::{ConversationMemory, Message, Role};
pub use session::{InMemorySessionStore, SessionId, SessionStore, DEFAULT_MAX_SESSIONS};

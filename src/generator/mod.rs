//! 生成层：system prompt、轮次状态机与带工具调用的生成循环

pub mod orchestrator;
pub mod prompt;
pub mod state;

pub use orchestrator::{GenerationOutcome, Generator};
pub use prompt::{build_system, GenerationSettings, SYSTEM_PROMPT};
pub use state::{Phase, RoundState, MAX_TOOL_ROUNDS};

//! course-qa - 课程资料问答
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、查询协调器（会话 + 生成 + 引用）、构建器
//! - **generator**: 带工具调用的有界生成循环（最多两轮工具，之后强制纯文本）
//! - **llm**: LLM 客户端抽象、Messages API 对话类型与实现（Anthropic / Mock）
//! - **memory**: 会话问答历史与会话存储
//! - **observability**: tracing 初始化
//! - **retrieval**: 检索能力抽象与内存课程目录
//! - **tools**: 工具注册表、执行器、课程搜索与大纲工具

pub mod config;
pub mod core;
pub mod generator;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod retrieval;
pub mod tools;

pub use crate::core::{AgentError, CoordinatorBuilder, QueryCoordinator, QueryOutcome};
pub use crate::tools::SourceCitation;

//! 核心编排层：错误类型、查询协调器与构建器

pub mod builder;
pub mod coordinator;
pub mod error;

pub use builder::{build_tool_registry, create_llm_from_config, CoordinatorBuilder};
pub use coordinator::{CourseAnalytics, QueryCoordinator, QueryOutcome};
pub use error::AgentError;

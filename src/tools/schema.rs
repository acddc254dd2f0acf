//! 工具参数 JSON Schema 生成（schemars 自动生成）
//!
//! 参数结构体同时用于生成提供给模型的 input_schema 与反序列化校验 tool_use 的 input，
//! 两者不会出现不一致。

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::core::AgentError;

/// search_course_content 的参数
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// What to search for in the course content
    pub query: String,
    /// Course title (partial matches work, e.g. 'MCP', 'Introduction')
    #[serde(default)]
    pub course_name: Option<String>,
    /// Specific lesson number to search within (e.g. 1, 2, 3)
    #[serde(default)]
    pub lesson_number: Option<u32>,
}

/// get_course_outline 的参数
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OutlineArgs {
    /// Course title (partial matches work)
    pub course_name: String,
}

/// 生成参数类型的 input_schema（去掉 $schema / title 等根级元信息）
pub fn input_schema<T: JsonSchema>() -> Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| {
        serde_json::json!({ "type": "object", "properties": {} })
    });
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    value
}

/// 按参数类型校验并反序列化 tool_use 的 input
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, AgentError> {
    serde_json::from_value(args).map_err(|e| AgentError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时。每次调用在独立任务中执行：超时转为 AgentError::ToolTimeout（并中止任务），
//! 工具 panic 转为 AgentError::ToolExecutionFailed；每次调用输出结构化审计日志（JSON）。
//! dispatch 把所有工具级错误渲染为结果文本并标记 is_error，模型可以看到失败原因并自行应对。

use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time::timeout;

use crate::core::AgentError;
use crate::llm::ToolDefinition;
use crate::tools::{ToolOutput, ToolRegistry};

/// 工具执行器：对每次调用施加超时
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行指定工具；未注册返回 ToolNotFound，超时返回 ToolTimeout，panic 返回 ToolExecutionFailed
    pub async fn execute(&self, tool_name: &str, args: Value) -> Result<ToolOutput, AgentError> {
        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = match self.registry.get(tool_name) {
            None => Err(AgentError::ToolNotFound(tool_name.to_string())),
            Some(tool) => {
                let mut handle = tokio::spawn(async move { tool.execute(args).await });
                match timeout(self.timeout, &mut handle).await {
                    Ok(Ok(inner)) => inner,
                    Ok(Err(join_err)) => Err(AgentError::ToolExecutionFailed(format!(
                        "{tool_name}: {join_err}"
                    ))),
                    Err(_) => {
                        handle.abort();
                        Err(AgentError::ToolTimeout(tool_name.to_string()))
                    }
                }
            }
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(AgentError::ToolNotFound(_)) => "not_found",
            Err(AgentError::ToolTimeout(_)) => "timeout",
            Err(_) => "error",
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": outcome == "ok",
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        result
    }

    /// 执行并把错误渲染为带 is_error 标记的文本结果
    pub async fn dispatch(&self, tool_name: &str, args: Value) -> ToolOutput {
        match self.execute(tool_name, args).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %tool_name, error = %e, "tool call failed");
                ToolOutput::error(e.to_string())
            }
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

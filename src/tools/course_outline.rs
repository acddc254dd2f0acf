//! 课程大纲工具（get_course_outline）
//!
//! 返回课程标题、链接、讲师与完整课时列表；引用指向课程链接。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::AgentError;
use crate::retrieval::{CourseOutline, CourseRetriever};
use crate::tools::schema::{input_schema, parse_args, OutlineArgs};
use crate::tools::{SourceCitation, Tool, ToolOutput};

pub const OUTLINE_TOOL_NAME: &str = "get_course_outline";

pub struct CourseOutlineTool {
    retriever: Arc<dyn CourseRetriever>,
}

fn render_outline(outline: &CourseOutline) -> String {
    let mut lines = vec![format!("Course: {}", outline.title)];
    if let Some(link) = &outline.link {
        lines.push(format!("Course Link: {link}"));
    }
    if let Some(instructor) = &outline.instructor {
        lines.push(format!("Instructor: {instructor}"));
    }
    lines.push(format!("Lessons ({} total):", outline.lessons.len()));
    for lesson in &outline.lessons {
        lines.push(format!("  Lesson {}: {}", lesson.number, lesson.title));
    }
    lines.join("\n")
}

impl CourseOutlineTool {
    pub fn new(retriever: Arc<dyn CourseRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &str {
        OUTLINE_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get a course outline: title, course link and the complete lesson list"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<OutlineArgs>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, AgentError> {
        let args: OutlineArgs = parse_args(OUTLINE_TOOL_NAME, args)?;
        tracing::info!(course = %args.course_name, "course outline");
        match self.retriever.course_outline(&args.course_name).await {
            Ok(outline) => Ok(ToolOutput::with_citations(
                render_outline(&outline),
                vec![SourceCitation::new(outline.title.clone(), outline.link.clone())],
            )),
            Err(message) => Ok(ToolOutput::text(message)),
        }
    }
}

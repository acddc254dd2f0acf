//! 集成测试共用的工具与目录

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use course_qa::core::AgentError;
use course_qa::llm::{
    ContentBlock, GenerationRequest, LlmClient, LlmError, ModelResponse, Role, ToolUseBlock,
};
use course_qa::retrieval::{CatalogFile, InMemoryCatalog};
use course_qa::tools::{SourceCitation, Tool, ToolOutput};
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// 返回固定文本与引用，并记录每次调用的参数；args 中的 delay_ms 用于打乱完成顺序
pub struct RecordingTool {
    pub name: &'static str,
    pub reply: String,
    pub citations: Vec<SourceCitation>,
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    pub fn new(name: &'static str, reply: &str) -> Self {
        Self {
            name,
            reply: reply.to_string(),
            citations: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_citation(mut self, label: &str, url: Option<&str>) -> Self {
        self.citations
            .push(SourceCitation::new(label, url.map(str::to_string)));
        self
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "records calls"
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, AgentError> {
        if let Some(ms) = args.get("delay_ms").and_then(|v| v.as_u64()) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        self.calls.lock().await.push(args.clone());
        let text = match args.get("tag").and_then(|v| v.as_str()) {
            Some(tag) => format!("{}:{}", self.reply, tag),
            None => self.reply.clone(),
        };
        Ok(ToolOutput::with_citations(text, self.citations.clone()))
    }
}

pub fn tool_use(id: &str, name: &str, input: Value) -> ModelResponse {
    ModelResponse::tool_use(vec![ToolUseBlock::new(id, name, input)])
}

/// 两门课、每门两段的目录
pub fn python_catalog() -> Arc<InMemoryCatalog> {
    let file: CatalogFile = serde_json::from_value(json!({
        "courses": [
            {
                "title": "Python Basics",
                "link": "https://example.com/python",
                "lessons": [
                    {"number": 1, "title": "Intro", "link": "https://example.com/python/1"},
                    {"number": 2, "title": "Functions", "link": "https://example.com/python/2"}
                ]
            },
            {
                "title": "Retrieval Systems",
                "link": "https://example.com/retrieval",
                "lessons": [
                    {"number": 1, "title": "Embeddings", "link": "https://example.com/retrieval/1"},
                    {"number": 2, "title": "Reranking"}
                ]
            }
        ],
        "passages": [
            {"course_title": "Python Basics", "lesson_number": 1, "text": "Content about Python"},
            {"course_title": "Python Basics", "lesson_number": 2, "text": "More Python content"},
            {"course_title": "Retrieval Systems", "lesson_number": 1, "text": "Embeddings turn retrieval queries into vectors"},
            {"course_title": "Retrieval Systems", "lesson_number": 2, "text": "Reranking reorders retrieval candidates"}
        ]
    }))
    .expect("valid catalog");
    Arc::new(InMemoryCatalog::new(file, 5))
}

/// 按对话内容决定响应的 LLM：最后一条是工具结果则给出最终回答，否则按问题关键词发起一次搜索
pub struct KeywordLlm;

#[async_trait]
impl LlmClient for KeywordLlm {
    async fn generate(&self, request: &GenerationRequest) -> Result<ModelResponse, LlmError> {
        tokio::task::yield_now().await;
        let last = request.messages.last().expect("non-empty conversation");
        if last.role == Role::User && last.is_tool_result() {
            return Ok(ModelResponse::text("done"));
        }
        let question = match last.content.first() {
            Some(ContentBlock::Text { text }) => text.to_lowercase(),
            _ => String::new(),
        };
        let (query, course) = if question.contains("retrieval") {
            ("retrieval", "Retrieval Systems")
        } else {
            ("python", "Python Basics")
        };
        Ok(tool_use(
            "tu-1",
            "search_course_content",
            json!({"query": query, "course_name": course}),
        ))
    }
}

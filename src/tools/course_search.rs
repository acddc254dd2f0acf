//! 课程内容搜索工具（search_course_content）
//!
//! 过滤条件原样交给 CourseRetriever；检索错误原样作为工具结果文本，空结果返回固定提示（带过滤条件），
//! 命中时每段渲染为 `[课程 - Lesson n]` 标题 + 正文，并按相同顺序生成引用。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::AgentError;
use crate::retrieval::{CourseRetriever, Passage, SearchQuery, SearchResults};
use crate::tools::schema::{input_schema, parse_args, SearchArgs};
use crate::tools::{SourceCitation, Tool, ToolOutput};

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

/// 搜索工具：无内部可变状态，可在并发查询间共享
pub struct CourseSearchTool {
    retriever: Arc<dyn CourseRetriever>,
}

/// 段落标题（不含方括号），同时作为引用标签
fn passage_label(passage: &Passage) -> String {
    match passage.lesson_number {
        Some(n) => format!("{} - Lesson {}", passage.course_title, n),
        None => passage.course_title.clone(),
    }
}

/// 空结果提示，附带调用时给出的过滤条件
fn no_results_message(query: &SearchQuery) -> String {
    let mut filter_info = String::new();
    if let Some(course) = &query.course_name {
        filter_info.push_str(&format!(" in course '{course}'"));
    }
    if let Some(lesson) = query.lesson_number {
        filter_info.push_str(&format!(" in lesson {lesson}"));
    }
    format!("No relevant content found{filter_info}.")
}

impl CourseSearchTool {
    pub fn new(retriever: Arc<dyn CourseRetriever>) -> Self {
        Self { retriever }
    }

    /// 执行一次检索并格式化
    pub async fn search(&self, query: &SearchQuery) -> ToolOutput {
        tracing::info!(
            query = %query.query,
            course = ?query.course_name,
            lesson = ?query.lesson_number,
            "course search"
        );
        match self.retriever.search(query).await {
            SearchResults::Error(message) => ToolOutput::text(message),
            SearchResults::Empty => ToolOutput::text(no_results_message(query)),
            SearchResults::Hits(passages) if passages.is_empty() => {
                ToolOutput::text(no_results_message(query))
            }
            SearchResults::Hits(passages) => self.format_hits(&passages).await,
        }
    }

    async fn format_hits(&self, passages: &[Passage]) -> ToolOutput {
        let mut sections = Vec::with_capacity(passages.len());
        let mut citations = Vec::with_capacity(passages.len());
        for passage in passages {
            let label = passage_label(passage);
            let url = match passage.lesson_number {
                Some(n) => self.retriever.lesson_link(&passage.course_title, n).await,
                None => None,
            };
            sections.push(format!("[{label}]\n{}", passage.text));
            citations.push(SourceCitation::new(label, url));
        }
        ToolOutput::with_citations(sections.join("\n\n"), citations)
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<SearchArgs>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, AgentError> {
        let args: SearchArgs = parse_args(SEARCH_TOOL_NAME, args)?;
        let mut query = SearchQuery::new(args.query);
        if let Some(course) = args.course_name {
            query = query.with_course(course);
        }
        if let Some(lesson) = args.lesson_number {
            query = query.with_lesson(lesson);
        }
        Ok(self.search(&query).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::CourseOutline;
    use serde_json::json;
    use tokio::sync::Mutex;

    /// 返回固定结果并记录收到的查询
    struct StubRetriever {
        results: SearchResults,
        link: Option<String>,
        seen: Mutex<Vec<SearchQuery>>,
    }

    impl StubRetriever {
        fn new(results: SearchResults, link: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                results,
                link: link.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CourseRetriever for StubRetriever {
        async fn search(&self, query: &SearchQuery) -> SearchResults {
            self.seen.lock().await.push(query.clone());
            self.results.clone()
        }

        async fn lesson_link(&self, _course_title: &str, _lesson_number: u32) -> Option<String> {
            self.link.clone()
        }

        async fn course_outline(&self, course_name: &str) -> Result<CourseOutline, String> {
            Err(format!("No course found matching '{course_name}'"))
        }

        async fn course_titles(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn python_hits() -> SearchResults {
        SearchResults::Hits(vec![
            Passage::new("Content about Python", "Python Basics", Some(1)),
            Passage::new("More Python content", "Python Basics", Some(2)),
        ])
    }

    #[tokio::test]
    async fn test_formats_results_with_headers() {
        let stub = StubRetriever::new(python_hits(), Some("http://example.com/lesson"));
        let tool = CourseSearchTool::new(stub);
        let out = tool.execute(json!({"query": "Python"})).await.unwrap();
        assert_eq!(
            out.text,
            "[Python Basics - Lesson 1]\nContent about Python\n\n[Python Basics - Lesson 2]\nMore Python content"
        );
    }

    #[tokio::test]
    async fn test_citations_follow_rank_order() {
        let stub = StubRetriever::new(python_hits(), Some("http://example.com/lesson"));
        let tool = CourseSearchTool::new(stub);
        let out = tool.execute(json!({"query": "Python"})).await.unwrap();
        let labels: Vec<&str> = out.citations.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Python Basics - Lesson 1", "Python Basics - Lesson 2"]);
        assert_eq!(out.citations[0].url.as_deref(), Some("http://example.com/lesson"));
    }

    #[tokio::test]
    async fn test_passage_without_lesson_has_bare_header() {
        let stub = StubRetriever::new(
            SearchResults::Hits(vec![Passage::new("Overview", "My Course", None)]),
            Some("http://ignored"),
        );
        let tool = CourseSearchTool::new(stub);
        let out = tool.execute(json!({"query": "overview"})).await.unwrap();
        assert!(out.text.starts_with("[My Course]\n"));
        assert_eq!(out.citations, vec![SourceCitation::new("My Course", None)]);
    }

    #[tokio::test]
    async fn test_empty_results_message() {
        let tool = CourseSearchTool::new(StubRetriever::new(SearchResults::Empty, None));
        let out = tool.execute(json!({"query": "something"})).await.unwrap();
        assert_eq!(out.text, "No relevant content found.");
        assert!(out.citations.is_empty());
    }

    #[tokio::test]
    async fn test_empty_results_mention_filters() {
        let tool = CourseSearchTool::new(StubRetriever::new(SearchResults::Empty, None));
        let out = tool
            .execute(json!({"query": "something", "course_name": "Python Basics", "lesson_number": 3}))
            .await
            .unwrap();
        assert!(out.text.contains("No relevant content found"));
        assert!(out.text.contains("Python Basics"));
        assert!(out.text.contains("lesson 3"));
    }

    #[tokio::test]
    async fn test_retrieval_error_returned_verbatim() {
        let msg = "Search error: n_results cannot be greater than the number of elements in the index";
        let tool = CourseSearchTool::new(StubRetriever::new(SearchResults::Error(msg.to_string()), None));
        let out = tool.execute(json!({"query": "something"})).await.unwrap();
        assert_eq!(out.text, msg);
        assert!(out.citations.is_empty());
    }

    #[tokio::test]
    async fn test_filters_passed_through_unchanged() {
        let stub = StubRetriever::new(SearchResults::Empty, None);
        let tool = CourseSearchTool::new(stub.clone());
        tool.execute(json!({"query": "Python", "course_name": "python basics", "lesson_number": 2}))
            .await
            .unwrap();
        tool.execute(json!({"query": "Python", "course_name": "Python Basics"}))
            .await
            .unwrap();
        let seen = stub.seen.lock().await;
        assert_eq!(seen[0], SearchQuery::new("Python").with_course("python basics").with_lesson(2));
        assert_eq!(seen[1], SearchQuery::new("Python").with_course("Python Basics"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let tool = CourseSearchTool::new(StubRetriever::new(SearchResults::Empty, None));
        let err = tool.execute(json!({"course_name": "x"})).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidArguments { .. }));
    }
}

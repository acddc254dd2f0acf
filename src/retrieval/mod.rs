//! 检索能力：课程内容搜索、课时链接、课程大纲
//!
//! CourseRetriever 是外部向量索引的抽象；搜索结果三态：命中列表 / 空 / 错误（人类可读信息）。
//! InMemoryCatalog 是随 crate 提供的内存实现（关键词打分），供二进制与测试使用。

pub mod catalog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use catalog::{CatalogFile, CourseRecord, InMemoryCatalog, LessonRecord};

/// 检索请求：查询文本 + 可选课程 / 课时过滤
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub course_name: Option<String>,
    pub lesson_number: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_course(mut self, course_name: impl Into<String>) -> Self {
        self.course_name = Some(course_name.into());
        self
    }

    pub fn with_lesson(mut self, lesson_number: u32) -> Self {
        self.lesson_number = Some(lesson_number);
        self
    }
}

/// 检索到的一段文本及其出处
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub course_title: String,
    #[serde(default)]
    pub lesson_number: Option<u32>,
}

impl Passage {
    pub fn new(text: impl Into<String>, course_title: impl Into<String>, lesson_number: Option<u32>) -> Self {
        Self {
            text: text.into(),
            course_title: course_title.into(),
            lesson_number,
        }
    }
}

/// 搜索结果
#[derive(Clone, Debug, PartialEq)]
pub enum SearchResults {
    /// 按相关度排序，非空
    Hits(Vec<Passage>),
    Empty,
    Error(String),
}

impl SearchResults {
    /// 空列表归一化为 Empty
    pub fn from_passages(passages: Vec<Passage>) -> Self {
        if passages.is_empty() {
            SearchResults::Empty
        } else {
            SearchResults::Hits(passages)
        }
    }
}

/// 课时条目
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonInfo {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// 课程大纲
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub title: String,
    pub link: Option<String>,
    pub instructor: Option<String>,
    pub lessons: Vec<LessonInfo>,
}

/// 检索能力
#[async_trait]
pub trait CourseRetriever: Send + Sync {
    /// 过滤条件原样交给实现；课程名的模糊解析（若有）由实现负责
    async fn search(&self, query: &SearchQuery) -> SearchResults;

    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;

    async fn course_outline(&self, course_name: &str) -> Result<CourseOutline, String>;

    /// 全部课程标题（用于统计）
    async fn course_titles(&self) -> Vec<String>;
}

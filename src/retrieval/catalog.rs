//! 内存课程目录
//!
//! 从 JSON 文件加载已分块的课程段落与课程元数据；搜索按查询词命中数打分，
//! 同分保持文件内顺序，返回前 max_results 条。课程名支持大小写无关的精确或子串匹配。

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CourseOutline, CourseRetriever, LessonInfo, Passage, SearchQuery, SearchResults};

/// 课时记录
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonRecord {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// 课程记录
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseRecord {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonRecord>,
}

/// 目录文件格式
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub courses: Vec<CourseRecord>,
    #[serde(default)]
    pub passages: Vec<Passage>,
}

/// 内存目录
#[derive(Clone, Debug)]
pub struct InMemoryCatalog {
    courses: Vec<CourseRecord>,
    passages: Vec<Passage>,
    max_results: usize,
}

/// 小写化并按非字母数字切分，丢弃单字符词
fn terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

impl InMemoryCatalog {
    pub fn new(file: CatalogFile, max_results: usize) -> Self {
        Self {
            courses: file.courses,
            passages: file.passages,
            max_results: max_results.max(1),
        }
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path, max_results: usize) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Read catalog {}: {}", path.display(), e))?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .map_err(|e| format!("Parse catalog {}: {}", path.display(), e))?;
        tracing::info!(
            path = %path.display(),
            courses = file.courses.len(),
            passages = file.passages.len(),
            "catalog loaded"
        );
        Ok(Self::new(file, max_results))
    }

    /// 课程名解析：先精确（忽略大小写），再子串
    fn resolve_course(&self, name: &str) -> Option<&CourseRecord> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.courses
            .iter()
            .find(|c| c.title.to_lowercase() == needle)
            .or_else(|| {
                self.courses
                    .iter()
                    .find(|c| c.title.to_lowercase().contains(&needle))
            })
    }

    fn score(query_terms: &HashSet<String>, passage: &Passage) -> usize {
        let words: HashSet<String> = terms(&passage.text).into_iter().collect();
        query_terms.iter().filter(|t| words.contains(*t)).count()
    }
}

#[async_trait]
impl CourseRetriever for InMemoryCatalog {
    async fn search(&self, query: &SearchQuery) -> SearchResults {
        let course_title = match &query.course_name {
            Some(name) => match self.resolve_course(name) {
                Some(course) => Some(course.title.as_str()),
                None => return SearchResults::Error(format!("No course found matching '{name}'")),
            },
            None => None,
        };

        let query_terms: HashSet<String> = terms(&query.query).into_iter().collect();
        if query_terms.is_empty() {
            return SearchResults::Empty;
        }

        let mut scored: Vec<(usize, &Passage)> = self
            .passages
            .iter()
            .filter(|p| course_title.map_or(true, |t| p.course_title == t))
            .filter(|p| query.lesson_number.map_or(true, |n| p.lesson_number == Some(n)))
            .map(|p| (Self::score(&query_terms, p), p))
            .filter(|(score, _)| *score > 0)
            .collect();
        // sort_by 是稳定排序，同分保持原顺序
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        SearchResults::from_passages(
            scored
                .into_iter()
                .take(self.max_results)
                .map(|(_, p)| p.clone())
                .collect(),
        )
    }

    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        self.courses
            .iter()
            .find(|c| c.title == course_title)?
            .lessons
            .iter()
            .find(|l| l.number == lesson_number)?
            .link
            .clone()
    }

    async fn course_outline(&self, course_name: &str) -> Result<CourseOutline, String> {
        let course = self
            .resolve_course(course_name)
            .ok_or_else(|| format!("No course found matching '{course_name}'"))?;
        let mut lessons: Vec<LessonInfo> = course
            .lessons
            .iter()
            .map(|l| LessonInfo {
                number: l.number,
                title: l.title.clone(),
                link: l.link.clone(),
            })
            .collect();
        lessons.sort_by_key(|l| l.number);
        Ok(CourseOutline {
            title: course.title.clone(),
            link: course.link.clone(),
            instructor: course.instructor.clone(),
            lessons,
        })
    }

    async fn course_titles(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.title.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> InMemoryCatalog {
        let file: CatalogFile = serde_json::from_value(serde_json::json!({
            "courses": [
                {
                    "title": "Python Basics",
                    "link": "https://example.com/python",
                    "instructor": "Ada",
                    "lessons": [
                        {"number": 2, "title": "Functions", "link": "https://example.com/python/2"},
                        {"number": 1, "title": "Variables", "link": "https://example.com/python/1"}
                    ]
                },
                {"title": "Advanced Rust", "lessons": [{"number": 1, "title": "Lifetimes"}]}
            ],
            "passages": [
                {"course_title": "Python Basics", "lesson_number": 1, "text": "Variables hold values in Python"},
                {"course_title": "Python Basics", "lesson_number": 2, "text": "Functions in Python take arguments and return values"},
                {"course_title": "Advanced Rust", "lesson_number": 1, "text": "Lifetimes describe how long references are valid"}
            ]
        }))
        .unwrap();
        InMemoryCatalog::new(file, 5)
    }

    #[tokio::test]
    async fn test_search_ranks_by_term_hits() {
        let catalog = sample();
        match catalog.search(&SearchQuery::new("python functions")).await {
            SearchResults::Hits(hits) => {
                assert_eq!(hits.len(), 2);
                assert_eq!(hits[0].lesson_number, Some(2));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_with_course_and_lesson_filter() {
        let catalog = sample();
        let q = SearchQuery::new("values").with_course("python").with_lesson(1);
        match catalog.search(&q).await {
            SearchResults::Hits(hits) => {
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].text, "Variables hold values in Python");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_unknown_course_is_error() {
        let catalog = sample();
        let q = SearchQuery::new("values").with_course("Haskell");
        assert_eq!(
            catalog.search(&q).await,
            SearchResults::Error("No course found matching 'Haskell'".to_string())
        );
    }

    #[tokio::test]
    async fn test_search_no_match_is_empty() {
        let catalog = sample();
        assert_eq!(catalog.search(&SearchQuery::new("kubernetes")).await, SearchResults::Empty);
    }

    #[tokio::test]
    async fn test_lesson_link_and_outline() {
        let catalog = sample();
        assert_eq!(
            catalog.lesson_link("Python Basics", 2).await.as_deref(),
            Some("https://example.com/python/2")
        );
        assert!(catalog.lesson_link("Advanced Rust", 1).await.is_none());

        let outline = catalog.course_outline("python basics").await.unwrap();
        assert_eq!(outline.lessons[0].number, 1);
        assert_eq!(outline.instructor.as_deref(), Some("Ada"));
        assert!(catalog.course_outline("Go").await.is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"courses":[{{"title":"C101"}}],"passages":[{{"course_title":"C101","text":"pointers and memory"}}]}}"#
        )
        .unwrap();
        let catalog = InMemoryCatalog::load(f.path(), 3).unwrap();
        assert_eq!(catalog.course_titles().await, vec!["C101".to_string()]);
        assert!(matches!(
            catalog.search(&SearchQuery::new("memory")).await,
            SearchResults::Hits(_)
        ));
    }
}

pub mod course_outline;
pub mod course_search;
pub mod executor;
pub mod output;
pub mod registry;
pub mod schema;

pub use course_outline::{CourseOutlineTool, OUTLINE_TOOL_NAME};
pub use course_search::{CourseSearchTool, SEARCH_TOOL_NAME};
pub use executor::ToolExecutor;
pub use output::{SourceCitation, ToolOutput};
pub use registry::{Tool, ToolRegistry};
pub use schema::{input_schema, parse_args, OutlineArgs, SearchArgs};

//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COURSE_QA__*` 覆盖（双下划线表示嵌套，如 `COURSE_QA__LLM__MODEL=...`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::generator::GenerationSettings;
use crate::memory::DEFAULT_MAX_SESSIONS;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tools: ToolsSection,
    pub retrieval: RetrievalSection,
}

/// [app] 段：应用名、会话历史保留轮数、会话数上限
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 每个会话保留的问答轮数（注入 system prompt 的历史）
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// 内存中最多保留的会话数，超出时淘汰最早创建的
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            max_history: default_max_history(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_max_history() -> usize {
    2
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

/// [llm] 段：后端、模型、采样参数与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：目前仅 anthropic
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 未设置时读取环境变量 ANTHROPIC_API_KEY
    pub api_key: Option<String>,
    /// Bearer token（经鉴权代理访问时使用）；未设置时读取环境变量 ANTHROPIC_AUTH_TOKEN
    pub auth_token: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key: None,
            auth_token: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

impl LlmSection {
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// 配置中的 api_key 优先，其次环境变量 ANTHROPIC_API_KEY
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(&self.api_key, "ANTHROPIC_API_KEY")
    }

    /// 配置中的 auth_token 优先，其次环境变量 ANTHROPIC_AUTH_TOKEN
    pub fn resolve_auth_token(&self) -> Option<String> {
        resolve_secret(&self.auth_token, "ANTHROPIC_AUTH_TOKEN")
    }
}

/// 空白值视为未设置
fn resolve_secret(configured: &Option<String>, env_var: &str) -> Option<String> {
    configured
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    800
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次生成请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [tools] 段：工具超时、检索返回条数
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// 每次检索最多返回的段落数
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> usize {
    5
}

/// [retrieval] 段：课程目录文件
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalSection {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/catalog.json")
}

/// 从 config 目录加载配置，环境变量 COURSE_QA__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 COURSE_QA__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COURSE_QA")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

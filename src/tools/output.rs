//! 工具输出：给模型看的文本 + 给调用方的结构化引用

use serde::{Deserialize, Serialize};

/// 引用来源：人类可读标签 + 可选链接
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub label: String,
    pub url: Option<String>,
}

impl SourceCitation {
    pub fn new(label: impl Into<String>, url: Option<String>) -> Self {
        Self {
            label: label.into(),
            url,
        }
    }
}

/// 一次工具执行的结果；引用随返回值显式传递，不在工具实例上缓存
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub citations: Vec<SourceCitation>,
    /// 调用本身失败（未注册、参数错误、超时、panic）；工具正常返回的提示文本不算
    pub is_error: bool,
}

impl ToolOutput {
    /// 无引用的纯文本结果（错误信息、空结果等）
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
            is_error: false,
        }
    }

    /// 失败调用的结果文本
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    pub fn with_citations(text: impl Into<String>, citations: Vec<SourceCitation>) -> Self {
        Self {
            text: text.into(),
            citations,
            is_error: false,
        }
    }
}

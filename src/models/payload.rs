use serde_json::Value as JsonValue;

/// 从回复中提取出的结构化答案
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPayload {
    /// 答案，保证非 null
    pub answer: JsonValue,
    pub explanation: Option<String>,
    /// 解析成功的原始候选文本，投递时原样发送
    pub raw: String,
}

/// 页面上一条回复区域的快照
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSnapshot {
    /// 区域完整文本
    pub text: String,
    /// 区域内代码块文本，按选择器优先级、文档顺序排列
    #[serde(default)]
    pub code_blocks: Vec<String>,
}

impl RegionSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code_blocks: Vec::new(),
        }
    }

    pub fn with_code_block(mut self, block: impl Into<String>) -> Self {
        self.code_blocks.push(block.into());
        self
    }
}

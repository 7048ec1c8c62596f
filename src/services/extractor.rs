//! 答案提取 - 业务能力层
//!
//! 从一段回复文本中找出 `{answer, explanation}` 结构。纯函数，不抛错：
//! 解析失败和"回复还没写完"在这一层无法区分，统一返回 `None`。

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::models::ExtractedPayload;

/// ```json ... ``` 围栏，语言标记可选
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid regex"));

/// 同时含 answer 与 explanation 的花括号片段
static ANSWER_AND_EXPLANATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\{.*?"answer".*?"explanation".*?\}"#).expect("valid regex")
});

/// 回复区域全文中的宽松匹配，只要求 answer
pub(crate) static RELAXED_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\{.*?"answer".*?\}"#).expect("valid regex"));

/// 迟到兜底使用的严格匹配，要求两个键都在
pub(crate) static STRICT_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{.*?"answer".*?"explanation".*?\}"#).expect("valid regex")
});

/// 去掉零宽字符和 BOM，再去掉首尾空白
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// 选出待解析的候选文本：围栏内容 > 双键片段 > 全文
fn candidate(cleaned: &str) -> &str {
    if let Some(inner) = FENCED_BLOCK
        .captures(cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
    {
        return inner;
    }

    ANSWER_AND_EXPLANATION
        .find(cleaned)
        .map(|m| m.as_str())
        .unwrap_or(cleaned)
}

/// 提取答案
pub fn extract(text: &str) -> Option<ExtractedPayload> {
    let cleaned = clean_text(text);
    let raw = candidate(&cleaned);

    let parsed: JsonValue = serde_json::from_str(raw).ok()?;
    let object = parsed.as_object()?;
    let answer = object.get("answer").filter(|v| !v.is_null())?.clone();
    let explanation = object
        .get("explanation")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Some(ExtractedPayload {
        answer,
        explanation,
        raw: raw.to_string(),
    })
}

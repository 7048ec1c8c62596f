use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// 宿主发来的一道题
///
/// 字段名沿用宿主消息：`type` / `question` / `options` / `previousCorrection`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_correction: Option<Correction>,
}

impl QuestionRequest {
    pub fn new(kind: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            prompt: prompt.into(),
            options: None,
            previous_correction: None,
        }
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.previous_correction = Some(correction);
        self
    }

    pub fn question_kind(&self) -> QuestionKind {
        QuestionKind::parse(&self.kind)
    }
}

/// 选项集合：选择题是数组，连线题是 `{prompts, choices}` 对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionSet {
    MultipleChoice(Vec<String>),
    Matching {
        prompts: Vec<String>,
        choices: Vec<String>,
    },
}

/// 上一题的纠正信息，只用于拼接提示词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    /// 缺失或为 null 时视为空串，纠正不生效但题目照常提交
    #[serde(rename = "question", default, deserialize_with = "null_as_empty")]
    pub prior_question: String,
    #[serde(default)]
    pub correct_answer: JsonValue,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Correction {
    pub fn new(prior_question: impl Into<String>, correct_answer: JsonValue) -> Self {
        Self {
            prior_question: prior_question.into(),
            correct_answer,
        }
    }

    /// 题干为空或答案缺失（null / "" / false / 0）时不拼接纠正
    pub fn is_usable(&self) -> bool {
        if self.prior_question.is_empty() {
            return false;
        }
        match &self.correct_answer {
            JsonValue::Null => false,
            JsonValue::Bool(b) => *b,
            JsonValue::String(s) => !s.is_empty(),
            JsonValue::Number(n) => n.as_f64().map_or(true, |v| v != 0.0),
            _ => true,
        }
    }
}

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    SelectAll,
    Matching,
    FillInTheBlank,
    Other,
}

static KINDS: phf::Map<&'static str, QuestionKind> = phf_map! {
    "multiple_choice" => QuestionKind::MultipleChoice,
    "true_false" => QuestionKind::TrueFalse,
    "select_all" => QuestionKind::SelectAll,
    "matching" => QuestionKind::Matching,
    "fill_in_the_blank" => QuestionKind::FillInTheBlank,
};

impl QuestionKind {
    /// 从宿主的 `type` 字符串解析，未知题型归为 `Other`
    pub fn parse(s: &str) -> Self {
        KINDS.get(s).copied().unwrap_or(QuestionKind::Other)
    }
}

//! 提示词渲染 - 业务能力层
//!
//! 把一道题拼成发给对话框的完整文本，纯函数

use crate::models::{OptionSet, QuestionKind, QuestionRequest};

const MATCHING_INSTRUCTION: &str = "Please match each prompt with the correct choice. Format your answer as an array where each element is 'Prompt -> Choice'.";

const FILL_IN_THE_BLANK_INSTRUCTION: &str = "This is a fill in the blank question. If there are multiple blanks, provide answers as an array in order of appearance. For a single blank, you can provide a string.";

const EXACT_OPTION_INSTRUCTION: &str = "IMPORTANT: Your answer must EXACTLY match one of the above options. Do not include numbers in your answer. If there are periods, include them.";

const CLOSING_INSTRUCTION: &str = "Please provide your answer in JSON format with keys \"answer\" and \"explanation\". Explanations should be no more than one sentence. DO NOT acknowledge the correction in your response, only answer the new question.";

/// 渲染提示词
pub fn render_prompt(request: &QuestionRequest) -> String {
    let mut text = format!("Type: {}\nQuestion: {}", request.kind, request.prompt);

    if let Some(correction) = request.previous_correction.as_ref().filter(|c| c.is_usable()) {
        text = format!(
            "CORRECTION FROM PREVIOUS ANSWER: For the question \"{}\", your answer was incorrect. The correct answer was: {}\n\nNow answer this new question:\n\n{}",
            correction.prior_question, correction.correct_answer, text
        );
    }

    match (request.question_kind(), request.options.as_ref()) {
        (QuestionKind::Matching, Some(OptionSet::Matching { prompts, choices })) => {
            text.push_str("\nPrompts:\n");
            text.push_str(&enumerate(prompts));
            text.push_str("\nChoices:\n");
            text.push_str(&enumerate(choices));
            text.push_str("\n\n");
            text.push_str(MATCHING_INSTRUCTION);
        }
        (QuestionKind::FillInTheBlank, _) => {
            text.push_str("\n\n");
            text.push_str(FILL_IN_THE_BLANK_INSTRUCTION);
        }
        (_, Some(OptionSet::MultipleChoice(options))) if !options.is_empty() => {
            text.push_str("\nOptions:\n");
            text.push_str(&enumerate(options));
            text.push_str("\n\n");
            text.push_str(EXACT_OPTION_INSTRUCTION);
        }
        _ => {}
    }

    text.push_str("\n\n");
    text.push_str(CLOSING_INSTRUCTION);
    text
}

/// 从 1 开始编号，每项一行
fn enumerate(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

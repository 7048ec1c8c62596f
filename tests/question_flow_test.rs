mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{MockSurface, RecordingSink, PAYLOAD};
use deepseek_question_submit::channel::{Ack, ChannelSink, HostLine, InboundMessage, OutboundMessage};
use deepseek_question_submit::config::{ObservationTiming, SelectorConfig, SubmitTiming};
use deepseek_question_submit::models::{Correction, OptionSet, QuestionRequest, RegionSnapshot};
use deepseek_question_submit::orchestrator::serve;
use deepseek_question_submit::workflow::{ObservationOutcome, ObserverState, QuestionFlow};
use serde_json::json;
use tokio::sync::mpsc;

fn flow(surface: &Arc<MockSurface>, sink: Arc<dyn deepseek_question_submit::ResponseSink>) -> QuestionFlow {
    QuestionFlow::new(
        surface.clone(),
        sink,
        SelectorConfig::default(),
        ObservationTiming::default(),
        SubmitTiming::default(),
    )
}

fn receive(question: QuestionRequest) -> InboundMessage {
    InboundMessage::ReceiveQuestion { question }
}

#[tokio::test(start_paused = true)]
async fn test_multiple_choice_scenario() {
    let surface = MockSurface::new();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    let question = QuestionRequest::new("multiple_choice", "2+2?").with_options(
        OptionSet::MultipleChoice(vec!["3".into(), "4".into(), "5".into()]),
    );
    surface.reply_on_send(
        RegionSnapshot::new(format!("The sum is four.\n{}", PAYLOAD)).with_code_block(PAYLOAD),
    );

    let ack = flow.handle(receive(question)).await;
    assert_eq!(ack, Ack::processing());
    assert_eq!(surface.clicks.load(Ordering::SeqCst), 1);

    let written = surface.written();
    assert_eq!(written.len(), 1);
    assert!(written[0].contains("1. 3\n2. 4\n3. 5"));
    assert!(written[0].contains("must EXACTLY match one of the above options"));

    assert_eq!(flow.controller().wait().await, Some(ObservationOutcome::Delivered));
    assert_eq!(sink.responses(), vec![PAYLOAD.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_matching_scenario_prompt() {
    let surface = MockSurface::new();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    let question = QuestionRequest::new("matching", "Match letters").with_options(OptionSet::Matching {
        prompts: vec!["A".into(), "B".into()],
        choices: vec!["X".into(), "Y".into()],
    });

    assert!(flow.handle(receive(question)).await.is_received());

    let text = &surface.written()[0];
    assert!(text.contains("Prompts:\n1. A\n2. B"));
    assert!(text.contains("Choices:\n1. X\n2. Y"));
    assert!(text.contains("'Prompt -> Choice'"));

    flow.controller().reset().await;
}

#[tokio::test(start_paused = true)]
async fn test_correction_scenario_prompt() {
    let surface = MockSurface::new();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    let question = QuestionRequest::new("multiple_choice", "3+3?")
        .with_options(OptionSet::MultipleChoice(vec!["6".into(), "9".into()]))
        .with_correction(Correction::new("1+1?", json!("2")));

    flow.handle(receive(question)).await;

    let text = &surface.written()[0];
    assert!(text.starts_with("CORRECTION FROM PREVIOUS ANSWER"));
    assert!(text.contains("\"1+1?\""));
    assert!(text.contains("The correct answer was: \"2\""));
    let correction_at = text.find("1+1?").unwrap();
    let question_at = text.find("Question: 3+3?").unwrap();
    assert!(correction_at < question_at);
    assert!(text.ends_with("DO NOT acknowledge the correction in your response, only answer the new question."));

    flow.controller().reset().await;
}

#[tokio::test(start_paused = true)]
async fn test_missing_input_fails_ack() {
    let surface = MockSurface::new();
    surface.remove_input();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    let ack = flow.handle(receive(QuestionRequest::new("true_false", "Is 2 even?"))).await;

    assert_eq!(ack, Ack::failed("Input area not found"));
    assert_eq!(flow.controller().state(), ObserverState::Idle);
    assert_eq!(surface.clicks.load(Ordering::SeqCst), 0);
    assert_eq!(surface.watch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_send_button_fails_ack() {
    let surface = MockSurface::new();
    surface.disable_send();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    let ack = flow.handle(receive(QuestionRequest::new("true_false", "Is 2 even?"))).await;

    assert_eq!(ack, Ack::failed("Send button not found"));
    assert_eq!(flow.controller().state(), ObserverState::Idle);
    assert_eq!(surface.written().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_second_question_cancels_first() {
    let surface = MockSurface::new();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    flow.handle(receive(QuestionRequest::new("true_false", "First?"))).await;
    let first = flow.controller().current_session().unwrap();

    // 第一题的回复在第二题提交前出现，基线会把它排除
    surface.push_region(RegionSnapshot::new("thinking"));
    surface.reply_on_send(RegionSnapshot::new(PAYLOAD).with_code_block(PAYLOAD));
    flow.handle(receive(QuestionRequest::new("true_false", "Second?"))).await;
    let second = flow.controller().current_session().unwrap();

    assert!(!first.is_active());
    assert!(!first.has_responded());
    assert_eq!(second.baseline(), 1);

    assert_eq!(flow.controller().wait().await, Some(ObservationOutcome::Delivered));
    assert_eq!(sink.responses(), vec![PAYLOAD.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_reset_message() {
    let surface = MockSurface::new();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());

    assert_eq!(flow.handle(InboundMessage::Reset).await, Ack::reset());

    flow.handle(receive(QuestionRequest::new("true_false", "Q?"))).await;
    assert_eq!(flow.controller().state(), ObserverState::Observing);
    assert_eq!(flow.handle(InboundMessage::Reset).await, Ack::reset());
    assert_eq!(flow.controller().state(), ObserverState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_host_loop_end_to_end() {
    let surface = MockSurface::new();
    surface.reply_on_send(
        RegionSnapshot::new(format!("Sure!\n```json\n{}\n```", PAYLOAD)).with_code_block(PAYLOAD),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let flow = flow(&surface, Arc::new(ChannelSink::new(tx.clone())));

    let input = concat!(
        "not json\n",
        "\n",
        r#"{"type":"receiveQuestion","question":{"type":"multiple_choice","question":"2+2?","options":["3","4","5"]}}"#,
        "\n",
    );

    serve(&flow, input.as_bytes(), tx).await.unwrap();
    drop(flow);

    let mut lines = Vec::new();
    while let Some(line) = rx.recv().await {
        lines.push(line);
    }

    assert_eq!(
        lines,
        vec![
            HostLine::Ack(Ack::processing()),
            HostLine::Message(OutboundMessage::DeepseekResponse {
                response: PAYLOAD.to_string()
            }),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_host_loop_acks_malformed_questions() {
    let surface = MockSurface::new();
    let sink = RecordingSink::new();
    let flow = flow(&surface, sink.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = concat!(
        r#"{"type":"receiveQuestion","question":{"type":"matching","question":"Match","options":{"prompts":["A"]}}}"#,
        "\n",
        r#"{"type":"receiveQuestion","question":{"type":"multiple_choice","question":"2+2?","options":["3","4","5"],"previousCorrection":{"question":null,"correctAnswer":null}}}"#,
        "\n",
        r#"{"type":"somethingElse"}"#,
        "\n",
    );

    serve(&flow, input.as_bytes(), tx).await.unwrap();
    drop(flow);

    let mut acks = Vec::new();
    while let Some(line) = rx.recv().await {
        if let HostLine::Ack(ack) = line {
            acks.push(ack);
        }
    }

    // 连线题缺少 choices：失败回执；纠正字段为 null：照常提交
    assert_eq!(acks.len(), 2);
    assert!(!acks[0].is_received());
    assert_eq!(acks[1], Ack::processing());

    let written = surface.written();
    assert_eq!(written.len(), 1);
    assert!(written[0].contains("Question: 2+2?"));
    assert!(!written[0].contains("CORRECTION"));
    assert!(sink.responses().is_empty());
}

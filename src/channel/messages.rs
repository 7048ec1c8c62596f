//! 宿主消息格式
//!
//! 入站：`receiveQuestion` / `reset`；出站：`deepseekResponse` 与回执。

use serde::{Deserialize, Serialize};

use crate::models::QuestionRequest;

/// 宿主发来的消息
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    ReceiveQuestion { question: QuestionRequest },
    Reset,
}

/// 发往宿主的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// `response` 为匹配到的原始文本，不重新编码
    DeepseekResponse { response: String },
}

/// 入站消息的回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Ack {
    Accepted { received: bool, status: String },
    Rejected { received: bool, error: String },
}

impl Ack {
    pub fn processing() -> Self {
        Ack::Accepted {
            received: true,
            status: "processing".to_string(),
        }
    }

    pub fn reset() -> Self {
        Ack::Accepted {
            received: true,
            status: "reset".to_string(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Ack::Rejected {
            received: false,
            error: error.into(),
        }
    }

    pub fn is_received(&self) -> bool {
        match self {
            Ack::Accepted { received, .. } | Ack::Rejected { received, .. } => *received,
        }
    }
}

/// 写往宿主的一行：回执或出站消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HostLine {
    Ack(Ack),
    Message(OutboundMessage),
}

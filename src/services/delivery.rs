//! 投递守卫 - 业务能力层
//!
//! 每个会话最多向宿主投递一次答案。投递失败只记日志，不重试、不重开会话：
//! 对话页面上助手已经回答了，重发题目也无法挽回。

use std::sync::Arc;

use tracing::{error, info};

use crate::channel::{OutboundMessage, ResponseSink};
use crate::models::ObservationSession;
use crate::utils::logging::truncate_text;

/// 投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 本次调用完成了投递（发送本身可能失败，已记录）
    Delivered,
    /// 会话已经投递过，本次跳过
    AlreadyResponded,
}

/// 投递守卫
pub struct DeliveryGuard {
    sink: Arc<dyn ResponseSink>,
}

impl DeliveryGuard {
    pub fn new(sink: Arc<dyn ResponseSink>) -> Self {
        Self { sink }
    }

    /// 投递原始候选文本
    ///
    /// 在第一个 await 之前就置位 `responded`，并发的第二次调用必然看到 true。
    pub async fn deliver(&self, session: &ObservationSession, raw: &str) -> DeliveryOutcome {
        if !session.mark_responded() {
            return DeliveryOutcome::AlreadyResponded;
        }

        info!("{} 📨 投递答案: {}", session, truncate_text(raw, 120));

        let message = OutboundMessage::DeepseekResponse {
            response: raw.to_string(),
        };
        if let Err(e) = self.sink.send(message).await {
            error!("{} ❌ 答案发送失败（不重试）: {}", session, e);
        }

        DeliveryOutcome::Delivered
    }
}

//! 题目处理流程 - 流程层
//!
//! 处理一条宿主消息：
//! 1. 重置上一题的观察
//! 2. 记录基线 → 写入题目 → 点击发送
//! 3. 开始观察，回执 `processing`
//!
//! 提交阶段的错误通过回执返回给宿主；观察阶段的错误从不外抛。

use std::sync::Arc;

use tracing::{info, warn};

use crate::channel::{Ack, InboundMessage, ResponseSink};
use crate::config::{ObservationTiming, SelectorConfig, SubmitTiming};
use crate::error::SubmitError;
use crate::infrastructure::ChatSurface;
use crate::models::{ObservationSession, QuestionRequest};
use crate::services::SubmissionDriver;
use crate::utils::logging::truncate_text;
use crate::workflow::observation::ObservationController;

/// 题目处理流程
///
/// - 持有观察控制器与提交驱动
/// - 不持有浏览器资源，只依赖 `ChatSurface`
pub struct QuestionFlow {
    controller: ObservationController,
    driver: SubmissionDriver,
}

impl QuestionFlow {
    pub fn new(
        surface: Arc<dyn ChatSurface>,
        sink: Arc<dyn ResponseSink>,
        selectors: SelectorConfig,
        observation: ObservationTiming,
        submit: SubmitTiming,
    ) -> Self {
        let selectors = Arc::new(selectors);
        Self {
            controller: ObservationController::new(
                surface.clone(),
                sink,
                selectors.clone(),
                observation,
            ),
            driver: SubmissionDriver::new(surface, selectors, submit),
        }
    }

    pub fn controller(&self) -> &ObservationController {
        &self.controller
    }

    /// 处理一条入站消息并给出回执
    pub async fn handle(&self, message: InboundMessage) -> Ack {
        match message {
            InboundMessage::ReceiveQuestion { question } => self.receive_question(&question).await,
            InboundMessage::Reset => {
                self.controller.reset().await;
                info!("🔄 已重置观察状态");
                Ack::reset()
            }
        }
    }

    async fn receive_question(&self, question: &QuestionRequest) -> Ack {
        info!(
            "📥 收到题目 [{}]: {}",
            question.kind,
            truncate_text(&question.prompt, 80)
        );

        match self.submit_and_observe(question).await {
            Ok(session) => {
                info!("{} ✓ 已提交，等待回复", session);
                Ack::processing()
            }
            Err(e) => {
                warn!("⚠️ 提交失败: {}", e);
                Ack::failed(e.to_string())
            }
        }
    }

    async fn submit_and_observe(
        &self,
        question: &QuestionRequest,
    ) -> Result<Arc<ObservationSession>, SubmitError> {
        // 新题目无条件取消上一题
        self.controller.reset().await;

        let session = self.controller.prepare().await?;
        self.driver.submit(question).await?;
        Ok(self.controller.start(session).await)
    }
}

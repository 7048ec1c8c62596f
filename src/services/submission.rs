//! 提交驱动 - 业务能力层
//!
//! 把渲染好的提示词写进输入框并点击发送。只碰页面，不发任何网络请求。

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::{SelectorConfig, SubmitTiming};
use crate::error::SubmitError;
use crate::infrastructure::ChatSurface;
use crate::models::QuestionRequest;
use crate::services::prompt::render_prompt;
use crate::utils::logging::truncate_text;

/// 提交驱动
pub struct SubmissionDriver {
    surface: Arc<dyn ChatSurface>,
    selectors: Arc<SelectorConfig>,
    timing: SubmitTiming,
}

impl SubmissionDriver {
    pub fn new(
        surface: Arc<dyn ChatSurface>,
        selectors: Arc<SelectorConfig>,
        timing: SubmitTiming,
    ) -> Self {
        Self {
            surface,
            selectors,
            timing,
        }
    }

    /// 提交一道题
    ///
    /// 成功返回时发送按钮已被点击，调用方随后开始观察。
    pub async fn submit(&self, request: &QuestionRequest) -> Result<(), SubmitError> {
        let text = render_prompt(request);
        debug!("提示词预览: {}", truncate_text(&text, 80));

        let input = &self.selectors.input;
        let kind = self
            .surface
            .locate_input(input)
            .await?
            .ok_or(SubmitError::InputNotFound)?;
        debug!("找到输入框 {} ({:?})", input, kind);

        sleep(self.timing.input_focus_delay).await;
        if !self.surface.write_input(input, &text).await? {
            return Err(SubmitError::InputNotFound);
        }

        // 等待页面启用发送按钮
        sleep(self.timing.send_settle_delay).await;
        let clicked = self
            .surface
            .click_send(&self.selectors.send_buttons, &self.selectors.send_fallback)
            .await?;
        if !clicked {
            return Err(SubmitError::SendControlNotFound);
        }

        info!("📤 题目已发送 ({} 字符)", text.chars().count());
        Ok(())
    }
}

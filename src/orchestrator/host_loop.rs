//! 宿主消息循环 - 编排层
//!
//! 逐行读取入站消息，交给 `QuestionFlow` 处理，把回执写回通道。

use serde_json::Value as JsonValue;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::channel::{Ack, HostLine, InboundMessage};
use crate::error::ChannelError;
use crate::utils::logging::truncate_text;
use crate::workflow::QuestionFlow;

/// 运行消息循环直到输入结束
///
/// 输入结束后等待进行中的会话自然结束（投递或超时），再返回。
pub async fn serve<R>(
    flow: &QuestionFlow,
    reader: R,
    tx: mpsc::UnboundedSender<HostLine>,
) -> Result<(), ChannelError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.map_err(ChannelError::ReadFailed)? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("← 宿主: {}", truncate_text(line, 200));

        let value: JsonValue = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("⚠️ 忽略非 JSON 消息: {} ({})", truncate_text(line, 80), e);
                continue;
            }
        };
        let is_question = value.get("type").and_then(JsonValue::as_str) == Some("receiveQuestion");

        let ack = match serde_json::from_value::<InboundMessage>(value) {
            Ok(message) => flow.handle(message).await,
            // 题目格式不对也要回执，宿主在等结果
            Err(e) if is_question => {
                warn!("❌ 题目格式无效: {}", e);
                Ack::failed(e.to_string())
            }
            Err(e) => {
                warn!("⚠️ 忽略无法识别的消息: {} ({})", truncate_text(line, 80), e);
                continue;
            }
        };
        tx.send(HostLine::Ack(ack)).map_err(|_| ChannelError::Closed)?;
    }

    info!("输入已结束，等待当前会话收尾");
    if let Some(outcome) = flow.controller().wait().await {
        info!("最后一个会话结束: {:?}", outcome);
    }
    Ok(())
}

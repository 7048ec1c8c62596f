use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::channel::messages::{HostLine, OutboundMessage};
use crate::error::ChannelError;

/// 出站消息的接收端
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), ChannelError>;
}

/// 把出站消息转交给写出任务
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<HostLine>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<HostLine>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    async fn send(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        self.tx
            .send(HostLine::Message(message))
            .map_err(|_| ChannelError::Closed)
    }
}

/// 写出任务：每行一个 JSON 对象
///
/// 接收端全部关闭后返回。
pub async fn write_lines<W>(
    mut rx: mpsc::UnboundedReceiver<HostLine>,
    mut writer: W,
) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        let mut encoded = serde_json::to_string(&line)?;
        debug!("→ 宿主: {}", encoded);
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

//! 宿主消息通道
//!
//! 换行分隔的 JSON：标准输入读入站消息，标准输出写回执和答案。

pub mod messages;
pub mod sink;

pub use messages::{Ack, HostLine, InboundMessage, OutboundMessage};
pub use sink::{write_lines, ChannelSink, ResponseSink};

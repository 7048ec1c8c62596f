//! # DeepSeek Question Submit
//!
//! 把宿主发来的题目写进 DeepSeek 对话页面，观察助手的流式回复，
//! 从中提取 `{answer, explanation}` 并且每道题只回传一次。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，实现 `ChatSurface`
//!
//! ### ② 业务能力层（Services）
//! - `prompt` - 提示词渲染
//! - `extractor` - 答案提取（围栏 → 花括号 → 全文）
//! - `delivery` - 投递守卫（每会话至多一次）
//! - `rescan` - 单轮复查
//! - `submission` - 写入输入框并点击发送
//!
//! ### ③ 流程层（Workflow）
//! - `ObservationController` - 会话状态机（开始 / 超时 / 重置）
//! - `QuestionFlow` - 一条 `receiveQuestion` 消息的完整处理
//!
//! ### ④ 编排层（Orchestration）
//! - `App` - 初始化浏览器与通道，运行宿主消息循环

pub mod browser;
pub mod channel;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use channel::{Ack, InboundMessage, OutboundMessage, ResponseSink};
pub use config::{Config, SelectorConfig};
pub use error::{AppError, AppResult, SubmitError};
pub use infrastructure::{ChatSurface, JsExecutor};
pub use models::{ExtractedPayload, ObservationSession, QuestionRequest};
pub use orchestrator::App;
pub use services::extract;
pub use workflow::{ObservationController, ObservationOutcome, QuestionFlow};

//! 编排层（Orchestration Layer）
//!
//! ```text
//! app (持有 Browser、JsExecutor)
//!     ↓
//! host_loop (逐条处理宿主消息)
//!     ↓
//! workflow::QuestionFlow (处理单道题) / ObservationController (会话状态机)
//!     ↓
//! services (能力层：prompt / submission / rescan / extractor / delivery)
//!     ↓
//! infrastructure (基础设施：JsExecutor 实现 ChatSurface)
//! ```

pub mod app;
pub mod host_loop;

pub use app::App;
pub use host_loop::serve;

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use tokio::time::{Duration, Instant};

/// 观察会话：一道题从提交到拿到答案（或超时、被重置）的整个周期
///
/// `responded` 只会从 false 变为 true，且只变一次。
#[derive(Debug)]
pub struct ObservationSession {
    /// 会话编号（仅用于日志）
    id: u64,
    /// 接收题目时页面上已有的回复区域数量
    baseline_message_count: usize,
    started_at: Instant,
    started_wall: DateTime<Local>,
    responded: AtomicBool,
    active: AtomicBool,
}

impl ObservationSession {
    pub fn new(id: u64, baseline_message_count: usize) -> Self {
        Self {
            id,
            baseline_message_count,
            started_at: Instant::now(),
            started_wall: Local::now(),
            responded: AtomicBool::new(false),
            active: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn baseline(&self) -> usize {
        self.baseline_message_count
    }

    pub fn started_wall(&self) -> DateTime<Local> {
        self.started_wall
    }

    /// 自开始观察以来的时长
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// 开始观察：重置计时起点并标记为活跃
    pub fn activate(&mut self) {
        self.started_at = Instant::now();
        self.started_wall = Local::now();
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    /// 抢占投递权：只有第一次调用返回 true
    pub fn mark_responded(&self) -> bool {
        self.responded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Display for ObservationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 #{} 基线#{}]", self.id, self.baseline_message_count)
    }
}

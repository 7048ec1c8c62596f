//! 观察控制器 - 流程层
//!
//! 状态：`Idle → Observing → (Delivered | TimedOut | Reset) → Idle`
//!
//! 每个会话是一个 tokio 任务，在同一个 `select!` 循环里等待四种事件：
//! 取消、硬超时、页面变化通知、定时复查。后两者都走同一个复查入口，
//! 由 `responded` 标志保证只投递一次。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use futures::{future, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channel::ResponseSink;
use crate::config::{ObservationTiming, SelectorConfig};
use crate::infrastructure::{ChangeStream, ChatSurface};
use crate::models::ObservationSession;
use crate::services::{DeliveryGuard, RescanOutcome, Rescanner};

/// 会话结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationOutcome {
    Delivered,
    TimedOut,
    Reset,
}

/// 控制器当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Idle,
    Observing,
}

struct ActiveObservation {
    session: Arc<ObservationSession>,
    cancel: CancellationToken,
    handle: JoinHandle<ObservationOutcome>,
}

/// 观察控制器
///
/// 同一时刻最多一个活跃会话。
pub struct ObservationController {
    surface: Arc<dyn ChatSurface>,
    sink: Arc<dyn ResponseSink>,
    selectors: Arc<SelectorConfig>,
    timing: ObservationTiming,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveObservation>>,
}

impl ObservationController {
    pub fn new(
        surface: Arc<dyn ChatSurface>,
        sink: Arc<dyn ResponseSink>,
        selectors: Arc<SelectorConfig>,
        timing: ObservationTiming,
    ) -> Self {
        Self {
            surface,
            sink,
            selectors,
            timing,
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ActiveObservation>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 接收题目时调用：记录当前回复区域数量作为基线
    pub async fn prepare(&self) -> Result<ObservationSession> {
        let baseline = self.surface.count_regions(&self.selectors.regions).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("[会话 #{}] 基线回复数: {}", id, baseline);
        Ok(ObservationSession::new(id, baseline))
    }

    /// 开始观察，已有会话会先被重置
    pub async fn start(&self, mut session: ObservationSession) -> Arc<ObservationSession> {
        self.reset().await;

        session.activate();
        let session = Arc::new(session);
        let cancel = CancellationToken::new();

        info!(
            "{} 👀 开始观察回复 ({})",
            session,
            session.started_wall().format("%H:%M:%S")
        );

        let rescanner = Rescanner::new(
            self.surface.clone(),
            self.selectors.clone(),
            DeliveryGuard::new(self.sink.clone()),
            self.timing.late_rescue_after,
        );
        let handle = tokio::spawn(observe(
            self.surface.clone(),
            rescanner,
            self.timing,
            session.clone(),
            cancel.clone(),
        ));

        *self.slot() = Some(ActiveObservation {
            session: session.clone(),
            cancel,
            handle,
        });
        session
    }

    /// 取消当前会话并等待其收尾；空闲时为空操作
    pub async fn reset(&self) -> Option<ObservationOutcome> {
        let active = self.slot().take()?;
        active.cancel.cancel();
        join(active).await
    }

    /// 等待当前会话自然结束（投递或超时），不取消
    pub async fn wait(&self) -> Option<ObservationOutcome> {
        let active = self.slot().take()?;
        join(active).await
    }

    pub fn state(&self) -> ObserverState {
        match self.slot().as_ref() {
            Some(active) if active.session.is_active() => ObserverState::Observing,
            _ => ObserverState::Idle,
        }
    }

    pub fn current_session(&self) -> Option<Arc<ObservationSession>> {
        self.slot().as_ref().map(|active| active.session.clone())
    }
}

async fn join(active: ActiveObservation) -> Option<ObservationOutcome> {
    let session = active.session;
    match active.handle.await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("{} 观察任务异常结束: {}", session, e);
            session.deactivate();
            None
        }
    }
}

/// 会话主循环
async fn observe(
    surface: Arc<dyn ChatSurface>,
    rescanner: Rescanner,
    timing: ObservationTiming,
    session: Arc<ObservationSession>,
    cancel: CancellationToken,
) -> ObservationOutcome {
    let mut changes = match surface.watch_changes().await {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("{} ⚠️ 页面变化监听不可用，仅依赖定时复查: {:#}", session, e);
            None
        }
    };

    let mut ticker = interval_at(Instant::now() + timing.check_interval, timing.check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = sleep(timing.session_timeout);
    tokio::pin!(deadline);

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break ObservationOutcome::Reset,
            _ = &mut deadline => break ObservationOutcome::TimedOut,
            _ = next_change(&mut changes) => {}
            _ = ticker.tick() => {}
        }

        // 页面脚本可能卡住，复查本身也要能被取消
        let scanned = tokio::select! {
            biased;
            _ = cancel.cancelled() => break ObservationOutcome::Reset,
            scanned = rescanner.rescan(&session) => scanned,
        };

        match scanned {
            RescanOutcome::NotReady => {}
            RescanOutcome::Delivered | RescanOutcome::AlreadyResponded => {
                break ObservationOutcome::Delivered
            }
        }
    };

    if let Err(e) = surface.unwatch_changes().await {
        warn!("{} 移除页面变化监听失败: {:#}", session, e);
    }
    session.deactivate();

    match outcome {
        ObservationOutcome::Delivered => info!("{} ✅ 已投递，停止观察", session),
        ObservationOutcome::TimedOut => warn!(
            "{} ⏱️ {} 秒内未检测到答案，放弃本题",
            session,
            timing.session_timeout.as_secs()
        ),
        ObservationOutcome::Reset => debug!("{} 会话被重置", session),
    }
    outcome
}

/// 等待下一次页面变化；流结束或不可用时永远挂起，交给定时器兜底
async fn next_change(changes: &mut Option<ChangeStream>) {
    if let Some(stream) = changes {
        if stream.next().await.is_some() {
            return;
        }
        *changes = None;
    }
    future::pending::<()>().await
}

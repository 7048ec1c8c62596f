#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;

use deepseek_question_submit::channel::{OutboundMessage, ResponseSink};
use deepseek_question_submit::error::ChannelError;
use deepseek_question_submit::infrastructure::{ChangeStream, ChatSurface, InputKind};
use deepseek_question_submit::models::RegionSnapshot;

pub const PAYLOAD: &str = r#"{"answer":"4","explanation":"Basic arithmetic."}"#;

/// 内存中的对话页面
pub struct MockSurface {
    regions: Mutex<Vec<RegionSnapshot>>,
    input: Mutex<Option<InputKind>>,
    send_available: AtomicBool,
    reply_on_send: Mutex<Option<RegionSnapshot>>,
    fail_snapshots: AtomicBool,
    hang_snapshots: AtomicBool,
    fail_watch: AtomicBool,
    written: Mutex<Vec<String>>,
    changes: Mutex<Option<mpsc::UnboundedSender<()>>>,
    pub clicks: AtomicUsize,
    pub watch_calls: AtomicUsize,
    pub unwatch_calls: AtomicUsize,
}

impl MockSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            regions: Mutex::new(Vec::new()),
            input: Mutex::new(Some(InputKind::ContentEditable)),
            send_available: AtomicBool::new(true),
            reply_on_send: Mutex::new(None),
            fail_snapshots: AtomicBool::new(false),
            hang_snapshots: AtomicBool::new(false),
            fail_watch: AtomicBool::new(false),
            written: Mutex::new(Vec::new()),
            changes: Mutex::new(None),
            clicks: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
            unwatch_calls: AtomicUsize::new(0),
        })
    }

    /// 追加一条回复区域并发出变化通知
    pub fn push_region(&self, region: RegionSnapshot) {
        self.regions.lock().unwrap().push(region);
        self.notify();
    }

    /// 修改最后一条回复（模拟流式输出）
    pub fn update_last_region(&self, region: RegionSnapshot) {
        if let Some(last) = self.regions.lock().unwrap().last_mut() {
            *last = region;
        }
        self.notify();
    }

    pub fn notify(&self) {
        if let Some(tx) = self.changes.lock().unwrap().as_ref() {
            let _ = tx.send(());
        }
    }

    pub fn remove_input(&self) {
        *self.input.lock().unwrap() = None;
    }

    pub fn disable_send(&self) {
        self.send_available.store(false, Ordering::SeqCst);
    }

    /// 点击发送后自动出现的回复
    pub fn reply_on_send(&self, region: RegionSnapshot) {
        *self.reply_on_send.lock().unwrap() = Some(region);
    }

    pub fn fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    /// 读取区域永不返回（模拟卡死的页面脚本）
    pub fn hang_snapshots(&self, hang: bool) {
        self.hang_snapshots.store(hang, Ordering::SeqCst);
    }

    /// 无法安装页面变化监听
    pub fn fail_watch(&self) {
        self.fail_watch.store(true, Ordering::SeqCst);
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    pub fn is_watching(&self) -> bool {
        self.changes.lock().unwrap().is_some()
    }
}

#[async_trait]
impl ChatSurface for MockSurface {
    async fn count_regions(&self, _region_selectors: &[String]) -> Result<usize> {
        Ok(self.regions.lock().unwrap().len())
    }

    async fn snapshot_regions(
        &self,
        _region_selectors: &[String],
        _code_block_selectors: &[String],
    ) -> Result<Vec<RegionSnapshot>> {
        if self.hang_snapshots.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if self.fail_snapshots.load(Ordering::SeqCst) {
            return Err(anyhow!("Execution context was destroyed"));
        }
        Ok(self.regions.lock().unwrap().clone())
    }

    async fn locate_input(&self, _selector: &str) -> Result<Option<InputKind>> {
        Ok(*self.input.lock().unwrap())
    }

    async fn write_input(&self, _selector: &str, text: &str) -> Result<bool> {
        if self.input.lock().unwrap().is_none() {
            return Ok(false);
        }
        self.written.lock().unwrap().push(text.to_string());
        Ok(true)
    }

    async fn click_send(&self, _selectors: &[String], _fallback: &str) -> Result<bool> {
        if !self.send_available.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.clicks.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply_on_send.lock().unwrap().take();
        if let Some(region) = reply {
            self.push_region(region);
        }
        Ok(true)
    }

    async fn watch_changes(&self) -> Result<ChangeStream> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_watch.load(Ordering::SeqCst) {
            return Err(anyhow!("Runtime.addBinding failed"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.changes.lock().unwrap() = Some(tx);
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|change| (change, rx))
        });
        Ok(stream.boxed())
    }

    async fn unwatch_changes(&self) -> Result<()> {
        self.unwatch_calls.fetch_add(1, Ordering::SeqCst);
        *self.changes.lock().unwrap() = None;
        Ok(())
    }
}

/// 记录所有出站消息
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundMessage>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        Arc::new(sink)
    }

    pub fn responses(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| match m {
                OutboundMessage::DeepseekResponse { response } => response.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn send(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        tokio::task::yield_now().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

//! 回复复查 - 业务能力层
//!
//! 每次触发（页面变化或定时器）都走一遍：读区域 → 跳过基线 → 逐区域找答案 → 投递。
//! 任何页面异常或文本异常都只降级为"本轮没找到"。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::SelectorConfig;
use crate::infrastructure::ChatSurface;
use crate::models::{ObservationSession, RegionSnapshot};
use crate::services::delivery::{DeliveryGuard, DeliveryOutcome};
use crate::services::extractor::{self, RELAXED_ANSWER, STRICT_ANSWER};

/// 候选文本的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// 区域内代码块
    CodeBlock,
    /// 区域全文的宽松匹配
    RegionText,
    /// 超过宽限期后的严格匹配，不经过解析校验
    LateRescue,
}

/// 找到的答案候选
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 区域在基线之后的序号（从 0 开始）
    pub region_index: usize,
    pub source: CandidateSource,
    /// 原样投递的文本
    pub raw: String,
}

/// 单轮复查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescanOutcome {
    /// 没有新内容或还没写完
    NotReady,
    /// 本轮完成投递
    Delivered,
    /// 会话早已投递过
    AlreadyResponded,
}

/// 在基线之后的区域里按顺序找第一个可投递的候选
///
/// `late_rescue` 为 true 时，每个区域在常规路径失败后再试一次严格匹配。
pub fn find_candidate(regions: &[RegionSnapshot], late_rescue: bool) -> Option<Candidate> {
    for (region_index, region) in regions.iter().enumerate() {
        for block in &region.code_blocks {
            if !(block.contains('{') && block.contains("\"answer\"")) {
                continue;
            }
            if let Some(payload) = extractor::extract(block) {
                return Some(Candidate {
                    region_index,
                    source: CandidateSource::CodeBlock,
                    raw: payload.raw,
                });
            }
        }

        if let Some(payload) = RELAXED_ANSWER
            .find(&region.text)
            .and_then(|m| extractor::extract(m.as_str()))
        {
            return Some(Candidate {
                region_index,
                source: CandidateSource::RegionText,
                raw: payload.raw,
            });
        }

        if late_rescue {
            if let Some(m) = STRICT_ANSWER.find(&region.text) {
                return Some(Candidate {
                    region_index,
                    source: CandidateSource::LateRescue,
                    raw: m.as_str().to_string(),
                });
            }
        }
    }
    None
}

/// 复查器
pub struct Rescanner {
    surface: Arc<dyn ChatSurface>,
    selectors: Arc<SelectorConfig>,
    guard: DeliveryGuard,
    late_rescue_after: Duration,
}

impl Rescanner {
    pub fn new(
        surface: Arc<dyn ChatSurface>,
        selectors: Arc<SelectorConfig>,
        guard: DeliveryGuard,
        late_rescue_after: Duration,
    ) -> Self {
        Self {
            surface,
            selectors,
            guard,
            late_rescue_after,
        }
    }

    /// 执行一轮复查
    pub async fn rescan(&self, session: &ObservationSession) -> RescanOutcome {
        if session.has_responded() {
            return RescanOutcome::AlreadyResponded;
        }

        let regions = match self
            .surface
            .snapshot_regions(&self.selectors.regions, &self.selectors.code_blocks)
            .await
        {
            Ok(regions) => regions,
            Err(e) => {
                debug!("{} 读取回复区域失败，等待下一轮: {:#}", session, e);
                return RescanOutcome::NotReady;
            }
        };

        if regions.len() <= session.baseline() {
            return RescanOutcome::NotReady;
        }
        let fresh = &regions[session.baseline()..];

        let late_rescue = session.elapsed() > self.late_rescue_after;
        let Some(candidate) = find_candidate(fresh, late_rescue) else {
            debug!("{} {} 个新区域中暂无可用答案", session, fresh.len());
            return RescanOutcome::NotReady;
        };

        info!(
            "{} ✓ 在第 {} 个新区域找到答案 ({:?})",
            session,
            candidate.region_index + 1,
            candidate.source
        );

        match self.guard.deliver(session, &candidate.raw).await {
            DeliveryOutcome::Delivered => RescanOutcome::Delivered,
            DeliveryOutcome::AlreadyResponded => RescanOutcome::AlreadyResponded,
        }
    }
}

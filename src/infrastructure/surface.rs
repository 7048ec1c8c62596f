//! 页面能力接口
//!
//! 状态机只通过这个 trait 接触页面，测试时可以换成内存实现。

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::models::RegionSnapshot;

/// 页面变化通知流，每个元素代表"页面结构或文本变了"
pub type ChangeStream = BoxStream<'static, ()>;

/// 输入框类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    /// contenteditable，写 innerText
    ContentEditable,
    /// textarea / input，写 value
    ValueField,
}

/// 对话页面
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// 按优先级取第一个有匹配的选择器，返回其匹配数量
    async fn count_regions(&self, region_selectors: &[String]) -> Result<usize>;

    /// 读取全部回复区域（含基线之前的），按出现顺序
    async fn snapshot_regions(
        &self,
        region_selectors: &[String],
        code_block_selectors: &[String],
    ) -> Result<Vec<RegionSnapshot>>;

    /// 定位输入框，不存在返回 `None`
    async fn locate_input(&self, selector: &str) -> Result<Option<InputKind>>;

    /// 聚焦并写入文本，然后派发 input 事件；输入框消失时返回 `false`
    async fn write_input(&self, selector: &str, text: &str) -> Result<bool>;

    /// 点击第一个可用的发送按钮；都找不到返回 `false`
    async fn click_send(&self, selectors: &[String], fallback: &str) -> Result<bool>;

    /// 订阅页面变化
    async fn watch_changes(&self) -> Result<ChangeStream>;

    /// 取消订阅，未订阅时为空操作
    async fn unwatch_changes(&self) -> Result<()>;
}

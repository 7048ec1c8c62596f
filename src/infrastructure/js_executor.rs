//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力，并据此实现 `ChatSurface`

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::Page;
use futures::{future, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::surface::{ChangeStream, ChatSurface, InputKind};
use crate::models::RegionSnapshot;

/// 页面变化回调绑定名
const CHANGE_BINDING: &str = "__dsqChange";

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识题目 / 会话
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .map_err(BrowserError::ScriptExecutionFailed)?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}

#[derive(Deserialize)]
struct LocateResult {
    kind: Option<InputKind>,
}

#[async_trait]
impl ChatSurface for JsExecutor {
    async fn count_regions(&self, region_selectors: &[String]) -> Result<usize> {
        let js_code = format!(
            r#"
            (() => {{
                const selectors = {};
                for (const selector of selectors) {{
                    try {{
                        const count = document.querySelectorAll(selector).length;
                        if (count > 0) return count;
                    }} catch (e) {{
                        continue;
                    }}
                }}
                return 0;
            }})()
            "#,
            serde_json::to_string(region_selectors)?
        );
        self.eval_as(js_code).await.context("统计回复区域失败")
    }

    async fn snapshot_regions(
        &self,
        region_selectors: &[String],
        code_block_selectors: &[String],
    ) -> Result<Vec<RegionSnapshot>> {
        let js_code = format!(
            r#"
            (() => {{
                const regionSelectors = {};
                const codeSelectors = {};
                let messages = [];
                for (const selector of regionSelectors) {{
                    try {{
                        const found = document.querySelectorAll(selector);
                        if (found.length > 0) {{
                            messages = Array.from(found);
                            break;
                        }}
                    }} catch (e) {{
                        continue;
                    }}
                }}
                return messages.map((message) => {{
                    const codeBlocks = [];
                    for (const selector of codeSelectors) {{
                        try {{
                            message.querySelectorAll(selector).forEach((block) => {{
                                codeBlocks.push((block.textContent || "").trim());
                            }});
                        }} catch (e) {{
                            continue;
                        }}
                    }}
                    return {{ text: (message.textContent || "").trim(), codeBlocks }};
                }});
            }})()
            "#,
            serde_json::to_string(region_selectors)?,
            serde_json::to_string(code_block_selectors)?,
        );
        self.eval_as(js_code).await.context("读取回复区域失败")
    }

    async fn locate_input(&self, selector: &str) -> Result<Option<InputKind>> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return {{ kind: null }};
                const editable = el.isContentEditable || el.getAttribute("contenteditable") === "true";
                return {{ kind: editable ? "contentEditable" : "valueField" }};
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        let located: LocateResult = self.eval_as(js_code).await.context("定位输入框失败")?;
        Ok(located.kind)
    }

    async fn write_input(&self, selector: &str, text: &str) -> Result<bool> {
        debug!("写入输入框 - 文本长度: {} 字符", text.chars().count());
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.focus();
                const text = {};
                const editable = el.isContentEditable || el.getAttribute("contenteditable") === "true";
                if (editable) {{
                    el.innerText = text;
                }} else {{
                    el.value = text;
                }}
                el.dispatchEvent(new InputEvent("input", {{ bubbles: true, composed: true }}));
                return true;
            }})()
            "#,
            serde_json::to_string(selector)?,
            serde_json::to_string(text)?,
        );
        self.eval_as(js_code).await.context("写入输入框失败")
    }

    async fn click_send(&self, selectors: &[String], fallback: &str) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const selectors = {};
                let button = null;
                for (const selector of selectors) {{
                    try {{
                        const candidate = document.querySelector(selector);
                        if (candidate && !candidate.disabled) {{
                            button = candidate;
                            break;
                        }}
                    }} catch (e) {{
                        continue;
                    }}
                }}
                if (!button) {{
                    const buttons = Array.from(document.querySelectorAll({})).filter(
                        (b) => !b.disabled && b.querySelector("svg")
                    );
                    if (buttons.length) button = buttons[0];
                }}
                if (!button) return false;
                button.click();
                return true;
            }})()
            "#,
            serde_json::to_string(selectors)?,
            serde_json::to_string(fallback)?,
        );
        self.eval_as(js_code).await.context("点击发送按钮失败")
    }

    async fn watch_changes(&self) -> Result<ChangeStream> {
        self.page
            .execute(AddBindingParams::new(CHANGE_BINDING))
            .await
            .map_err(BrowserError::ScriptExecutionFailed)?;
        let events = self
            .page
            .event_listener::<EventBindingCalled>()
            .await
            .map_err(BrowserError::ScriptExecutionFailed)?;

        // 合并同一轮事件循环内的多次变更，只通知一次
        let js_code = format!(
            r#"
            (() => {{
                if (window.__dsqObserver) window.__dsqObserver.disconnect();
                let pending = false;
                const notify = () => {{
                    if (pending) return;
                    pending = true;
                    setTimeout(() => {{
                        pending = false;
                        try {{ window[{binding}]("change"); }} catch (e) {{}}
                    }}, 0);
                }};
                window.__dsqObserver = new MutationObserver(notify);
                window.__dsqObserver.observe(document.body, {{
                    childList: true,
                    subtree: true,
                    characterData: true,
                }});
                return true;
            }})()
            "#,
            binding = serde_json::to_string(CHANGE_BINDING)?
        );
        self.eval(js_code).await.context("安装页面变化监听失败")?;

        let stream = events
            .filter(|event| future::ready(event.name == CHANGE_BINDING))
            .map(|_| ())
            .boxed();
        Ok(stream)
    }

    async fn unwatch_changes(&self) -> Result<()> {
        self.eval(
            r#"
            (() => {
                if (window.__dsqObserver) {
                    window.__dsqObserver.disconnect();
                    window.__dsqObserver = null;
                }
                return true;
            })()
            "#,
        )
        .await
        .context("移除页面变化监听失败")?;
        Ok(())
    }
}

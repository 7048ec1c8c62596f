use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 对话页面 URL
    pub target_url: String,
    /// 用于匹配已打开标签页的标题片段
    pub target_title: String,
    /// 是否启动无头浏览器（否则连接已有浏览器）
    pub headless: bool,
    /// 无头模式下的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// 选择器覆盖文件（TOML）
    pub selector_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 观察时序 ---
    pub check_interval_ms: u64,
    pub session_timeout_secs: u64,
    pub late_rescue_after_secs: u64,
    // --- 提交时序 ---
    pub input_focus_delay_ms: u64,
    pub send_settle_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://chat.deepseek.com/".to_string(),
            target_title: "DeepSeek".to_string(),
            headless: false,
            chrome_executable: None,
            selector_file: None,
            verbose_logging: false,
            check_interval_ms: 1000,
            session_timeout_secs: 180,
            late_rescue_after_secs: 30,
            input_focus_delay_ms: 50,
            send_settle_delay_ms: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").unwrap_or(default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            target_title: std::env::var("TARGET_TITLE").unwrap_or(default.target_title),
            headless: env_parse("HEADLESS").unwrap_or(default.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            selector_file: std::env::var("SELECTOR_FILE").ok().or(default.selector_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            check_interval_ms: env_parse("CHECK_INTERVAL_MS").unwrap_or(default.check_interval_ms),
            session_timeout_secs: env_parse("SESSION_TIMEOUT_SECS").unwrap_or(default.session_timeout_secs),
            late_rescue_after_secs: env_parse("LATE_RESCUE_AFTER_SECS").unwrap_or(default.late_rescue_after_secs),
            input_focus_delay_ms: env_parse("INPUT_FOCUS_DELAY_MS").unwrap_or(default.input_focus_delay_ms),
            send_settle_delay_ms: env_parse("SEND_SETTLE_DELAY_MS").unwrap_or(default.send_settle_delay_ms),
        }
    }

    /// 观察阶段的时序参数
    pub fn observation_timing(&self) -> ObservationTiming {
        ObservationTiming {
            check_interval: Duration::from_millis(self.check_interval_ms),
            session_timeout: Duration::from_secs(self.session_timeout_secs),
            late_rescue_after: Duration::from_secs(self.late_rescue_after_secs),
        }
    }

    /// 提交阶段的时序参数
    pub fn submit_timing(&self) -> SubmitTiming {
        SubmitTiming {
            input_focus_delay: Duration::from_millis(self.input_focus_delay_ms),
            send_settle_delay: Duration::from_millis(self.send_settle_delay_ms),
        }
    }

    /// 加载选择器：有覆盖文件时读文件，否则使用内置默认值
    pub fn selectors(&self) -> Result<SelectorConfig> {
        match self.selector_file.as_deref() {
            Some(path) => SelectorConfig::load(Path::new(path)),
            None => Ok(SelectorConfig::default()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// 观察控制器时序
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObservationTiming {
    /// 周期性复查间隔
    pub check_interval: Duration,
    /// 会话硬超时
    pub session_timeout: Duration,
    /// 超过该时长后启用迟到兜底匹配
    pub late_rescue_after: Duration,
}

impl Default for ObservationTiming {
    fn default() -> Self {
        Config::default().observation_timing()
    }
}

/// 提交驱动时序
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitTiming {
    /// 定位输入框后、写入前的等待
    pub input_focus_delay: Duration,
    /// 写入后等待发送按钮可用
    pub send_settle_delay: Duration,
}

impl Default for SubmitTiming {
    fn default() -> Self {
        Config::default().submit_timing()
    }
}

/// 页面选择器列表
///
/// 所有列表按优先级排列，先匹配者胜出。页面改版时只需改 TOML，不必动状态机。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// 输入框
    pub input: String,
    /// 发送按钮候选
    pub send_buttons: Vec<String>,
    /// 兜底：第一个可用且含图标的按钮
    pub send_fallback: String,
    /// 回复区域（消息）候选
    pub regions: Vec<String>,
    /// 回复内代码块候选
    pub code_blocks: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            input: "#chat-input".to_string(),
            send_buttons: strings(&[
                r#"[role="button"].f6d670"#,
                ".f6d670",
                r#"button[aria-label="Send message"]"#,
                r#"button[type="submit"]"#,
                r#"[data-testid="send-button"]"#,
                ".bf38813a button",
            ]),
            send_fallback: "button".to_string(),
            regions: strings(&[
                "[data-testid='chat-message-assistant']",
                "model-response",
                ".ds-markdown",
                ".f9bf7997",
            ]),
            code_blocks: strings(&[
                ".md-code-block pre",
                "pre code",
                "pre",
                ".code-block pre",
                ".ds-markdown pre",
            ]),
        }
    }
}

impl SelectorConfig {
    /// 从 TOML 文件加载，缺失的键保留默认值
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取选择器文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析选择器文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let selectors: SelectorConfig = toml::from_str(content)?;
        if selectors.regions.is_empty() {
            anyhow::bail!("regions 不能为空");
        }
        Ok(selectors)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

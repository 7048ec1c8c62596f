//! 应用入口 - 编排层
//!
//! 1. **初始化**：加载选择器、连接浏览器、创建 JsExecutor
//! 2. **通道**：标准输入读消息，独立任务把回执与答案写到标准输出
//! 3. **资源管理**：持有 Browser，保证页面在整个运行期间有效

use std::sync::Arc;

use chromiumoxide::Browser;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::browser;
use crate::channel::{write_lines, ChannelSink};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;
use crate::orchestrator::host_loop;
use crate::utils::logging::log_startup;
use crate::workflow::QuestionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: Arc<JsExecutor>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let (browser, page) = if config.headless {
            browser::launch_headless_browser(&config.target_url, config.chrome_executable.as_deref())
                .await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
                Some(&config.target_title),
            )
            .await?
        };

        Ok(Self {
            config,
            _browser: browser,
            executor: Arc::new(JsExecutor::new(page)),
        })
    }

    /// 运行宿主消息循环
    pub async fn run(&self) -> AppResult<()> {
        let selectors = self
            .config
            .selectors()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_lines(rx, tokio::io::stdout()));

        let flow = QuestionFlow::new(
            self.executor.clone(),
            Arc::new(ChannelSink::new(tx.clone())),
            selectors,
            self.config.observation_timing(),
            self.config.submit_timing(),
        );

        info!("✓ 就绪，等待宿主消息");
        let served = host_loop::serve(&flow, BufReader::new(tokio::io::stdin()), tx).await;

        // 出错提前返回时会话可能还在运行；释放所有发送端后写出任务随之结束
        flow.controller().reset().await;
        drop(flow);
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("写出宿主消息失败: {}", e),
            Err(e) => error!("写出任务异常结束: {}", e),
        }

        Ok(served?)
    }
}

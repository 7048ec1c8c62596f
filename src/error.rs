use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 宿主消息通道错误
    #[error("通道错误: {0}")]
    Channel(#[from] ChannelError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    ScriptExecutionFailed(#[from] chromiumoxide::error::CdpError),
}

/// 提交驱动错误
///
/// `Display` 文本即失败回执中的 `error` 字段。
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Input area not found")]
    InputNotFound,
    #[error("Send button not found")]
    SendControlNotFound,
    /// 页面操作本身失败（脚本异常、连接断开）
    #[error("Page interaction failed: {0}")]
    Surface(#[from] anyhow::Error),
}

/// 宿主消息通道错误
#[derive(Debug, Error)]
pub enum ChannelError {
    /// 通道已关闭，接收端不存在
    #[error("消息通道已关闭")]
    Closed,
    /// 读取入站消息失败
    #[error("读取消息失败: {0}")]
    ReadFailed(#[source] std::io::Error),
    /// 写出失败
    #[error("写出消息失败: {0}")]
    WriteFailed(#[from] std::io::Error),
    /// 消息序列化失败
    #[error("消息序列化失败: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

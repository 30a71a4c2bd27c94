// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("提取失败: {0}")]
    Extraction(String),
    #[error("未找到可用的播放器 (请安装 mpv 或 ffplay)")]
    PlayerUnavailable,
    #[error("无法获取同时包含音视频的直链")]
    ProgressiveResolutionFailed,
    #[error("下载失败: {0}")]
    DownloadFailed(String),
    #[error("配色文件读写失败: {0}")]
    ThemePersistence(String),
    #[error("无效的颜色值 '{0}' (应为 #rgb 或 #rrggbb)")]
    InvalidColor(String),
    #[error("已有任务正在进行: {0}")]
    Busy(String),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 去掉分类前缀后的原始消息，用于进度回调中的错误事件。
    pub fn message(&self) -> String {
        match self {
            AppError::Extraction(msg)
            | AppError::DownloadFailed(msg)
            | AppError::ThemePersistence(msg)
            | AppError::UserInputError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

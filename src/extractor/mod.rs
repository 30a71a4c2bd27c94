// src/extractor/mod.rs

pub mod ytdlp;

use crate::{
    error::*,
    models::{DownloadProgressEvent, DownloadReport, DownloadRequest, MediaInfo, SearchResult},
};
use async_trait::async_trait;

/// 进度回调；在执行下载的任务上调用，必须可以跨线程使用。
pub type ProgressCallback<'a> = dyn Fn(DownloadProgressEvent) + Send + Sync + 'a;

/// 元数据提取能力。策略 (数量限制、格式挑选、等待文件落盘) 都在调用方，
/// 实现者只负责和外部工具交互。
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// 搜索至多 `limit` 条结果，不触发下载。
    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<SearchResult>>;

    /// 按格式选择器探测页面；提取器没有返回任何结构时为 `None`。
    async fn probe(&self, page_url: &str, format_selector: &str) -> AppResult<Option<MediaInfo>>;

    /// 执行完整下载并合并为单一文件。
    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: &ProgressCallback<'_>,
    ) -> AppResult<DownloadReport>;
}

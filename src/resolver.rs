// src/resolver.rs

use crate::{
    config::PollPolicy,
    constants::formats,
    error::*,
    extractor::{MediaExtractor, ProgressCallback},
    models::{DownloadPhase, DownloadProgressEvent, DownloadRequest, SearchResult},
    utils,
};
use log::{debug, error, info, warn};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// 搜索、直链解析和下载的编排层。只接收普通参数，不接触会话状态。
#[derive(Clone)]
pub struct Resolver {
    extractor: Arc<dyn MediaExtractor>,
    poll: PollPolicy,
}

impl Resolver {
    pub fn new(extractor: Arc<dyn MediaExtractor>, poll: PollPolicy) -> Self {
        Self { extractor, poll }
    }

    /// 搜索，数量自动限制在 [1, 50]。
    pub async fn search(&self, query: &str, limit: i64) -> AppResult<Vec<SearchResult>> {
        let limit = utils::clamp_limit(limit);
        info!("搜索 '{}' (limit {})", query, limit);
        self.extractor.search(query, limit).await.map_err(|e| match e {
            e @ AppError::Extraction(_) => e,
            other => AppError::Extraction(other.message()),
        })
    }

    /// 为只能播放单一直链的播放器取得同时含音视频的地址。
    ///
    /// 提取器若已直接选出单一可播放地址则直接使用；否则从格式列表末尾
    /// (质量最高) 向前找第一个音视频编码都存在且地址为 http/https 的格式。
    pub async fn resolve_progressive_url(&self, page_url: &str) -> AppResult<Option<String>> {
        let Some(info) = self.extractor.probe(page_url, formats::PROGRESSIVE).await? else {
            warn!("提取器没有返回 '{}' 的任何信息", page_url);
            return Ok(None);
        };
        if let Some(url) = info.url.filter(|u| !u.is_empty()) {
            debug!("提取器直接给出了可播放地址");
            return Ok(Some(url));
        }
        let found = info
            .formats
            .iter()
            .rev()
            .filter(|f| f.has_audio_and_video())
            .filter_map(|f| f.direct_url.as_deref())
            .find(|u| utils::is_fetchable_url(u))
            .map(str::to_string);
        if found.is_none() {
            warn!("'{}' 的 {} 个格式中没有同时含音视频的直链", page_url, info.formats.len());
        }
        Ok(found)
    }

    /// 下载并合并为单一文件，返回最终文件路径。
    ///
    /// 所有失败都通过进度回调和 `None` 返回值体现，不会向外抛出。
    pub async fn download(
        &self,
        page_url: &str,
        destination: &Path,
        on_progress: &ProgressCallback<'_>,
    ) -> Option<PathBuf> {
        let phase = Mutex::new(DownloadPhase::Idle);
        let advance = |next: &dyn Fn(DownloadPhase) -> DownloadPhase| {
            if let Ok(mut guard) = phase.lock() {
                let current = std::mem::replace(&mut *guard, DownloadPhase::Idle);
                *guard = next(current);
                debug!("下载状态: {:?}", *guard);
            }
        };

        if let Err(e) = std::fs::create_dir_all(destination) {
            error!("无法创建下载目录 {}: {}", destination.display(), e);
            on_progress(DownloadProgressEvent::Error {
                message: e.to_string(),
            });
            return None;
        }

        let request = DownloadRequest {
            page_url: page_url.to_string(),
            destination: destination.to_path_buf(),
            output_template: formats::OUTPUT_TEMPLATE.to_string(),
            format_selector: formats::DOWNLOAD.to_string(),
            merge_format: formats::MERGE_CONTAINER.to_string(),
        };
        advance(&|_| DownloadPhase::Requested);
        info!("开始下载 {} -> {}", page_url, destination.display());

        let tracking = |event: DownloadProgressEvent| {
            advance(&|p| p.on_event(&event));
            on_progress(event);
        };
        let report = match self.extractor.download(&request, &tracking).await {
            Ok(report) => report,
            Err(e) => {
                error!("下载 '{}' 失败: {}", page_url, e);
                let message = e.message();
                advance(&|p| p.on_event(&DownloadProgressEvent::Error { message: message.clone() }));
                on_progress(DownloadProgressEvent::Error { message });
                return None;
            }
        };

        match report.filepath {
            Some(path) => {
                advance(&|p| p.begin_poll());
                let found = wait_for_file(&path, self.poll).await.then_some(path);
                advance(&|p| p.resolve(found.clone()));
            }
            None => {
                warn!("提取器没有报告 '{}' 的输出文件", page_url);
                advance(&|p| p.begin_poll().resolve(None));
            }
        }

        match phase.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()) {
            DownloadPhase::PathResolved(path) => {
                info!("下载完成: {}", path.display());
                Some(path)
            }
            other => {
                warn!("'{}' 未能得到输出文件，最终状态 {:?}", page_url, other);
                None
            }
        }
    }
}

/// 轮询文件是否存在，最多 `policy.attempts` 次，每次间隔 `policy.interval`。
pub async fn wait_for_file(path: &Path, policy: PollPolicy) -> bool {
    for attempt in 0..policy.attempts {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!("第 {} 次检查时找到文件 {}", attempt + 1, path.display());
            return true;
        }
        tokio::time::sleep(policy.interval).await;
    }
    tokio::fs::try_exists(path).await.unwrap_or(false)
}


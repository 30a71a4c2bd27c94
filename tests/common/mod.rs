// tests/common/mod.rs

#![allow(dead_code)]

use async_trait::async_trait;
use kittytube::{
    config::{PollPolicy, theme::ThemeStore},
    error::{AppError, AppResult},
    extractor::{MediaExtractor, ProgressCallback},
    models::{DownloadProgressEvent, DownloadReport, DownloadRequest, Format, MediaInfo, SearchResult},
    player::PlayerLauncher,
    resolver::Resolver,
    session::{SessionController, UiEvent},
};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// 下载时的模拟行为
#[derive(Clone, Debug)]
pub enum StubDownload {
    /// 提取器直接报错
    Fail(String),
    /// 报告一个路径，但不创建文件
    Report(Option<PathBuf>),
    /// 报告路径，并在 `delay` 之后才创建文件 (模拟合并/重命名)
    CreateLater { file_name: String, delay: Duration },
}

pub struct StubExtractor {
    pub results: Vec<SearchResult>,
    pub info: Option<MediaInfo>,
    pub download: StubDownload,
    pub search_delay: Option<Duration>,
    pub search_error: Option<String>,
    /// 前几次搜索正常返回，之后才返回 `search_error`
    pub succeed_first: usize,
    pub seen_limits: Mutex<Vec<u32>>,
    pub seen_selectors: Mutex<Vec<String>>,
    pub seen_requests: Mutex<Vec<DownloadRequest>>,
}

impl Default for StubExtractor {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            info: None,
            download: StubDownload::Report(None),
            search_delay: None,
            search_error: None,
            succeed_first: 0,
            seen_limits: Mutex::new(Vec::new()),
            seen_selectors: Mutex::new(Vec::new()),
            seen_requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaExtractor for StubExtractor {
    async fn search(&self, _query: &str, limit: u32) -> AppResult<Vec<SearchResult>> {
        let call = {
            let mut seen = self.seen_limits.lock().unwrap();
            seen.push(limit);
            seen.len()
        };
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.search_error
            && call > self.succeed_first
        {
            return Err(AppError::Extraction(msg.clone()));
        }
        Ok(self.results.iter().take(limit as usize).cloned().collect())
    }

    async fn probe(&self, _page_url: &str, format_selector: &str) -> AppResult<Option<MediaInfo>> {
        self.seen_selectors.lock().unwrap().push(format_selector.to_string());
        Ok(self.info.clone())
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: &ProgressCallback<'_>,
    ) -> AppResult<DownloadReport> {
        self.seen_requests.lock().unwrap().push(request.clone());
        match &self.download {
            StubDownload::Fail(msg) => Err(AppError::DownloadFailed(msg.clone())),
            StubDownload::Report(path) => {
                on_progress(DownloadProgressEvent::Finished);
                Ok(DownloadReport {
                    filepath: path.clone(),
                })
            }
            StubDownload::CreateLater { file_name, delay } => {
                on_progress(DownloadProgressEvent::Downloading {
                    percent: "50.0%".into(),
                    speed: "2.00MiB/s".into(),
                    eta: "00:01".into(),
                });
                on_progress(DownloadProgressEvent::Finished);
                let path = request.destination.join(file_name);
                let (target, delay) = (path.clone(), *delay);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    std::fs::write(target, b"merged").unwrap();
                });
                Ok(DownloadReport {
                    filepath: Some(path),
                })
            }
        }
    }
}

pub fn entry(title: &str, channel: &str, duration: Option<f64>) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        channel: channel.to_string(),
        duration,
        page_url: format!("https://www.youtube.com/watch?v={}", title.replace(' ', "_")),
        formats: Vec::new(),
    }
}

pub fn format(acodec: &str, vcodec: &str, url: &str) -> Format {
    Format {
        audio_codec: Some(acodec.to_string()),
        video_codec: Some(vcodec.to_string()),
        direct_url: Some(url.to_string()),
    }
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        attempts: 30,
    }
}

pub fn resolver(stub: Arc<StubExtractor>) -> Resolver {
    Resolver::new(stub, fast_poll())
}

pub fn controller(
    stub: Arc<StubExtractor>,
    launcher: PlayerLauncher,
    dir: &Path,
    limit: u32,
) -> (SessionController, UnboundedReceiver<UiEvent>) {
    let themes = ThemeStore::new(dir.join("config").join("kittytube_theme.json")).with_legacy_path(None);
    SessionController::new(resolver(stub), launcher, themes, dir.join("downloads"), limit)
}

/// 一个不含任何播放器的查找路径
pub fn no_players(dir: &Path) -> PlayerLauncher {
    let empty = dir.join("empty-bin");
    std::fs::create_dir_all(&empty).unwrap();
    PlayerLauncher::with_search_path(empty.as_os_str())
}

/// 像 UI 循环一样应用事件，直到控制器回到空闲状态。
pub async fn settle(controller: &mut SessionController, events: &mut UnboundedReceiver<UiEvent>) {
    while controller.is_busy() {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("operation did not finish in time")
            .expect("event channel closed");
        controller.apply(event);
    }
}

/// 写入一个可执行的 shell 脚本，用来冒充外部工具。
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let script = dir.join(name);
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

// src/session/controller.rs

use super::{Operation, OperationKind, SessionState, UiEvent, UiSender};
use crate::{
    config::theme::{ThemeColor, ThemeSettings, ThemeSource, ThemeStore},
    error::*,
    models::DownloadProgressEvent,
    player::PlayerLauncher,
    resolver::Resolver,
    utils,
};
use log::{debug, info, warn};
use std::{
    future::Future,
    path::{Path, PathBuf},
};
use tokio::sync::mpsc;

/// 会话控制器：持有会话状态，把耗时操作派发到后台任务，
/// 并在 UI 循环中通过 `apply` 接收结果。
pub struct SessionController {
    state: SessionState,
    resolver: Resolver,
    launcher: PlayerLauncher,
    themes: ThemeStore,
    ui: UiSender,
    current: Option<Operation>,
    next_id: u64,
}

impl SessionController {
    pub fn new(
        resolver: Resolver,
        launcher: PlayerLauncher,
        themes: ThemeStore,
        download_dir: PathBuf,
        limit: u32,
    ) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (theme, source) = themes.load();
        let mut state = SessionState::new(download_dir, limit, theme);
        if let ThemeSource::Fallback(e) = source {
            state.status = format!("Theme load error: {}. Using defaults.", e.message());
        }
        let (ui, rx) = UiSender::channel();
        let controller = Self {
            state,
            resolver,
            launcher,
            themes,
            ui,
            current: None,
            next_id: 1,
        };
        (controller, rx)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn current_kind(&self) -> Option<OperationKind> {
        self.current.as_ref().map(Operation::kind)
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.state.status = message.into();
        debug!("状态: {}", self.state.status);
    }

    fn reject(&mut self, message: &str) -> AppError {
        self.set_status(message);
        AppError::UserInputError(message.to_string())
    }

    /// 在 UI 循环中应用后台任务发回的事件。
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Status(message) => self.set_status(message),
            UiEvent::Failed(message) => {
                self.state.last_failure = Some(message.clone());
                self.set_status(message);
            }
            UiEvent::Progress(progress) => self.apply_progress(progress),
            UiEvent::SearchCompleted { results } => {
                self.state.selected = None;
                let status = if results.is_empty() {
                    "No results.".to_string()
                } else {
                    format!("Found {} result(s).", results.len())
                };
                self.state.results = results;
                self.set_status(status);
            }
            UiEvent::SearchFailed { message } => {
                // 搜索失败等同于零结果加一条错误信息
                self.state.results.clear();
                self.state.selected = None;
                let status = format!("Search error: {}", message);
                self.state.last_failure = Some(status.clone());
                self.set_status(status);
            }
            UiEvent::OperationFinished { id } => {
                if self.current.as_ref().is_some_and(|op| op.id() == id) {
                    self.current = None;
                    self.state.busy = false;
                    self.state.progress = None;
                    debug!("任务 #{} 结束，恢复空闲", id);
                } else {
                    debug!("忽略过期任务 #{} 的结束事件", id);
                }
            }
        }
    }

    fn apply_progress(&mut self, progress: DownloadProgressEvent) {
        match progress {
            DownloadProgressEvent::Downloading { percent, speed, eta } => {
                self.state.progress = utils::parse_percent(&percent);
                self.set_status(format!("Downloading… {}  {}  ETA {}", percent, speed, eta));
            }
            DownloadProgressEvent::Finished => {
                self.state.progress = None;
                self.set_status("Merging…");
            }
            DownloadProgressEvent::Error { message } => {
                self.state.progress = None;
                let status = format!("Error: {}", message);
                self.state.last_failure = Some(status.clone());
                self.set_status(status);
            }
        }
    }

    /// 同一时间只允许一个耗时任务。
    fn ensure_idle(&mut self) -> AppResult<()> {
        if let Some(kind) = self.current_kind() {
            let message = format!("Busy: {} in progress (use 'cancel').", kind);
            self.set_status(message);
            return Err(AppError::Busy(kind.to_string()));
        }
        Ok(())
    }

    fn start<F>(&mut self, kind: OperationKind, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.state.busy = true;
        self.state.progress = None;
        self.state.last_failure = None;
        info!("开始任务 #{}: {}", id, kind);
        self.current = Some(Operation::spawn(id, kind, self.ui.clone(), work));
    }

    // ---------- 搜索 ----------

    pub fn set_limit(&mut self, requested: i64) {
        self.state.limit = utils::clamp_limit(requested);
        let status = format!("Search limit set to {}.", self.state.limit);
        self.set_status(status);
    }

    pub fn search(&mut self, query: &str) -> AppResult<()> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(());
        }
        self.ensure_idle()?;
        let limit = self.state.limit;
        self.set_status(format!("Searching: {} (limit {}) …", query, limit));

        let resolver = self.resolver.clone();
        let ui = self.ui.clone();
        self.start(OperationKind::Search, async move {
            match resolver.search(&query, i64::from(limit)).await {
                Ok(results) => ui.send(UiEvent::SearchCompleted { results }),
                Err(e) => {
                    warn!("搜索 '{}' 失败: {}", query, e);
                    ui.send(UiEvent::SearchFailed {
                        message: e.message(),
                    });
                }
            }
        });
        Ok(())
    }

    // ---------- 选择 ----------

    /// 选中第 `index` 条结果 (从 1 开始)。
    pub fn select(&mut self, index: usize) -> AppResult<()> {
        if index == 0 || index > self.state.results.len() {
            let message = if self.state.results.is_empty() {
                "No results to select. Search first.".to_string()
            } else {
                format!("No result #{} (1-{}).", index, self.state.results.len())
            };
            return Err(self.reject(&message));
        }
        self.state.selected = Some(index - 1);
        let title = self.state.results[index - 1].title.clone();
        self.set_status(format!("Selected #{}: {}", index, title));
        Ok(())
    }

    fn selected_page_url(&mut self) -> AppResult<String> {
        match self.state.selected_result().map(|r| r.page_url.clone()) {
            None => Err(self.reject("Select a video first.")),
            Some(url) if url.is_empty() => Err(self.reject("No URL.")),
            Some(url) => Ok(url),
        }
    }

    // ---------- 播放 ----------

    pub fn stream_selected(&mut self) -> AppResult<()> {
        self.ensure_idle()?;
        let page_url = self.selected_page_url()?;
        self.stream_page(page_url)
    }

    /// 用可用的播放器播放页面链接；只有 ffplay 时先解析单一直链。
    pub fn stream_page(&mut self, page_url: String) -> AppResult<()> {
        self.ensure_idle()?;
        let resolver = self.resolver.clone();
        let launcher = self.launcher.clone();
        let ui = self.ui.clone();
        self.start(OperationKind::Stream, async move {
            let (player, binary) = match launcher.locate() {
                Ok(found) => found,
                Err(_) => {
                    ui.fail("Install mpv or ffplay.");
                    return;
                }
            };
            let target = if player.needs_progressive_url() {
                ui.status("Resolving progressive stream…");
                let resolved = resolver
                    .resolve_progressive_url(&page_url)
                    .await
                    .and_then(|found| found.ok_or(AppError::ProgressiveResolutionFailed));
                match resolved {
                    Ok(url) => url,
                    Err(e @ AppError::ProgressiveResolutionFailed) => {
                        warn!("'{}': {}", page_url, e);
                        ui.fail("Could not get progressive URL.");
                        return;
                    }
                    Err(e) => {
                        ui.fail(format!("Could not get progressive URL: {}", e.message()));
                        return;
                    }
                }
            } else {
                page_url
            };
            ui.status("Launching player…");
            match launcher.run(&binary, player.stream_args(&target)).await {
                Ok(_) => ui.status("Playback finished."),
                Err(e) => ui.fail(format!("Player error: {}", e.message())),
            }
        });
        Ok(())
    }

    // ---------- 下载 ----------

    pub fn download_selected(&mut self) -> AppResult<()> {
        self.ensure_idle()?;
        let page_url = self.selected_page_url()?;
        self.download_page(page_url, false)
    }

    pub fn download_and_play_selected(&mut self) -> AppResult<()> {
        self.ensure_idle()?;
        let page_url = self.selected_page_url()?;
        self.download_page(page_url, true)
    }

    /// 下载页面链接到当前下载目录，`then_play` 为真时下载成功后立即播放。
    pub fn download_page(&mut self, page_url: String, then_play: bool) -> AppResult<()> {
        self.ensure_idle()?;
        let kind = if then_play {
            OperationKind::DownloadAndPlay
        } else {
            OperationKind::Download
        };
        self.set_status(format!("Starting download into {}", self.state.download_dir.display()));

        let destination = self.state.download_dir.clone();
        let resolver = self.resolver.clone();
        let launcher = self.launcher.clone();
        let ui = self.ui.clone();
        self.start(kind, async move {
            let progress_ui = ui.clone();
            let on_progress = move |event: DownloadProgressEvent| progress_ui.send(UiEvent::Progress(event));
            let Some(path) = resolver.download(&page_url, &destination, &on_progress).await else {
                ui.fail("Download failed.");
                return;
            };
            ui.status(format!("Saved: {}", path.display()));
            if !then_play {
                return;
            }
            match launcher.locate() {
                Ok((player, binary)) => {
                    let absolute = dunce::canonicalize(&path).unwrap_or(path);
                    if let Err(e) = launcher.run(&binary, player.file_args(&absolute)).await {
                        ui.fail(format!("Player error: {}", e.message()));
                    }
                }
                Err(_) => ui.fail("Install mpv or ffplay to play."),
            }
        });
        Ok(())
    }

    // ---------- 目录 ----------

    pub fn choose_folder(&mut self, path: &Path) -> AppResult<()> {
        if !path.is_dir() {
            return Err(self.reject(&format!("Folder does not exist: {}", path.display())));
        }
        let resolved = dunce::canonicalize(path)?;
        info!("下载目录更改为 {}", resolved.display());
        self.set_status(format!("Download folder: {}", resolved.display()));
        self.state.download_dir = resolved;
        Ok(())
    }

    // ---------- 配色 ----------

    fn parse_color(&mut self, value: &str) -> AppResult<ThemeColor> {
        value.parse::<ThemeColor>().map_err(|e| {
            self.set_status(format!("Invalid color: {}", value.trim()));
            e
        })
    }

    pub fn pick_background_color(&mut self, value: &str) -> AppResult<()> {
        let color = self.parse_color(value)?;
        self.set_status(format!("Background color set to {}.", color));
        self.state.theme.bg = color;
        Ok(())
    }

    pub fn pick_foreground_color(&mut self, value: &str) -> AppResult<()> {
        let color = self.parse_color(value)?;
        self.set_status(format!("Text color set to {}.", color));
        self.state.theme.fg = color;
        Ok(())
    }

    pub fn save_theme(&mut self) -> AppResult<()> {
        match self.themes.save(&self.state.theme) {
            Ok(()) => {
                let status = format!("Theme saved to {}", self.themes.path().display());
                self.set_status(status);
                Ok(())
            }
            Err(e) => {
                self.set_status(format!("Theme save error: {}", e.message()));
                Err(e)
            }
        }
    }

    pub fn reset_theme(&mut self) {
        self.state.theme = ThemeSettings::default();
        self.set_status("Theme reset to defaults.");
    }

    // ---------- 任务控制 ----------

    /// 请求取消当前任务；空闲状态由随后的结束事件恢复。
    pub fn cancel(&mut self) -> bool {
        match self.current.as_ref() {
            Some(op) => {
                op.cancel();
                let status = format!("Cancelling {}…", op.kind());
                self.set_status(status);
                true
            }
            None => {
                self.set_status("Nothing to cancel.");
                false
            }
        }
    }

    /// 取消并等待当前任务结束，退出前调用。
    pub async fn shutdown(&mut self) -> AppResult<()> {
        if let Some(op) = self.current.take() {
            op.cancel();
            op.join().await?;
            self.state.busy = false;
        }
        Ok(())
    }
}

// src/models/mod.rs

pub mod api;

use crate::{constants, utils};
use self::api::{RawFormat, RawInfo};
use std::path::PathBuf;

/// 一条搜索结果。搜索完成后不再修改，下一次搜索整体替换。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub title: String,
    pub channel: String,
    pub duration: Option<f64>,
    pub page_url: String,
    pub formats: Vec<Format>,
}

impl SearchResult {
    /// 列表中显示的一行: `标题  [时长]  频道`，过长的标题被截断
    pub fn display_line(&self) -> String {
        format!(
            "{}  [{}]  {}",
            utils::truncate_text(&self.title, constants::RESULT_TITLE_WIDTH),
            utils::format_duration(self.duration),
            self.channel
        )
    }
}

impl From<RawInfo> for SearchResult {
    fn from(raw: RawInfo) -> Self {
        let title = raw
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| constants::UNKNOWN_TITLE.to_string());
        let channel = raw
            .uploader
            .filter(|u| !u.is_empty())
            .or(raw.channel.filter(|c| !c.is_empty()))
            .unwrap_or_else(|| constants::UNKNOWN_CHANNEL.to_string());
        let page_url = raw.webpage_url.or(raw.url).unwrap_or_default();
        Self {
            title,
            channel,
            duration: raw.duration,
            page_url,
            formats: raw
                .formats
                .unwrap_or_default()
                .into_iter()
                .map(Format::from)
                .collect(),
        }
    }
}

/// 候选媒体格式，仅在解析直链时临时使用。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    pub direct_url: Option<String>,
}

impl Format {
    /// 音轨和视频轨都存在且都不是 "none"
    pub fn has_audio_and_video(&self) -> bool {
        let present =
            |codec: &Option<String>| codec.as_deref().is_some_and(|c| c != constants::formats::CODEC_NONE);
        present(&self.audio_codec) && present(&self.video_codec)
    }
}

impl From<RawFormat> for Format {
    fn from(raw: RawFormat) -> Self {
        Self {
            audio_codec: raw.acodec,
            video_codec: raw.vcodec,
            direct_url: raw.url,
        }
    }
}

/// 对单个页面链接探测得到的元数据
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaInfo {
    /// 选中的格式本身就是单一可播放直链时才存在
    pub url: Option<String>,
    pub formats: Vec<Format>,
}

impl From<RawInfo> for MediaInfo {
    fn from(raw: RawInfo) -> Self {
        Self {
            url: raw.url,
            formats: raw
                .formats
                .unwrap_or_default()
                .into_iter()
                .map(Format::from)
                .collect(),
        }
    }
}

/// 交给提取器的下载参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub page_url: String,
    pub destination: PathBuf,
    pub output_template: String,
    pub format_selector: String,
    pub merge_format: String,
}

/// 提取器下载结束后报告的信息；文件此时可能尚未落盘。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadReport {
    pub filepath: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadProgressEvent {
    Downloading {
        percent: String,
        speed: String,
        eta: String,
    },
    Finished,
    Error {
        message: String,
    },
}

/// 单次下载的生命周期
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Requested,
    Downloading,
    Finished,
    PathPending,
    PathResolved(PathBuf),
    PathTimedOut,
    Error(String),
}

impl DownloadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadPhase::PathResolved(_) | DownloadPhase::PathTimedOut | DownloadPhase::Error(_)
        )
    }

    /// 根据进度事件推进状态；终态不再变化。
    pub fn on_event(self, event: &DownloadProgressEvent) -> Self {
        if self.is_terminal() {
            return self;
        }
        match event {
            DownloadProgressEvent::Downloading { .. } => DownloadPhase::Downloading,
            DownloadProgressEvent::Finished => DownloadPhase::Finished,
            DownloadProgressEvent::Error { message } => DownloadPhase::Error(message.clone()),
        }
    }

    pub fn begin_poll(self) -> Self {
        if self.is_terminal() { self } else { DownloadPhase::PathPending }
    }

    pub fn resolve(self, found: Option<PathBuf>) -> Self {
        match (self, found) {
            (DownloadPhase::PathPending, Some(path)) => DownloadPhase::PathResolved(path),
            (DownloadPhase::PathPending, None) => DownloadPhase::PathTimedOut,
            (other, _) => other,
        }
    }
}

// src/session/state.rs

use crate::{config::theme::ThemeSettings, models::SearchResult};
use std::path::PathBuf;

/// 会话状态，只由 `SessionController` 在 UI 循环中修改。
#[derive(Debug, Clone)]
pub struct SessionState {
    pub limit: u32,
    pub results: Vec<SearchResult>,
    pub selected: Option<usize>,
    pub download_dir: PathBuf,
    pub busy: bool,
    pub status: String,
    /// 当前下载的百分比，仅在提取器报告时存在
    pub progress: Option<f64>,
    /// 最近一次任务的失败信息，新任务开始时清空
    pub last_failure: Option<String>,
    pub theme: ThemeSettings,
}

impl SessionState {
    pub fn new(download_dir: PathBuf, limit: u32, theme: ThemeSettings) -> Self {
        Self {
            limit,
            results: Vec::new(),
            selected: None,
            download_dir,
            busy: false,
            status: "Ready.".to_string(),
            progress: None,
            last_failure: None,
            theme,
        }
    }

    pub fn selected_result(&self) -> Option<&SearchResult> {
        self.selected.and_then(|i| self.results.get(i))
    }

    /// 每条结果渲染后的文本，顺序与搜索结果一致
    pub fn result_lines(&self) -> Vec<String> {
        self.results.iter().map(SearchResult::display_line).collect()
    }
}

// src/utils.rs

use crate::constants;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ANSI_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").unwrap());
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

/// 秒数格式化为 `H:MM:SS` (不少于一小时) 或 `M:SS`；未知时为 `?:??`。
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return constants::UNKNOWN_DURATION.to_string();
    };
    let total = seconds.max(0.0) as u64;
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// 把用户给出的任意数量限制到 [1, 50]。
pub fn clamp_limit(requested: i64) -> u32 {
    requested.clamp(
        i64::from(constants::MIN_SEARCH_LIMIT),
        i64::from(constants::MAX_SEARCH_LIMIT),
    ) as u32
}

pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE_RE.replace_all(text, "").trim().to_string()
}

/// 从 `" 45.3%"` 之类的字符串中取出百分比数值。
pub fn parse_percent(text: &str) -> Option<f64> {
    PERCENT_RE
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|p| p.clamp(0.0, 100.0))
}

/// 只有 http/https 地址才能交给外部播放器直接拉流。
pub fn is_fetchable_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

// src/models/api.rs

use serde::Deserialize;

// --- yt-dlp `--dump-single-json` 输出结构体 ---
// 只声明用得到的字段，其余字段由 serde 忽略。

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawInfo {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<f64>,
    pub webpage_url: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Option<Vec<RawFormat>>,
    /// 搜索伪查询 (`ytsearchN:`) 的结果列表；条目可能为 null
    #[serde(default)]
    pub entries: Option<Vec<Option<RawInfo>>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawFormat {
    pub acodec: Option<String>,
    pub vcodec: Option<String>,
    pub url: Option<String>,
}

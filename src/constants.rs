// src/constants.rs

pub const APP_NAME: &str = "KittyTube";
pub const UI_WIDTH: usize = 88;
pub const RESULT_TITLE_WIDTH: usize = 60;
pub const THEME_FILE_NAME: &str = "kittytube_theme.json";
pub const LOG_FILE_NAME: &str = "kittytube.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const DEFAULT_YTDLP_BIN: &str = "yt-dlp";

pub const DEFAULT_BG: &str = "#1e1e1e";
pub const DEFAULT_FG: &str = "#e6e6e6";

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const MIN_SEARCH_LIMIT: u32 = 1;
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// 下载后等待合并/重命名完成的轮询策略
pub const FILE_POLL_INTERVAL_MS: u64 = 100;
pub const FILE_POLL_ATTEMPTS: u32 = 50;

pub const UNKNOWN_DURATION: &str = "?:??";
pub const UNKNOWN_TITLE: &str = "(no title)";
pub const UNKNOWN_CHANNEL: &str = "Unknown";

pub mod formats {
    /// 最佳视频 + 最佳音频，失败时退回单一最佳格式
    pub const DOWNLOAD: &str = "bv*+ba/best";
    /// 同时含音轨和视频轨的单一格式 (ffplay 无法自行合流)
    pub const PROGRESSIVE: &str = "best[acodec!=none][vcodec!=none]/best";
    pub const MPV_STREAM: &str = "bestvideo+bestaudio/best";
    pub const MERGE_CONTAINER: &str = "mp4";
    /// 文件名模板，标题截断到 200 个字符
    pub const OUTPUT_TEMPLATE: &str = "%(title).200s.%(ext)s";
    pub const CODEC_NONE: &str = "none";
}

pub const HELP_COMMANDS: &str = r#"
search <关键词>    搜索视频 (别名: s)
limit <n>          设置搜索结果数量 (1-50)
list               重新显示当前结果
select <n> | <n>   选中第 n 个结果
stream [n]         使用 mpv/ffplay 播放选中项
download [n]       下载选中项 (别名: dl)
both [n]           下载后立即播放
folder [路径]      查看或更改下载目录
bg <#rrggbb>       设置背景色
fg <#rrggbb>       设置文字颜色
save-theme         保存当前配色
reset-theme        恢复默认配色
cancel             取消正在进行的任务
status             显示当前状态
help               显示本帮助
quit | exit        退出"#;

// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// 对选中视频执行的操作
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// 下载到本地
    Download,
    /// 直接播放
    Stream,
    /// 下载后立即播放
    Both,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&["interactive", "search", "url"]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 启动交互式会话 (搜索、播放、下载、配色)
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// 搜索关键词并列出结果
    #[arg(short, long, value_name = "QUERY", help_heading = "Mode")]
    pub search: Option<String>,
    /// 直接处理单个视频页面链接
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,

    // --- 选项 (Options) ---
    /// [搜索模式] 对第 N 个结果执行 --action
    #[arg(long, value_name = "N", requires = "search", conflicts_with_all = ["url", "interactive"], help_heading = "Options")]
    pub pick: Option<usize>,
    /// 对选中视频执行的操作
    #[arg(short, long, value_enum, default_value_t = Action::Download, help_heading = "Options")]
    pub action: Action,
    /// 搜索结果数量 (自动限制在 1-50 之间)
    #[arg(short, long, default_value_t = i64::from(constants::DEFAULT_SEARCH_LIMIT), allow_negative_numbers = true, help_heading = "Options")]
    pub limit: i64,
    /// 设置文件保存目录
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// yt-dlp 可执行文件路径
    #[arg(long = "yt-dlp", value_name = "PATH", env = "KITTYTUBE_YTDLP", default_value = constants::DEFAULT_YTDLP_BIN, help_heading = "Options")]
    pub ytdlp: PathBuf,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

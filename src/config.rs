// src/config.rs

pub mod theme;

use crate::{cli::Cli, constants, error::AppResult, utils};
use anyhow::{Context, anyhow};
use std::{path::PathBuf, time::Duration};

/// 下载完成后等待目标文件出现的轮询策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(constants::FILE_POLL_INTERVAL_MS),
            attempts: constants::FILE_POLL_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ytdlp_bin: PathBuf,
    pub search_limit: u32,
    pub download_dir: PathBuf,
    pub poll: PollPolicy,
    pub theme_path: PathBuf,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let download_dir = if args.output.is_absolute() {
            args.output.clone()
        } else {
            std::env::current_dir()
                .context("无法获取当前工作目录")?
                .join(&args.output)
        };

        Ok(Self {
            ytdlp_bin: args.ytdlp.clone(),
            search_limit: utils::clamp_limit(args.limit),
            download_dir,
            poll: PollPolicy::default(),
            theme_path: theme::default_theme_path()?,
        })
    }
}

/// 用户级配置目录: Windows 为 %APPDATA%，macOS 为 Application Support，其余为 XDG_CONFIG_HOME。
pub fn config_dir() -> AppResult<PathBuf> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or_else(|| anyhow!("无法获取用户配置目录"))?;
    Ok(base.join(constants::APP_NAME))
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        let base = std::env::temp_dir().join("kittytube-test");
        Self {
            ytdlp_bin: PathBuf::from(constants::DEFAULT_YTDLP_BIN),
            search_limit: constants::DEFAULT_SEARCH_LIMIT,
            download_dir: base.join(constants::DEFAULT_SAVE_DIR),
            poll: PollPolicy {
                interval: Duration::from_millis(5),
                attempts: 3,
            },
            theme_path: base.join(constants::THEME_FILE_NAME),
        }
    }
}

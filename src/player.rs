// src/player.rs

use crate::{constants::formats, error::*};
use log::{debug, info};
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};
use tokio::process::Command;

/// 支持的外部播放器，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    /// 自带 yt-dlp 集成，可以直接打开页面链接
    Mpv,
    /// 只能播放单一直链
    Ffplay,
}

impl Player {
    pub const PREFERENCE: [Player; 2] = [Player::Mpv, Player::Ffplay];

    pub fn binary_name(self) -> &'static str {
        match self {
            Player::Mpv => "mpv",
            Player::Ffplay => "ffplay",
        }
    }

    /// ffplay 不能自己合并分离的音视频流，需要先解析出单一直链。
    pub fn needs_progressive_url(self) -> bool {
        self == Player::Ffplay
    }

    fn base_args(self) -> Vec<OsString> {
        match self {
            Player::Mpv => vec![],
            Player::Ffplay => ["-autoexit", "-loglevel", "warning"].map(OsString::from).to_vec(),
        }
    }

    /// 播放网络地址：mpv 用页面链接，ffplay 用已解析的直链。
    pub fn stream_args(self, target: &str) -> Vec<OsString> {
        let mut args = self.base_args();
        if self == Player::Mpv {
            args.push("--ytdl=yes".into());
            args.push(format!("--ytdl-format={}", formats::MPV_STREAM).into());
        }
        args.push(target.into());
        args
    }

    pub fn file_args(self, path: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push(path.as_os_str().to_owned());
        args
    }
}

/// 负责查找并启动播放器
#[derive(Debug, Clone, Default)]
pub struct PlayerLauncher {
    search_path: Option<OsString>,
}

impl PlayerLauncher {
    /// 在 `PATH` 中查找播放器
    pub fn from_env() -> Self {
        Self::default()
    }

    /// 只在给定的路径列表中查找 (格式同 `PATH`)
    pub fn with_search_path(paths: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(paths.into()),
        }
    }

    fn find(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_default();
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }

    /// 按优先级返回第一个可用的播放器
    pub fn locate(&self) -> AppResult<(Player, PathBuf)> {
        Player::PREFERENCE
            .into_iter()
            .find_map(|player| self.find(player.binary_name()).map(|path| (player, path)))
            .inspect(|(player, path)| debug!("使用播放器 {:?}: {}", player, path.display()))
            .ok_or(AppError::PlayerUnavailable)
    }

    /// 启动播放器并等待其退出；退出码只记录，不视为错误。
    pub async fn run<I, S>(&self, binary: &Path, args: I) -> AppResult<ExitStatus>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        info!("启动播放器 {}", binary.display());
        let status = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;
        info!("播放器退出: {}", status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpv_stream_args_enable_ytdl() {
        let args = Player::Mpv.stream_args("https://www.youtube.com/watch?v=abc");
        assert_eq!(
            args,
            vec![
                OsString::from("--ytdl=yes"),
                OsString::from("--ytdl-format=bestvideo+bestaudio/best"),
                OsString::from("https://www.youtube.com/watch?v=abc"),
            ]
        );
    }

    #[test]
    fn test_ffplay_args_are_quiet_and_autoexit() {
        let args = Player::Ffplay.file_args(Path::new("/tmp/a.mp4"));
        assert_eq!(
            args,
            ["-autoexit", "-loglevel", "warning", "/tmp/a.mp4"].map(OsString::from).to_vec()
        );
        assert!(Player::Ffplay.needs_progressive_url());
        assert!(!Player::Mpv.needs_progressive_url());
    }

    #[test]
    fn test_locate_reports_missing_players() {
        let empty = std::env::temp_dir().join("kittytube-no-players-here");
        let launcher = PlayerLauncher::with_search_path(empty.as_os_str());
        assert!(matches!(launcher.locate(), Err(AppError::PlayerUnavailable)));
    }
}

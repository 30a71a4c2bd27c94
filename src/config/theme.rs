// src/config/theme.rs

use crate::{
    constants,
    error::{AppError, AppResult},
};
use anyhow::Context;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

pub(super) fn default_theme_path() -> AppResult<PathBuf> {
    Ok(super::config_dir()?.join(constants::THEME_FILE_NAME))
}

/// `#rgb` 或 `#rrggbb` 形式的颜色，保存时保留用户输入的写法。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(String);

impl ThemeColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.0[1..];
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        if hex.len() == 3 {
            let expand = |i: usize| channel(&hex[i..=i].repeat(2));
            (expand(0), expand(1), expand(2))
        } else {
            (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6]))
        }
    }
}

impl FromStr for ThemeColor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = trimmed
            .strip_prefix('#')
            .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(AppError::InvalidColor(s.to_string()))
        }
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        color.0
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_bg() -> ThemeColor {
    ThemeColor(constants::DEFAULT_BG.to_string())
}

fn default_fg() -> ThemeColor {
    ThemeColor(constants::DEFAULT_FG.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default = "default_bg")]
    pub bg: ThemeColor,
    #[serde(default = "default_fg")]
    pub fg: ThemeColor,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            bg: default_bg(),
            fg: default_fg(),
        }
    }
}

/// 配色的来源，回退时附带原因以便记录和提示
#[derive(Debug)]
pub enum ThemeSource {
    File(PathBuf),
    Defaults,
    Fallback(AppError),
}

pub struct ThemeStore {
    path: PathBuf,
    legacy_path: Option<PathBuf>,
}

impl ThemeStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            legacy_path: legacy_sibling_path(),
        }
    }

    /// 额外指定一个旧版本位置，配置文件不存在时从那里导入一次。
    pub fn with_legacy_path(mut self, legacy: Option<PathBuf>) -> Self {
        self.legacy_path = legacy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取配色。文件缺失或损坏时返回默认值，并通过 `ThemeSource` 告知原因。
    pub fn load(&self) -> (ThemeSettings, ThemeSource) {
        if let Err(e) = self.import_legacy() {
            warn!("导入旧版配色文件失败: {}", e);
        }
        if !self.path.is_file() {
            debug!("配色文件 {:?} 不存在，使用默认配色", self.path);
            return (ThemeSettings::default(), ThemeSource::Defaults);
        }
        match self.read() {
            Ok(theme) => {
                info!("已从 {} 加载配色", self.path.display());
                (theme, ThemeSource::File(self.path.clone()))
            }
            Err(e) => {
                warn!("配色文件 {} 无法使用，回退到默认配色: {}", self.path.display(), e);
                (ThemeSettings::default(), ThemeSource::Fallback(e))
            }
        }
    }

    fn read(&self) -> AppResult<ThemeSettings> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("读取配色文件 '{}' 失败", self.path.display()))
            .map_err(|e| AppError::ThemePersistence(format!("{:#}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::ThemePersistence(format!("解析配色文件 '{}' 失败: {}", self.path.display(), e)))
    }

    pub fn save(&self, theme: &ThemeSettings) -> AppResult<()> {
        let write = || -> anyhow::Result<()> {
            if let Some(dir) = self.path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("创建配置目录 '{}' 失败", dir.display()))?;
            }
            let json_content = serde_json::to_string_pretty(theme)?;
            fs::write(&self.path, json_content)
                .with_context(|| format!("写入配色文件 '{}' 失败", self.path.display()))?;
            Ok(())
        };
        write().map_err(|e| AppError::ThemePersistence(format!("{:#}", e)))?;
        info!("配色已保存至: {}", self.path.display());
        Ok(())
    }

    fn import_legacy(&self) -> AppResult<()> {
        let Some(legacy) = self.legacy_path.as_ref() else {
            return Ok(());
        };
        if self.path.exists() || !legacy.is_file() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::copy(legacy, &self.path)?;
        info!("已将旧版配色文件 {} 导入到 {}", legacy.display(), self.path.display());
        Ok(())
    }
}

/// 旧版本把配色文件放在可执行文件旁边
fn legacy_sibling_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(constants::THEME_FILE_NAME)))
}

// src/session/command.rs

use std::path::PathBuf;

/// 交互模式下的一条用户指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    Limit(i64),
    List,
    Select(usize),
    Stream(Option<usize>),
    Download(Option<usize>),
    Both(Option<usize>),
    Folder(Option<PathBuf>),
    Background(String),
    Foreground(String),
    SaveTheme,
    ResetTheme,
    Cancel,
    Status,
    Help,
    Quit,
}

fn parse_index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("无效的序号 '{}'", arg)),
    }
}

fn optional_index(arg: &str) -> Result<Option<usize>, String> {
    if arg.is_empty() { Ok(None) } else { parse_index(arg).map(Some) }
}

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(SessionCommand::Quit);
    }
    if line.chars().all(|c| c.is_ascii_digit()) {
        return parse_index(line).map(SessionCommand::Select);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match verb.to_lowercase().as_str() {
        "search" | "s" | "find" => {
            if rest.is_empty() {
                return Err("用法: search <关键词>".to_string());
            }
            SessionCommand::Search(rest.to_string())
        }
        "limit" => SessionCommand::Limit(
            rest.parse::<i64>()
                .map_err(|_| format!("无效的数量 '{}'", rest))?,
        ),
        "list" | "ls" => SessionCommand::List,
        "select" | "sel" => SessionCommand::Select(parse_index(rest)?),
        "stream" | "play" => SessionCommand::Stream(optional_index(rest)?),
        "download" | "dl" => SessionCommand::Download(optional_index(rest)?),
        "both" => SessionCommand::Both(optional_index(rest)?),
        "folder" | "dir" => SessionCommand::Folder((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "bg" => SessionCommand::Background(rest.to_string()),
        "fg" => SessionCommand::Foreground(rest.to_string()),
        "save-theme" => SessionCommand::SaveTheme,
        "reset-theme" => SessionCommand::ResetTheme,
        "cancel" => SessionCommand::Cancel,
        "status" => SessionCommand::Status,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("未知指令 '{}'，输入 help 查看帮助", other)),
    };
    Ok(command)
}

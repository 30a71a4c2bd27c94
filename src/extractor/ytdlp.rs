// src/extractor/ytdlp.rs

use super::{MediaExtractor, ProgressCallback};
use crate::{
    error::*,
    models::{
        DownloadProgressEvent, DownloadReport, DownloadRequest, MediaInfo, SearchResult,
        api::RawInfo,
    },
    utils,
};
use async_trait::async_trait;
use log::{debug, info, trace, warn};
use std::{
    path::PathBuf,
    process::{ExitStatus, Stdio},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
};

const PROGRESS_PREFIX: &str = "KT_PROGRESS|";
const OUTPUT_PREFIX: &str = "KT_OUTPUT|";

/// 通过 yt-dlp 可执行文件实现的提取器
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.env("PYTHONIOENCODING", "UTF-8")
            .env("PYTHONUTF8", "1")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// 以 `--dump-single-json` 模式运行，不下载任何内容。
    async fn dump_json(&self, args: &[&str]) -> AppResult<Option<RawInfo>> {
        debug!("运行 {} --dump-single-json {:?}", self.binary.display(), args);
        let output = self
            .command()
            .args(["--dump-single-json", "--no-playlist", "--quiet", "--no-warnings"])
            .args(args)
            .output()
            .await
            .map_err(|e| AppError::Extraction(format!("无法启动 {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Extraction(error_summary(&stderr, output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let body = stdout.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }
        serde_json::from_str(body)
            .map(Some)
            .map_err(|e| AppError::Extraction(format!("无法解析 yt-dlp 输出: {}", e)))
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<SearchResult>> {
        let pseudo_query = format!("ytsearch{}:{}", limit, query);
        let info = self
            .dump_json(&[&pseudo_query])
            .await?
            .ok_or_else(|| AppError::Extraction(format!("搜索 '{}' 没有返回任何数据", query)))?;
        let results: Vec<SearchResult> = info
            .entries
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(SearchResult::from)
            .collect();
        info!("搜索 '{}' 得到 {} 条结果", query, results.len());
        Ok(results)
    }

    async fn probe(&self, page_url: &str, format_selector: &str) -> AppResult<Option<MediaInfo>> {
        Ok(self
            .dump_json(&["-f", format_selector, page_url])
            .await?
            .map(MediaInfo::from))
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: &ProgressCallback<'_>,
    ) -> AppResult<DownloadReport> {
        let output_template = request.destination.join(&request.output_template);
        let progress_template = format!(
            "download:{}%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s",
            PROGRESS_PREFIX
        );
        let print_template = format!("after_move:{}%(filepath)s", OUTPUT_PREFIX);

        let mut child = self
            .command()
            .args(["--no-playlist", "--newline", "--progress", "--no-warnings"])
            .arg("--progress-template")
            .arg(&progress_template)
            .arg("--print")
            .arg(&print_template)
            .arg("-f")
            .arg(&request.format_selector)
            .arg("--merge-output-format")
            .arg(&request.merge_format)
            .arg("-o")
            .arg(&output_template)
            .arg(&request.page_url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::DownloadFailed(format!("无法启动 {}: {}", self.binary.display(), e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::DownloadFailed("无法读取 yt-dlp 标准输出".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::DownloadFailed("无法读取 yt-dlp 错误输出".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                trace!("yt-dlp stderr: {}", line);
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        let mut filepath = None;
        let mut finished_seen = false;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_output_line(&line) {
                Some(OutputLine::Progress(event)) => {
                    finished_seen |= event == DownloadProgressEvent::Finished;
                    on_progress(event);
                }
                Some(OutputLine::Filepath(path)) => {
                    debug!("yt-dlp 报告输出文件: {}", path.display());
                    filepath = Some(path);
                }
                None => trace!("yt-dlp stdout: {}", line),
            }
        }

        let status = child.wait().await?;
        let stderr_text = stderr_task.await.unwrap_or_default();
        if !status.success() {
            return Err(AppError::DownloadFailed(error_summary(&stderr_text, status)));
        }
        if !finished_seen {
            on_progress(DownloadProgressEvent::Finished);
        }
        if filepath.is_none() {
            warn!("yt-dlp 成功退出但没有报告输出文件路径");
        }
        Ok(DownloadReport { filepath })
    }
}

#[derive(Debug, PartialEq)]
enum OutputLine {
    Progress(DownloadProgressEvent),
    Filepath(PathBuf),
}

fn parse_output_line(line: &str) -> Option<OutputLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(path) = line.strip_prefix(OUTPUT_PREFIX) {
        let path = path.trim();
        return (!path.is_empty() && path != "NA").then(|| OutputLine::Filepath(PathBuf::from(path)));
    }
    let rest = line.strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = rest.split('|').map(utils::strip_ansi);
    let status = fields.next()?;
    match status.as_str() {
        "downloading" => {
            let percent = fields.next().unwrap_or_default();
            let speed = fields.next().unwrap_or_default();
            let eta = fields.next().unwrap_or_default();
            Some(OutputLine::Progress(DownloadProgressEvent::Downloading { percent, speed, eta }))
        }
        "finished" => Some(OutputLine::Progress(DownloadProgressEvent::Finished)),
        // yt-dlp 的 error 状态随后一定伴随非零退出码，由调用方统一报告
        _ => None,
    }
}

/// 取 stderr 中最后一条 `ERROR:` 行作为错误信息。
fn error_summary(stderr: &str, status: ExitStatus) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .map(|msg| msg.trim().to_string())
        .or_else(|| lines.last().map(|l| l.to_string()))
        .unwrap_or_else(|| format!("yt-dlp 异常退出 ({})", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_downloading_line() {
        let line = "KT_PROGRESS|downloading|\u{1b}[0;94m 42.0%\u{1b}[0m|  1.20MiB/s|00:13";
        assert_eq!(
            parse_output_line(line),
            Some(OutputLine::Progress(DownloadProgressEvent::Downloading {
                percent: "42.0%".into(),
                speed: "1.20MiB/s".into(),
                eta: "00:13".into(),
            }))
        );
    }

    #[test]
    fn test_parse_finished_and_output_lines() {
        assert_eq!(
            parse_output_line("KT_PROGRESS|finished|100%|NA|NA"),
            Some(OutputLine::Progress(DownloadProgressEvent::Finished))
        );
        assert_eq!(
            parse_output_line("KT_OUTPUT|/tmp/downloads/Lofi Beats.mp4\r"),
            Some(OutputLine::Filepath(PathBuf::from("/tmp/downloads/Lofi Beats.mp4")))
        );
        assert_eq!(parse_output_line("KT_OUTPUT|NA"), None);
        assert_eq!(parse_output_line("[Merger] Merging formats into \"a.mp4\""), None);
        assert_eq!(parse_output_line("KT_PROGRESS|error|NA|NA|NA"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_error_summary_prefers_error_line() {
        use std::os::unix::process::ExitStatusExt;
        let status = ExitStatus::from_raw(1 << 8);
        let stderr = "WARNING: something\nERROR: [youtube] abc: Video unavailable\n\n";
        assert_eq!(error_summary(stderr, status), "[youtube] abc: Video unavailable");
        assert_eq!(error_summary("just noise\n", status), "just noise");
        assert!(error_summary("", status).contains("yt-dlp"));
    }
}

// tests/ytdlp_extractor_test.rs

#![cfg(unix)]

mod common;

use common::{fast_poll, write_script};
use kittytube::{
    constants::formats,
    error::AppError,
    extractor::{MediaExtractor, ytdlp::YtDlp},
    models::DownloadProgressEvent,
    resolver::Resolver,
};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tempfile::tempdir;

const SEARCH_JSON: &str = r##"{"entries": [{"title": "A", "uploader": "U", "channel": "ignored", "duration": 3723, "webpage_url": "https://www.youtube.com/watch?v=a", "url": "a"}, null, {"channel": "C", "url": "https://www.youtube.com/watch?v=b"}]}"##;

const PROBE_JSON: &str = r##"{"title": "A", "formats": [{"acodec": "mp4a.40.2", "vcodec": "avc1", "url": "https://cdn.example.com/360p.mp4"}, {"acodec": "mp4a.40.2", "vcodec": "avc1", "url": "https://cdn.example.com/720p.mp4"}, {"acodec": "none", "vcodec": "vp9", "url": "https://cdn.example.com/1080p.webm"}]}"##;

/// 模拟 yt-dlp：按参数区分搜索、下载和探测，并把收到的参数记录到 `args.txt`。
fn fake_ytdlp(dir: &Path, output_file: &Path) -> PathBuf {
    let body = r##"#!/bin/sh
printf '%s\n' "$@" > '{ARGS}'
case "$*" in
  *ytsearch*)
    cat <<'JSON'
{SEARCH}
JSON
    ;;
  *--newline*)
    echo 'KT_PROGRESS|downloading| 10.0%|1MiB/s|00:05'
    echo '[Merger] Merging formats into "A.mp4"'
    echo 'KT_PROGRESS|finished|100%|NA|NA'
    : > '{OUT}'
    echo 'KT_OUTPUT|{OUT}'
    ;;
  *)
    cat <<'JSON'
{PROBE}
JSON
    ;;
esac
"##
    .replace("{ARGS}", &dir.join("args.txt").display().to_string())
    .replace("{SEARCH}", SEARCH_JSON)
    .replace("{PROBE}", PROBE_JSON)
    .replace("{OUT}", &output_file.display().to_string());
    write_script(dir, "yt-dlp", &body)
}

/// 总是以 yt-dlp 的错误格式失败
fn failing_ytdlp(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "yt-dlp",
        "#!/bin/sh\necho 'WARNING: unable to extract uploader' >&2\necho 'ERROR: [youtube] x: Video unavailable' >&2\nexit 1\n",
    )
}

fn recorded_args(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_search_parses_entries_with_fallbacks() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    let ytdlp = YtDlp::new(fake_ytdlp(&bin, &dir.path().join("unused.mp4")));

    let results = ytdlp.search("lofi", 5).await.unwrap();

    let lines: Vec<String> = results.iter().map(|r| r.display_line()).collect();
    assert_eq!(lines, vec!["A  [1:02:03]  U", "(no title)  [?:??]  C"]);
    assert_eq!(results[0].page_url, "https://www.youtube.com/watch?v=a");
    assert_eq!(results[1].page_url, "https://www.youtube.com/watch?v=b");

    let args = recorded_args(&bin);
    assert!(args.contains(&"ytsearch5:lofi".to_string()));
    assert!(args.contains(&"--dump-single-json".to_string()));
    assert!(args.contains(&"--no-playlist".to_string()));
}

#[tokio::test]
async fn test_probe_feeds_progressive_resolution() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    let ytdlp = Arc::new(YtDlp::new(fake_ytdlp(&bin, &dir.path().join("unused.mp4"))));

    let info = ytdlp
        .probe("https://www.youtube.com/watch?v=a", formats::PROGRESSIVE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.url, None);
    assert_eq!(info.formats.len(), 3);

    let url = Resolver::new(ytdlp, fast_poll())
        .resolve_progressive_url("https://www.youtube.com/watch?v=a")
        .await
        .unwrap();
    assert_eq!(url.as_deref(), Some("https://cdn.example.com/720p.mp4"));

    let args = recorded_args(&bin);
    let selector = args.iter().position(|a| a == "-f").map(|i| args[i + 1].as_str());
    assert_eq!(selector, Some(formats::PROGRESSIVE));
}

#[tokio::test]
async fn test_download_reports_progress_and_final_path() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin");
    let destination = dir.path().join("downloads");
    let output = destination.join("A.mp4");
    let ytdlp = Arc::new(YtDlp::new(fake_ytdlp(&bin, &output)));

    let events = Mutex::new(Vec::new());
    let on_progress = |event: DownloadProgressEvent| events.lock().unwrap().push(event);
    let result = Resolver::new(ytdlp, fast_poll())
        .download("https://www.youtube.com/watch?v=a", &destination, &on_progress)
        .await;

    assert_eq!(result, Some(output));
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            DownloadProgressEvent::Downloading {
                percent: "10.0%".into(),
                speed: "1MiB/s".into(),
                eta: "00:05".into(),
            },
            DownloadProgressEvent::Finished,
        ]
    );

    let args = recorded_args(&bin);
    let value_of = |flag: &str| args.iter().position(|a| a == flag).map(|i| args[i + 1].clone());
    assert_eq!(value_of("-f").as_deref(), Some("bv*+ba/best"));
    assert_eq!(value_of("--merge-output-format").as_deref(), Some("mp4"));
    assert_eq!(
        value_of("-o"),
        Some(destination.join("%(title).200s.%(ext)s").display().to_string())
    );
    assert_eq!(args.last().map(String::as_str), Some("https://www.youtube.com/watch?v=a"));
}

#[tokio::test]
async fn test_error_exit_surfaces_last_error_line() {
    let dir = tempdir().unwrap();
    let ytdlp = Arc::new(YtDlp::new(failing_ytdlp(&dir.path().join("bin"))));

    let err = ytdlp.search("lofi", 5).await.unwrap_err();
    assert!(matches!(err, AppError::Extraction(ref msg) if msg == "[youtube] x: Video unavailable"));

    let events = Mutex::new(Vec::new());
    let on_progress = |event: DownloadProgressEvent| events.lock().unwrap().push(event);
    let result = Resolver::new(ytdlp, fast_poll())
        .download("https://www.youtube.com/watch?v=x", &dir.path().join("downloads"), &on_progress)
        .await;

    assert_eq!(result, None);
    assert_eq!(
        *events.lock().unwrap(),
        vec![DownloadProgressEvent::Error {
            message: "[youtube] x: Video unavailable".into()
        }]
    );
}

#[tokio::test]
async fn test_null_output_means_nothing_found() {
    let dir = tempdir().unwrap();
    let script = write_script(&dir.path().join("bin"), "yt-dlp", "#!/bin/sh\necho null\n");
    let ytdlp = YtDlp::new(script);

    assert_eq!(ytdlp.probe("https://www.youtube.com/watch?v=a", "best").await.unwrap(), None);
    assert!(matches!(ytdlp.search("lofi", 5).await, Err(AppError::Extraction(_))));
}

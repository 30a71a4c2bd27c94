// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use kittytube::{cli::Cli, logging, report_fatal, run_from_cli};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持。
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "kittytube".to_string());

    let after_help = format!(
        "示例:\n  # 启动交互模式 (推荐)\n  {bin} -i\n\n  # 搜索并列出 10 条结果\n  {bin} --search \"lofi\" --limit 10\n\n  # 搜索后播放第 2 条\n  {bin} --search \"lofi\" --pick 2 --action stream\n\n  # 直接下载单个链接\n  {bin} --url \"https://www.youtube.com/watch?v=...\" -o ~/Videos",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    logging::setup_logging(args.log_level);

    if let Err(e) = run_from_cli(args).await {
        report_fatal(&e);
        std::process::exit(1);
    }
}

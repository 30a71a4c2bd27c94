// src/lib.rs

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod player;
pub mod resolver;
pub mod session;
pub mod symbols;
pub mod ui;
pub mod utils;

use crate::{
    cli::{Action, Cli},
    config::{AppConfig, theme::ThemeStore},
    error::{AppError, AppResult},
    extractor::ytdlp::YtDlp,
    player::PlayerLauncher,
    resolver::Resolver,
    session::{OperationKind, SessionCommand, SessionController, UiEvent, parse_command},
    ui::TerminalView,
};
use colored::*;
use log::{debug, error, info};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::{self, UnboundedReceiver},
};

/// 根据配置组装会话控制器
pub fn build_controller(config: &AppConfig) -> (SessionController, UnboundedReceiver<UiEvent>) {
    let extractor = Arc::new(YtDlp::new(config.ytdlp_bin.clone()));
    let resolver = Resolver::new(extractor, config.poll);
    SessionController::new(
        resolver,
        PlayerLauncher::from_env(),
        ThemeStore::new(config.theme_path.clone()),
        config.download_dir.clone(),
        config.search_limit,
    )
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    let config = AppConfig::new(&args)?;
    debug!("加载的应用配置: {:?}", config);

    let (mut controller, mut events) = build_controller(&config);
    let mut view = TerminalView::new();
    let mut interrupts = interrupts()?;

    let result = if args.interactive {
        handle_interactive_mode(&mut controller, &mut events, &mut interrupts, &mut view).await
    } else if let Some(query) = &args.search {
        handle_search_mode(&args, query, &mut controller, &mut events, &mut interrupts, &mut view).await
    } else if let Some(url) = &args.url {
        let page_url = url.trim().to_string();
        run_action(args.action, Some(page_url), &mut controller)?;
        drive_until_idle(&mut controller, &mut events, &mut interrupts, &mut view).await?;
        outcome(&controller)
    } else {
        Ok(())
    };

    controller.shutdown().await?;
    result
}

/// 注册一次 Ctrl+C 监听，之后每次中断都转发到返回的通道。
pub fn interrupts() -> AppResult<UnboundedReceiver<()>> {
    #[cfg(unix)]
    let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
    #[cfg(windows)]
    let mut signal = tokio::signal::windows::ctrl_c()?;

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while signal.recv().await.is_some() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    Ok(rx)
}

/// 把最近一次任务的失败转换为错误，供一次性模式设置退出码。
fn outcome(controller: &SessionController) -> AppResult<()> {
    match &controller.state().last_failure {
        Some(failure) => Err(AppError::UserInputError(failure.clone())),
        None => Ok(()),
    }
}

/// `page_url` 为空时对当前选中项执行操作。
fn run_action(action: Action, page_url: Option<String>, controller: &mut SessionController) -> AppResult<()> {
    match (action, page_url) {
        (Action::Download, Some(url)) => controller.download_page(url, false),
        (Action::Both, Some(url)) => controller.download_page(url, true),
        (Action::Stream, Some(url)) => controller.stream_page(url),
        (Action::Download, None) => controller.download_selected(),
        (Action::Both, None) => controller.download_and_play_selected(),
        (Action::Stream, None) => controller.stream_selected(),
    }
}

/// 一次性模式下等待当前任务结束；Ctrl+C 取消任务。
async fn drive_until_idle(
    controller: &mut SessionController,
    events: &mut UnboundedReceiver<UiEvent>,
    interrupts: &mut UnboundedReceiver<()>,
    view: &mut TerminalView,
) -> AppResult<()> {
    view.render(controller.state());
    while controller.is_busy() {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => controller.apply(event),
                None => break,
            },
            Some(()) = interrupts.recv() => {
                println!("\n{} 用户中断，正在取消任务…", *symbols::WARN);
                controller.cancel();
            }
        }
        view.render(controller.state());
    }
    Ok(())
}

async fn handle_search_mode(
    args: &Cli,
    query: &str,
    controller: &mut SessionController,
    events: &mut UnboundedReceiver<UiEvent>,
    interrupts: &mut UnboundedReceiver<()>,
    view: &mut TerminalView,
) -> AppResult<()> {
    controller.search(query)?;
    drive_until_idle(controller, events, interrupts, view).await?;
    outcome(controller)?;
    ui::print_results(controller.state());

    if let Some(pick) = args.pick {
        controller.select(pick)?;
        view.render(controller.state());
        run_action(args.action, None, controller)?;
        drive_until_idle(controller, events, interrupts, view).await?;
        outcome(controller)?;
    }
    Ok(())
}

async fn handle_interactive_mode(
    controller: &mut SessionController,
    events: &mut UnboundedReceiver<UiEvent>,
    interrupts: &mut UnboundedReceiver<()>,
    view: &mut TerminalView,
) -> AppResult<()> {
    ui::print_header(&format!("{} 交互模式", constants::APP_NAME));
    println!(
        "输入 {} 查看指令，空行或 {} 退出。按 {} 取消正在进行的任务。",
        "help".yellow(),
        "quit".yellow(),
        *symbols::CTRL_C
    );
    println!("下载目录: {}", controller.state().download_dir.display());
    ui::print_theme(&controller.state().theme);
    view.render(controller.state());
    ui::print_prompt("指令")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let running = controller.current_kind();
                controller.apply(event);
                view.render(controller.state());
                if running.is_some() && !controller.is_busy() {
                    if running == Some(OperationKind::Search) && !controller.state().results.is_empty() {
                        ui::print_results(controller.state());
                    }
                    ui::print_prompt("指令")?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(SessionCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = dispatch(command, controller) {
                            // 控制器已把原因写入状态行
                            debug!("指令 '{}' 未执行: {}", line.trim(), e);
                        }
                    }
                    Err(msg) => eprintln!("{} {}", *symbols::WARN, msg),
                }
                view.render(controller.state());
                if !controller.is_busy() {
                    ui::print_prompt("指令")?;
                }
            }
            Some(()) = interrupts.recv() => {
                if controller.is_busy() {
                    controller.cancel();
                    view.render(controller.state());
                } else {
                    println!("\n{} 用户中断。", *symbols::WARN);
                    break;
                }
            }
        }
    }

    info!("退出交互模式");
    println!("\n{} 退出交互模式。", *symbols::INFO);
    Ok(())
}

fn dispatch(command: SessionCommand, controller: &mut SessionController) -> AppResult<()> {
    match command {
        SessionCommand::Search(query) => controller.search(&query),
        SessionCommand::Limit(n) => {
            controller.set_limit(n);
            Ok(())
        }
        SessionCommand::List => {
            ui::print_results(controller.state());
            Ok(())
        }
        SessionCommand::Select(n) => controller.select(n),
        SessionCommand::Stream(n) => {
            select_if_given(n, controller)?;
            controller.stream_selected()
        }
        SessionCommand::Download(n) => {
            select_if_given(n, controller)?;
            controller.download_selected()
        }
        SessionCommand::Both(n) => {
            select_if_given(n, controller)?;
            controller.download_and_play_selected()
        }
        SessionCommand::Folder(Some(path)) => controller.choose_folder(&path),
        SessionCommand::Folder(None) => {
            println!(
                "{} 下载目录: {}",
                *symbols::INFO,
                controller.state().download_dir.display()
            );
            Ok(())
        }
        SessionCommand::Background(value) => controller.pick_background_color(&value),
        SessionCommand::Foreground(value) => controller.pick_foreground_color(&value),
        SessionCommand::SaveTheme => controller.save_theme(),
        SessionCommand::ResetTheme => {
            controller.reset_theme();
            Ok(())
        }
        SessionCommand::Cancel => {
            controller.cancel();
            Ok(())
        }
        SessionCommand::Status => {
            println!(
                "{} 任务: {} | 目录: {} | 数量上限: {}",
                *symbols::INFO,
                controller
                    .current_kind()
                    .map_or_else(|| "idle".to_string(), |k| k.to_string()),
                controller.state().download_dir.display(),
                controller.state().limit
            );
            ui::print_theme(&controller.state().theme);
            Ok(())
        }
        SessionCommand::Help => {
            ui::box_message(
                "可用指令",
                constants::HELP_COMMANDS.lines().collect::<Vec<_>>().as_slice(),
                |s| s.cyan(),
            );
            Ok(())
        }
        SessionCommand::Quit => Ok(()),
    }
}

fn select_if_given(index: Option<usize>, controller: &mut SessionController) -> AppResult<()> {
    match index {
        Some(n) if !controller.is_busy() => controller.select(n),
        _ => Ok(()),
    }
}

/// 打印顶层错误
pub fn report_fatal(e: &AppError) {
    error!("程序执行出错: {}", e);
    eprintln!("\n{} {}", *symbols::ERROR, format!("程序执行出错: {}", e).red());
}

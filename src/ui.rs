// src/ui.rs

use crate::{config::theme::ThemeSettings, constants, session::SessionState, symbols};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn print_prompt(message: &str) -> io::Result<()> {
    print!("\n>>> {}: ", message);
    io::stdout().flush()
}

/// 用当前配色渲染一段文字
pub fn paint(text: &str, theme: &ThemeSettings) -> ColoredString {
    let (fr, fg, fb) = theme.fg.rgb();
    let (br, bg, bb) = theme.bg.rgb();
    text.truecolor(fr, fg, fb).on_truecolor(br, bg, bb)
}

pub fn print_results(state: &SessionState) {
    if state.results.is_empty() {
        println!("{} {}", *symbols::INFO, paint("No results.", &state.theme));
        return;
    }
    print_sub_header(&format!("{} result(s)", state.results.len()));
    let pad = state.results.len().to_string().len();
    for (i, line) in state.result_lines().iter().enumerate() {
        let marker = if state.selected == Some(i) { ">" } else { " " };
        println!(
            "{}[{}] {}",
            marker,
            format!("{:<pad$}", i + 1, pad = pad).yellow(),
            paint(line, &state.theme)
        );
    }
}

pub fn print_theme(theme: &ThemeSettings) {
    println!(
        "  bg {}  fg {}  {}",
        theme.bg,
        theme.fg,
        paint(" Sample text ", theme)
    );
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn percent_bar() -> ProgressBar {
    let pb = ProgressBar::new(1000);
    pb.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// 终端上的忙碌指示和状态行。
///
/// 忙碌时显示转圈或百分比进度条，下载进度只刷新进度条；
/// 其他状态变化逐行打印。
#[derive(Default)]
pub struct TerminalView {
    indicator: Option<ProgressBar>,
    showing_percent: bool,
    last_printed: String,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_status(&mut self, state: &SessionState) {
        let symbol = if state.busy {
            &*symbols::BUSY
        } else if state.last_failure.as_deref() == Some(state.status.as_str()) {
            &*symbols::ERROR
        } else {
            &*symbols::INFO
        };
        let line = format!("{} {}", symbol, paint(&state.status, &state.theme));
        match &self.indicator {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
        self.last_printed = state.status.clone();
    }

    pub fn render(&mut self, state: &SessionState) {
        if !state.busy {
            if let Some(pb) = self.indicator.take() {
                pb.finish_and_clear();
            }
            self.showing_percent = false;
            if state.status != self.last_printed {
                self.print_status(state);
            }
            return;
        }

        let wants_percent = state.progress.is_some();
        if self.indicator.is_none() || wants_percent != self.showing_percent {
            if let Some(pb) = self.indicator.take() {
                pb.finish_and_clear();
            }
            self.indicator = Some(if wants_percent { percent_bar() } else { spinner() });
            self.showing_percent = wants_percent;
        }
        if let Some(pb) = &self.indicator {
            if let Some(percent) = state.progress {
                pb.set_position((percent * 10.0) as u64);
            }
            pb.set_message(state.status.clone());
        }
        // 下载百分比的刷新只更新进度条，其余状态变化打印出来
        if !wants_percent && state.status != self.last_printed {
            self.print_status(state);
        }
    }
}

// src/session/mod.rs

mod command;
mod controller;
mod state;
mod task;

pub use command::{SessionCommand, parse_command};
pub use controller::SessionController;
pub use state::SessionState;
pub use task::{Operation, OperationKind};

use crate::models::{DownloadProgressEvent, SearchResult};
use tokio::sync::mpsc;

/// 后台任务发回 UI 循环的事件。所有状态修改都在 UI 循环里完成。
#[derive(Debug)]
pub enum UiEvent {
    Status(String),
    Failed(String),
    Progress(DownloadProgressEvent),
    SearchCompleted { results: Vec<SearchResult> },
    SearchFailed { message: String },
    OperationFinished { id: u64 },
}

/// 后台任务持有的发送端；UI 已退出时静默丢弃事件。
#[derive(Clone, Debug)]
pub struct UiSender {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("UI 已关闭，丢弃事件");
        }
    }

    pub fn status(&self, message: impl Into<String>) {
        self.send(UiEvent::Status(message.into()));
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.send(UiEvent::Failed(message.into()));
    }
}

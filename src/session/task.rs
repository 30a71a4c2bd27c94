// src/session/task.rs

use super::{UiEvent, UiSender};
use crate::error::*;
use anyhow::anyhow;
use log::{debug, info};
use std::{fmt, future::Future};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Search,
    Stream,
    Download,
    DownloadAndPlay,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Search => "Search",
            OperationKind::Stream => "Stream",
            OperationKind::Download => "Download",
            OperationKind::DownloadAndPlay => "Download + play",
        })
    }
}

/// 一个在后台运行、可取消、可等待的用户操作。
///
/// 无论正常结束、失败还是被取消，结束时都会发送 `OperationFinished`，
/// UI 据此恢复空闲状态。
pub struct Operation {
    id: u64,
    kind: OperationKind,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Operation {
    pub fn spawn<F>(id: u64, kind: OperationKind, ui: UiSender, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        debug!("启动任务 #{} ({})", id, kind);
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    // work 在此处被丢弃，其中的子进程随之被终止
                    info!("任务 #{} ({}) 已取消", id, kind);
                    ui.fail(format!("{} cancelled.", kind));
                }
                _ = work => {}
            }
            ui.send(UiEvent::OperationFinished { id });
        });
        Self {
            id,
            kind,
            cancel,
            handle,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) -> AppResult<()> {
        let id = self.id;
        self.handle
            .await
            .map_err(|e| AppError::Other(anyhow!("任务 #{} 异常结束: {}", id, e)))
    }
}

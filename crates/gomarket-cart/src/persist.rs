//! # Persist Writer
//!
//! A single background task that mirrors cart snapshots into storage in the
//! exact order the mutations happened.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ordered Persistence                              │
//! │                                                                         │
//! │  CartStore (holding the cart lock)                                     │
//! │       │                                                                 │
//! │       │  PersistHandle::enqueue(snapshot)   never blocks, never fails  │
//! │       ▼                                     the caller                 │
//! │  ┌─────────────────────────────────────┐                               │
//! │  │ mpsc::unbounded  (FIFO)             │                               │
//! │  │  Write#1  Write#2  Flush  Write#3   │                               │
//! │  └──────────────────┬──────────────────┘                               │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  ┌─────────────────────────────────────┐                               │
//! │  │ PersistWriter task (one per store)  │                               │
//! │  │  encode ─► storage.set(key, json)   │  one write in flight at a time│
//! │  │  failure ─► error! log, move on     │                               │
//! │  └─────────────────────────────────────┘                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Since snapshots are taken after the in-memory update and enqueued before
//! the lock is released, queue order is mutation order, and a slow early
//! write can never land after a later one.

use std::sync::Arc;

use gomarket_core::{snapshot, LineItem};
use gomarket_db::StorageBackend;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::{CartError, CartResult};

/// Commands for the writer.
#[derive(Debug)]
enum PersistCommand {
    /// Store this snapshot, replacing the previous one.
    Write(Vec<LineItem>),
    /// Reply once every earlier command has been handled.
    Flush(oneshot::Sender<()>),
    /// Reply and stop once every earlier command has been handled.
    Shutdown(oneshot::Sender<()>),
}

/// Handle for feeding the writer.
#[derive(Debug, Clone)]
pub(crate) struct PersistHandle {
    cmd_tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistHandle {
    /// Queues a snapshot for writing.
    pub(crate) fn enqueue(&self, items: Vec<LineItem>) -> CartResult<()> {
        self.cmd_tx
            .send(PersistCommand::Write(items))
            .map_err(|_| CartError::WriterClosed)
    }

    /// Waits until every snapshot queued before this call has been written
    /// (or has failed and been logged).
    pub(crate) async fn flush(&self) -> CartResult<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(PersistCommand::Flush(tx))
            .map_err(|_| CartError::WriterClosed)?;
        rx.await.map_err(|_| CartError::WriterClosed)
    }

    /// Drains the queue and stops the writer.
    pub(crate) async fn shutdown(&self) -> CartResult<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(PersistCommand::Shutdown(tx))
            .map_err(|_| CartError::WriterClosed)?;
        rx.await.map_err(|_| CartError::WriterClosed)
    }

    /// Returns true once the writer task has stopped.
    pub(crate) fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }
}

/// The writer task state.
pub(crate) struct PersistWriter {
    storage: Arc<dyn StorageBackend>,
    key: String,
}

impl PersistWriter {
    pub(crate) fn new(storage: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        PersistWriter {
            storage,
            key: key.into(),
        }
    }

    /// Spawns the writer and returns its handle.
    pub(crate) fn start(self) -> PersistHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        PersistHandle { cmd_tx }
    }

    async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<PersistCommand>) {
        info!(key = %self.key, "Cart persist writer started");

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                PersistCommand::Write(items) => self.write(&items).await,
                PersistCommand::Flush(reply) => {
                    let _ = reply.send(());
                }
                PersistCommand::Shutdown(reply) => {
                    info!(key = %self.key, "Cart persist writer shutting down");
                    cmd_rx.close();
                    let _ = reply.send(());
                    return;
                }
            }
        }

        info!(key = %self.key, "Cart persist writer stopped (store dropped)");
    }

    async fn write(&self, items: &[LineItem]) {
        let text = match snapshot::encode(items) {
            Ok(text) => text,
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        match self.storage.set(&self.key, &text).await {
            Ok(()) => debug!(key = %self.key, items = items.len(), "Cart snapshot persisted"),
            Err(e) => error!(key = %self.key, error = %e, "Failed to persist cart snapshot"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

use crate::draft::{EvaluationKind, Question};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The plain data handed to the preview consumer after a quiescence window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSnapshot {
    pub title: String,
    pub description: String,
    pub kind: EvaluationKind,
    pub time_limit_minutes: u32,
    pub total_score: i64,
    pub questions: Vec<Question>,
}

/// Debounced delivery of preview snapshots.
///
/// Each [`schedule`](Self::schedule) call cancels the pending delayed task
/// and starts a fresh one; only a task that survives the full window
/// uncancelled delivers its snapshot. At most one task is pending at a time,
/// so a burst of edits produces exactly one notification, carrying the state
/// as of the last edit.
pub struct PreviewNotifier {
    window: Duration,
    tx: mpsc::UnboundedSender<PreviewSnapshot>,
    pending: Option<JoinHandle<()>>,
}

impl PreviewNotifier {
    /// Create a notifier and the receiving end the preview consumer reads
    /// from.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<PreviewSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                tx,
                pending: None,
            },
            rx,
        )
    }

    /// (Re)start the debounce window with a fresh snapshot.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, snapshot: PreviewSnapshot) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let tx = self.tx.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver gone means the preview consumer shut down; nothing to do.
            let _ = tx.send(snapshot);
        }));
    }
}

impl Drop for PreviewNotifier {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

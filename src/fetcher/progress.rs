//! Progress events emitted by a fetch session.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::Stream;

/// Pages processed so far out of the total page count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Sending half, owned by the session.
#[derive(Clone, Debug, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<Progress>>,
}

impl ProgressSink {
    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn report(&self, current: u32, total: u32) {
        if let Some(tx) = &self.tx {
            // The receiver may have been dropped; progress is optional.
            let _ = tx.unbounded_send(Progress { current, total });
        }
    }
}

/// Lazy, finite stream of [`Progress`] events.
///
/// The stream ends once the session that produced it has finished (or was
/// dropped). It cannot be restarted.
#[derive(Debug)]
pub struct ProgressStream {
    rx: UnboundedReceiver<Progress>,
}

impl Stream for ProgressStream {
    type Item = Progress;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

pub fn progress_channel() -> (ProgressSink, ProgressStream) {
    let (tx, rx) = mpsc::unbounded();
    (ProgressSink { tx: Some(tx) }, ProgressStream { rx })
}

//! Run-level cancellation.
//!
//! A [`StopHandle`] is held by whoever may end a run early (the keyboard
//! listener, a test). Every [`StopSignal`] cloned from it observes the request.
//! A signal can additionally carry a deadline after which it reports stopped on
//! its own.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl StopHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
            deadline: None,
        }
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    /// A signal nobody can trigger.
    pub fn never() -> Self {
        StopHandle::new().signal()
    }

    pub fn with_deadline(mut self, after: Duration) -> Self {
        self.deadline = Some(Instant::now() + after);
        self
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once a stop was requested or the deadline passed.
    pub async fn stopped(&mut self) {
        let deadline = self.deadline;
        let requested = async {
            // Sender gone without ever stopping: nothing can stop us anymore.
            if self.rx.wait_for(|stop| *stop).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = requested => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => requested.await,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

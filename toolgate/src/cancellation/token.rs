//! Cooperative cancellation for a chat request.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

type CancelCallback = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
    callbacks: RwLock<Vec<CancelCallback>>,
    notify: Notify,
}

/// A shareable cancellation token.
///
/// Clones observe the same state. Only the first cancellation reason is kept.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Callbacks run on the first call only; a panicking callback is logged
    /// and the remaining ones still run.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .inner
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let reason = reason.into();
        debug!(reason = %reason, "Cancellation requested");
        *self.inner.reason.write() = Some(reason.clone());
        self.inner.notify.notify_waiters();

        // the reason is visible before the list is drained, so a concurrent
        // on_cancel either lands in the list or sees the reason
        let callbacks = std::mem::take(&mut *self.inner.callbacks.write());
        for callback in &callbacks {
            run_callback(callback.as_ref(), &reason);
        }
    }

    /// Registers a callback that receives the cancellation reason.
    ///
    /// Runs immediately if the token is already cancelled.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut callbacks = self.inner.callbacks.write();
        match self.reason() {
            Some(reason) => {
                drop(callbacks);
                run_callback(&callback, &reason);
            }
            None => callbacks.push(Box::new(callback)),
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.inner.reason.read().clone()
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

fn run_callback(callback: &(dyn Fn(&str) + Send + Sync), reason: &str) {
    if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(reason))) {
        warn!("Cancellation callback panicked: {:?}", e);
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

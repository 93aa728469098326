//! Change feed subscriptions.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::schedule::ScheduleDocument;

/// Invoked once per remote update with the full replacement document.
pub type ChangeCallback = Box<dyn Fn(ScheduleDocument) + Send + Sync>;

#[derive(Default)]
struct Shared {
    callback: Mutex<Option<ChangeCallback>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a running change feed. Dropping it unsubscribes.
pub struct Subscription {
    shared: Arc<Shared>,
}

/// Feed-side end of a [`Subscription`], used by the task delivering updates.
#[derive(Clone)]
pub struct ChangeSink {
    shared: Arc<Shared>,
}

impl Subscription {
    pub fn new(callback: ChangeCallback) -> (Self, ChangeSink) {
        let shared = Arc::new(Shared {
            callback: Mutex::new(Some(callback)),
            task: Mutex::new(None),
        });
        let sink = ChangeSink {
            shared: shared.clone(),
        };
        (Subscription { shared }, sink)
    }

    /// A subscription that never delivers anything.
    pub fn inert() -> Self {
        Subscription {
            shared: Arc::new(Shared::default()),
        }
    }

    /// Tie the feed task's lifetime to this subscription.
    pub fn attach(&self, task: JoinHandle<()>) {
        if !self.is_active() {
            task.abort();
            return;
        }
        let mut slot = self.shared.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop the feed. Safe to call any number of times; once it returns the
    /// callback will not run again, even for updates already in flight.
    ///
    /// Must not be called from inside the callback.
    pub fn unsubscribe(&self) {
        self.shared
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let task = self
            .shared
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl ChangeSink {
    /// Run the callback with `doc`. Returns false once unsubscribed.
    pub fn deliver(&self, doc: ScheduleDocument) -> bool {
        let callback = self
            .shared
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match callback.as_ref() {
            Some(on_change) => {
                on_change(doc);
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

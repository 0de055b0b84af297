//! Locale-change listeners.

use crate::locale::LocaleId;
use localengine_log::{debug, error};
use parking_lot::Mutex;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result returned by a listener.
pub type CallbackResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Listener invoked with `(old_locale, new_locale)` after a locale switch.
pub type LocaleChangeCallback = dyn Fn(Option<&LocaleId>, &LocaleId) -> CallbackResult + Send + Sync;

/// Opaque registration handle returned by [`CallbackDispatcher::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u64);

/// Registry of locale-change listeners.
///
/// Dispatch iterates over a snapshot of the registrations, so listeners may
/// add or remove listeners (or call back into the engine) while being
/// notified. A listener that returns an error or panics is logged and the
/// remaining listeners still run.
#[derive(Default)]
pub struct CallbackDispatcher {
    listeners: Mutex<Vec<(CallbackHandle, Arc<LocaleChangeCallback>)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for CallbackDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackDispatcher")
            .field("listeners", &self.len())
            .finish_non_exhaustive()
    }
}

impl CallbackDispatcher {
    /// Create a dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(Option<&LocaleId>, &LocaleId) -> CallbackResult + Send + Sync + 'static,
    {
        let handle = CallbackHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((handle, Arc::new(callback)));
        handle
    }

    /// Unregister a listener. Returns `false` if the handle is unknown.
    pub fn remove(&self, handle: CallbackHandle) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(h, _)| *h != handle);
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    /// Notify every listener registered at the time of the call.
    ///
    /// Returns the number of listeners that failed.
    pub fn dispatch(&self, old: Option<&LocaleId>, new: &LocaleId) -> usize {
        let snapshot: Vec<_> = self.listeners.lock().clone();
        debug!(
            "Dispatching locale change {:?} -> {} to {} listeners",
            old.map(LocaleId::as_str),
            new,
            snapshot.len()
        );

        let mut failures = 0;
        for (handle, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(old, new))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    error!("Locale change listener {} failed: {}", handle.0, e);
                }
                Err(_) => {
                    failures += 1;
                    error!("Locale change listener {} panicked", handle.0);
                }
            }
        }
        failures
    }
}

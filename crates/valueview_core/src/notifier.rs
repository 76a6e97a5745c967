//! Notifier - synchronous keyed notifications
//!
//! An expert holds a [`Notifier`] to tell its owning view that something
//! changed. `notify` invokes the handler registered for the key right away,
//! on the caller's stack. The key being dispatched is handed to the handler
//! inside the [`Notification`] instead of being kept as shared state.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use valueview_core::notifier::{keys, Notifier};
//!
//! let hits = Rc::new(Cell::new(0));
//! let counter = hits.clone();
//! let notifier = Notifier::builder()
//!     .on(keys::CHANGE, move |n| {
//!         assert_eq!(n.key, keys::CHANGE);
//!         counter.set(counter.get() + 1);
//!     })
//!     .build();
//!
//! assert!(notifier.notify(keys::CHANGE, &[]));
//! assert!(!notifier.notify("unknown", &[]));
//! assert_eq!(hits.get(), 1);
//! ```

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::Value as Json;

/// Notification keys
pub mod keys {
    /// The expert's raw value or value characteristics changed
    pub const CHANGE: &str = "change";
}

/// A notification being dispatched
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a> {
    /// The key the handler was invoked for
    pub key: &'a str,
    /// Extra arguments passed to `notify`
    pub args: &'a [Json],
}

/// Handler invoked for a notification key
pub type NotificationHandler = Rc<dyn Fn(&Notification<'_>)>;

/// Synchronous, keyed pub/sub with one handler per key
#[derive(Clone, Default)]
pub struct Notifier {
    handlers: Rc<FxHashMap<String, NotificationHandler>>,
}

impl Notifier {
    /// Create a notifier from a handler map
    pub fn new<I, K>(handlers: I) -> Self
    where
        I: IntoIterator<Item = (K, NotificationHandler)>,
        K: Into<String>,
    {
        Self {
            handlers: Rc::new(
                handlers
                    .into_iter()
                    .map(|(key, handler)| (key.into(), handler))
                    .collect(),
            ),
        }
    }

    /// A notifier without handlers; every notification is a no-op
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::default()
    }

    /// Invoke the handler registered for `key`
    ///
    /// Returns whether a handler ran.
    pub fn notify(&self, key: &str, args: &[Json]) -> bool {
        let Some(handler) = self.handlers.get(key) else {
            return false;
        };
        handler(&Notification { key, args });
        true
    }

    pub fn has_handler(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Notifier`]
#[derive(Default)]
pub struct NotifierBuilder {
    handlers: FxHashMap<String, NotificationHandler>,
}

impl NotifierBuilder {
    /// Register the handler for `key`, replacing an earlier one
    pub fn on<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Notification<'_>) + 'static,
    {
        self.handlers.insert(key.into(), Rc::new(handler));
        self
    }

    pub fn build(self) -> Notifier {
        Notifier {
            handlers: Rc::new(self.handlers),
        }
    }
}

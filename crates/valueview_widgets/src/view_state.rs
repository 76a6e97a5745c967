//! ViewState - read-only projection of a value view
//!
//! Experts and extensions never see the view itself. They get a
//! [`ViewState`], which reads through to the live view on every call and
//! offers no way to mutate it. Experts write back only by notifying.

use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value as Json;
use valueview_core::DataValue;

/// State a view exposes to its experts
pub trait ViewStateSource {
    fn is_in_edit_mode(&self) -> bool;
    fn is_disabled(&self) -> bool;
    fn value(&self) -> Option<DataValue>;
    /// HTML formatted value, empty while unknown
    fn formatted_value(&self) -> String;
    /// Plain-text representation, empty while unknown
    fn text_value(&self) -> String;
    /// Whether a parse or format for the current input is still running
    fn is_pending(&self) -> bool;
    /// A view option by key
    fn option(&self, key: &str) -> Option<Json>;
}

/// Read-through handle to a view's state
///
/// Holds the view weakly; once the view is gone the state reads as static,
/// enabled and empty.
#[derive(Clone)]
pub struct ViewState {
    source: Weak<dyn ViewStateSource>,
}

impl ViewState {
    pub fn new(source: Weak<dyn ViewStateSource>) -> Self {
        Self { source }
    }

    /// Build from any strong source handle
    pub fn from_source<S: ViewStateSource + 'static>(source: &Rc<S>) -> Self {
        let source: Rc<dyn ViewStateSource> = source.clone();
        Self::new(Rc::downgrade(&source))
    }

    fn read<T>(&self, f: impl FnOnce(&dyn ViewStateSource) -> T, fallback: T) -> T {
        match self.source.upgrade() {
            Some(source) => f(source.as_ref()),
            None => fallback,
        }
    }

    pub fn is_in_edit_mode(&self) -> bool {
        self.read(|s| s.is_in_edit_mode(), false)
    }

    pub fn is_disabled(&self) -> bool {
        self.read(|s| s.is_disabled(), false)
    }

    pub fn value(&self) -> Option<DataValue> {
        self.read(|s| s.value(), None)
    }

    pub fn formatted_value(&self) -> String {
        self.read(|s| s.formatted_value(), String::new())
    }

    pub fn text_value(&self) -> String {
        self.read(|s| s.text_value(), String::new())
    }

    pub fn is_pending(&self) -> bool {
        self.read(|s| s.is_pending(), false)
    }

    pub fn option(&self, key: &str) -> Option<Json> {
        self.read(|s| s.option(key), None)
    }

    /// String-valued option
    pub fn option_str(&self, key: &str) -> Option<String> {
        self.option(key)
            .and_then(|value| value.as_str().map(str::to_string))
    }
}

impl fmt::Debug for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewState")
            .field("attached", &(self.source.strong_count() > 0))
            .finish()
    }
}

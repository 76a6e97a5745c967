//! Message provider
//!
//! Resolves a message key to display text. An injected getter (the host's
//! localisation lookup) wins when it knows the key; otherwise the registered
//! default is used with positional parameters substituted.

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::trace;

use crate::error::{Error, Result};

/// Host lookup: `(key, params) -> text`
pub type MessageGetter = Box<dyn Fn(&str, &[&str]) -> Option<String>>;

const BUILTIN_MESSAGES: &str = include_str!("messages.toml");

#[derive(Deserialize)]
struct MessageTable {
    messages: FxHashMap<String, String>,
}

/// Message key → text with defaults
#[derive(Default)]
pub struct MessageProvider {
    getter: Option<MessageGetter>,
    defaults: RefCell<FxHashMap<String, String>>,
}

impl MessageProvider {
    /// Create a provider with the given defaults and no getter
    pub fn new(defaults: FxHashMap<String, String>) -> Self {
        Self {
            getter: None,
            defaults: RefCell::new(defaults),
        }
    }

    /// Create a provider with the built-in English defaults
    pub fn with_builtin_defaults() -> Result<Self> {
        Ok(Self::new(builtin_messages()?))
    }

    /// Attach the host's message lookup
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&str, &[&str]) -> Option<String> + 'static,
    {
        self.getter = Some(Box::new(getter));
        self
    }

    /// Replace the default messages
    pub fn set_default_messages(&self, defaults: FxHashMap<String, String>) {
        *self.defaults.borrow_mut() = defaults;
    }

    /// Resolve `key`, substituting `$1…$n` with `params`
    pub fn get_message(&self, key: &str, params: &[&str]) -> Option<String> {
        if let Some(getter) = &self.getter {
            if let Some(message) = getter(key, params).filter(|m| !m.is_empty()) {
                return Some(message);
            }
        }

        let message = self
            .defaults
            .borrow()
            .get(key)
            .map(|template| substitute(template, params));
        if message.is_none() {
            trace!(key, "no message for key");
        }
        message
    }
}

impl fmt::Debug for MessageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageProvider")
            .field("has_getter", &self.getter.is_some())
            .field("defaults", &self.defaults.borrow().len())
            .finish()
    }
}

/// The built-in default message table
pub fn builtin_messages() -> Result<FxHashMap<String, String>> {
    toml::from_str::<MessageTable>(BUILTIN_MESSAGES)
        .map(|table| table.messages)
        .map_err(|e| Error::Messages(e.to_string()))
}

/// Fill `$n` placeholders; parameters without a placeholder are appended
fn substitute(template: &str, params: &[&str]) -> String {
    let mut message = template.to_string();
    let mut appended = Vec::new();

    // Highest index first so "$1" does not eat the prefix of "$10".
    for (index, param) in params.iter().enumerate().rev() {
        let placeholder = format!("${}", index + 1);
        if message.contains(&placeholder) {
            message = message.replace(&placeholder, param);
        } else {
            appended.push(*param);
        }
    }

    for param in appended.into_iter().rev() {
        message.push(' ');
        message.push_str(param);
    }
    message
}

//! Experts - pluggable display/edit handlers for one kind of value
//!
//! An expert knows how to show and edit one data value type (or one data
//! type). Concrete experts implement [`Expert`]; the lifecycle rules every
//! expert shares live in [`ExpertInstance`]:
//!
//! ```text
//! Constructed --init()--> Initialized --draw()*--> ... --destroy()--> Destroyed
//! ```
//!
//! - `init` runs exactly once and tags the view port with [`EXPERT_CLASS`]
//! - `draw` may run any number of times and must be idempotent
//! - `destroy` is idempotent and always leaves the view port empty
//!
//! Experts are built through an [`ExpertConstructor`], a named factory that
//! the [`ExpertStore`](crate::store::ExpertStore) maps value types to.

use std::fmt;
use std::rc::Rc;

use tracing::debug;
use valueview_core::notifier::keys;
use valueview_core::{
    DataValue, Error, MessageProvider, Notifier, Result, ValueCharacteristics, ViewPort,
};

use crate::extension::ExtensionContext;
use crate::view_state::ViewState;

/// Class added to a view port when an expert initializes on it
pub const EXPERT_CLASS: &str = "valueview-expert";

/// What an expert currently holds as the user's input
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawValue {
    /// No value
    #[default]
    Empty,
    /// Text still to be parsed
    Text(String),
    /// An already typed value; bypasses parsing
    Value(DataValue),
}

impl RawValue {
    /// Text input, with the empty string meaning "no value"
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(text)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Options handed from a view to its experts
#[derive(Clone, Debug)]
pub struct ExpertOptions {
    pub message_provider: Rc<MessageProvider>,
    /// User interface language
    pub language: Option<String>,
    /// Languages offered by language pickers
    pub content_languages: Vec<String>,
}

impl Default for ExpertOptions {
    fn default() -> Self {
        Self {
            message_provider: Rc::new(MessageProvider::default()),
            language: None,
            content_languages: Vec::new(),
        }
    }
}

/// Everything an expert is bound to for its lifetime
#[derive(Clone, Debug)]
pub struct ExpertArgs {
    pub view_port: ViewPort,
    pub view_state: ViewState,
    pub notifier: Notifier,
    pub options: ExpertOptions,
}

/// Shared state every expert carries
#[derive(Clone, Debug)]
pub struct ExpertBase {
    view_port: ViewPort,
    view_state: ViewState,
    notifier: Notifier,
    options: ExpertOptions,
}

impl ExpertBase {
    pub fn new(args: ExpertArgs) -> Self {
        Self {
            view_port: args.view_port,
            view_state: args.view_state,
            notifier: args.notifier,
            options: args.options,
        }
    }

    pub fn view_port(&self) -> &ViewPort {
        &self.view_port
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn options(&self) -> &ExpertOptions {
        &self.options
    }

    /// Arguments for a nested expert sharing this one's bindings
    pub fn args(&self) -> ExpertArgs {
        ExpertArgs {
            view_port: self.view_port.clone(),
            view_state: self.view_state.clone(),
            notifier: self.notifier.clone(),
            options: self.options.clone(),
        }
    }

    pub fn extension_context(&self) -> ExtensionContext<'_> {
        ExtensionContext {
            view_state: &self.view_state,
            notifier: &self.notifier,
            options: &self.options,
        }
    }

    /// Tell the owning view that the raw value or characteristics changed
    pub fn notify_change(&self) {
        self.notifier.notify(keys::CHANGE, &[]);
    }

    /// Resolve a message, falling back to the key itself
    pub fn message(&self, key: &str, params: &[&str]) -> String {
        self.options
            .message_provider
            .get_message(key, params)
            .unwrap_or_else(|| key.to_string())
    }
}

/// Display and edit behaviour for one kind of value
pub trait Expert {
    /// Expert-specific initialisation, called once by [`ExpertInstance::init`]
    fn init(&mut self) {}

    /// Render the current view state; must be idempotent
    fn draw(&mut self);

    /// Release widgets and listeners; the view port is emptied afterwards
    fn destroy(&mut self) {}

    /// The user's current input
    fn raw_value(&self) -> RawValue;

    /// Replace the input, e.g. when a composite expert swaps delegates
    fn set_raw_value(&mut self, _raw: RawValue) {}

    /// Extra parser options derived from UI selections
    fn value_characteristics(&self) -> ValueCharacteristics {
        ValueCharacteristics::new()
    }

    fn focus(&mut self) {}

    fn blur(&mut self) {}

    /// Show a parse/format failure; returns false without a place to show it
    fn show_error(&mut self, _message: &str) -> bool {
        false
    }
}

/// Factory signature behind an [`ExpertConstructor`]
pub type ConstructFn = fn(ExpertArgs) -> Box<dyn Expert>;

/// A named expert factory
///
/// Two constructors are the same if they have the same name.
#[derive(Clone, Copy)]
pub struct ExpertConstructor {
    name: &'static str,
    construct: ConstructFn,
}

impl ExpertConstructor {
    pub const fn new(name: &'static str, construct: ConstructFn) -> Self {
        Self { name, construct }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build an expert bound to `args`
    pub fn instantiate(&self, args: ExpertArgs) -> ExpertInstance {
        let view_port = args.view_port.clone();
        ExpertInstance {
            constructor: *self,
            expert: Some((self.construct)(args)),
            view_port,
            phase: Lifecycle::Constructed,
        }
    }
}

impl PartialEq for ExpertConstructor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ExpertConstructor {}

impl fmt::Debug for ExpertConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExpertConstructor").field(&self.name).finish()
    }
}

/// Lifecycle phase of an expert instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Constructed,
    Initialized,
    Destroyed,
}

impl Lifecycle {
    fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Constructed => "constructed",
            Lifecycle::Initialized => "initialized",
            Lifecycle::Destroyed => "destroyed",
        }
    }
}

/// A live expert together with its lifecycle bookkeeping
pub struct ExpertInstance {
    constructor: ExpertConstructor,
    expert: Option<Box<dyn Expert>>,
    view_port: ViewPort,
    phase: Lifecycle,
}

impl ExpertInstance {
    pub fn constructor(&self) -> ExpertConstructor {
        self.constructor
    }

    pub fn name(&self) -> &'static str {
        self.constructor.name
    }

    pub fn phase(&self) -> Lifecycle {
        self.phase
    }

    pub fn view_port(&self) -> &ViewPort {
        &self.view_port
    }

    fn lifecycle_error(&self, operation: &'static str) -> Error {
        Error::Lifecycle {
            expert: self.name(),
            operation,
            phase: self.phase.as_str(),
        }
    }

    /// Initialise once
    pub fn init(&mut self) -> Result<()> {
        if self.phase != Lifecycle::Constructed {
            return Err(self.lifecycle_error("init"));
        }
        let Some(expert) = self.expert.as_mut() else {
            return Err(self.lifecycle_error("init"));
        };
        self.view_port.add_class(EXPERT_CLASS);
        expert.init();
        self.phase = Lifecycle::Initialized;
        debug!(expert = self.constructor.name, "expert initialized");
        Ok(())
    }

    /// Render; only valid between `init` and `destroy`
    pub fn draw(&mut self) -> Result<()> {
        if self.phase != Lifecycle::Initialized {
            return Err(self.lifecycle_error("draw"));
        }
        if let Some(expert) = self.expert.as_mut() {
            expert.draw();
        }
        Ok(())
    }

    /// Tear down; a second call does nothing
    pub fn destroy(&mut self) {
        if self.phase == Lifecycle::Destroyed {
            return;
        }
        if let Some(mut expert) = self.expert.take() {
            expert.destroy();
        }
        self.view_port.empty();
        self.phase = Lifecycle::Destroyed;
        debug!(expert = self.constructor.name, "expert destroyed");
    }

    pub fn raw_value(&self) -> RawValue {
        self.expert
            .as_ref()
            .map(|e| e.raw_value())
            .unwrap_or_default()
    }

    pub fn set_raw_value(&mut self, raw: RawValue) {
        if let Some(expert) = self.expert.as_mut() {
            expert.set_raw_value(raw);
        }
    }

    pub fn value_characteristics(&self) -> ValueCharacteristics {
        self.expert
            .as_ref()
            .map(|e| e.value_characteristics())
            .unwrap_or_default()
    }

    pub fn focus(&mut self) {
        if let Some(expert) = self.expert.as_mut() {
            expert.focus();
        }
    }

    pub fn blur(&mut self) {
        if let Some(expert) = self.expert.as_mut() {
            expert.blur();
        }
    }

    pub fn show_error(&mut self, message: &str) -> bool {
        self.expert
            .as_mut()
            .map(|e| e.show_error(message))
            .unwrap_or(false)
    }
}

impl Drop for ExpertInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for ExpertInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpertInstance")
            .field("expert", &self.constructor.name)
            .field("phase", &self.phase)
            .finish()
    }
}

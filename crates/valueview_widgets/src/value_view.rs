//! ValueView - displays a data value and lets the user edit it
//!
//! A value view owns the current [`DataValue`], its formatted forms, the
//! static/edit mode and at most one live expert. It selects the expert from
//! the [`ExpertStore`], hands it a [`ViewState`] and a [`Notifier`], and
//! turns the expert's change notifications into parse/format round trips.
//!
//! # Modes
//!
//! ```text
//!            start_editing()
//!   Static ─────────────────────▶ Editing (expert live)
//!     ▲                              │
//!     └──────────────────────────────┘
//!        stop_editing(drop_value)
//! ```
//!
//! # Async work
//!
//! Parsing and formatting are external services with unbounded latency.
//! They run as local tasks (`tokio::task::spawn_local`), so a view must be
//! used inside a [`tokio::task::LocalSet`]. Out-of-order answers are handled
//! with two guards:
//!
//! - every parse request gets an id; a result is applied only if its id is
//!   still the pending one
//! - a format result is applied only if it was made from the very instance
//!   the view currently holds ([`DataValue::same_instance`])
//!
//! Typed input is debounced by `parse_delay_ms`; a newer change aborts the
//! pending debounce timer.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value as Json;
use smallvec::SmallVec;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use valueview_core::notifier::keys as notification;
use valueview_core::{
    DataValue, MessageProvider, Node, Notifier, ParserStore, PlainFormatter, Result,
    ServiceError, ValueCharacteristics, ValueFormatter, ViewPort,
};

use crate::expert::{
    ExpertArgs, ExpertConstructor, ExpertInstance, ExpertOptions, RawValue, EXPERT_CLASS,
};
use crate::experts::{EmptyValue, UnsupportedValue};
use crate::options::{keys, ValueViewOptions};
use crate::store::ExpertStore;
use crate::view_state::{ViewState, ViewStateSource};

pub const VALUEVIEW_CLASS: &str = "valueview";
pub const STATIC_MODE_CLASS: &str = "valueview-instaticmode";
pub const EDIT_MODE_CLASS: &str = "valueview-ineditmode";
pub const DISABLED_CLASS: &str = "valueview-disabled";

const EMPTY_MESSAGE: &str = "valueview-expert-emptyvalue-empty";

// =============================================================================
// Services and events
// =============================================================================

/// Collaborators fixed for the lifetime of a view
#[derive(Clone)]
pub struct ValueViewServices {
    pub expert_store: Rc<ExpertStore>,
    pub parser_store: Rc<dyn ParserStore>,
    pub html_formatter: Rc<dyn ValueFormatter>,
    pub plaintext_formatter: Rc<dyn ValueFormatter>,
    pub message_provider: Rc<MessageProvider>,
}

impl ValueViewServices {
    /// Services with the plain reference formatters and built-in messages
    pub fn new(expert_store: Rc<ExpertStore>, parser_store: Rc<dyn ParserStore>) -> Self {
        let message_provider = MessageProvider::with_builtin_defaults().unwrap_or_else(|err| {
            warn!(%err, "built-in messages unavailable");
            MessageProvider::default()
        });
        Self {
            expert_store,
            parser_store,
            html_formatter: Rc::new(PlainFormatter::html()),
            plaintext_formatter: Rc::new(PlainFormatter::plaintext()),
            message_provider: Rc::new(message_provider),
        }
    }

    /// Formatter for the static display and the preview
    pub fn html_formatter(mut self, formatter: Rc<dyn ValueFormatter>) -> Self {
        self.html_formatter = formatter;
        self
    }

    /// Formatter for the text put into the expert's input
    pub fn plaintext_formatter(mut self, formatter: Rc<dyn ValueFormatter>) -> Self {
        self.plaintext_formatter = formatter;
        self
    }

    /// Message provider shared with the experts
    pub fn message_provider(mut self, message_provider: Rc<MessageProvider>) -> Self {
        self.message_provider = message_provider;
        self
    }
}

impl fmt::Debug for ValueViewServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueViewServices")
            .field("expert_store", &self.expert_store)
            .finish_non_exhaustive()
    }
}

/// Events a view emits to its host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueViewEvent {
    AfterStartEditing,
    AfterStopEditing { drop_value: bool },
    /// The value changed, by user input or by `set_value`
    Change,
    AfterDraw,
}

type EventListener = Rc<dyn Fn(&ValueViewEvent)>;

// =============================================================================
// Internal state
// =============================================================================

/// Value and renderings saved when editing starts
#[derive(Clone, Debug, Default)]
struct Snapshot {
    value: Option<DataValue>,
    formatted_value: String,
    text_value: String,
}

#[derive(Default)]
struct ViewFields {
    options: ValueViewOptions,
    value: Option<DataValue>,
    formatted_value: String,
    text_value: String,
    /// Type of the last value held, for parser lookup while blank
    last_value_type: Option<String>,
    initial: Option<Snapshot>,
    editing: bool,
    disabled: bool,
    expert_constructor: Option<ExpertConstructor>,

    last_characteristics: ValueCharacteristics,
    last_raw: RawValue,
    request_id: u64,
    pending_request: Option<u64>,
    debounce: Option<JoinHandle<()>>,
    /// Instance the HTML formatter is working on
    formatting: Option<DataValue>,
    /// A change arrived while the expert was busy
    pending_change: bool,
}

impl ViewFields {
    fn data_value_type(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(|value| value.type_tag().to_string())
            .or_else(|| self.options.data_value_type.clone())
            .or_else(|| self.last_value_type.clone())
    }

    /// Drop any parse that has not been applied yet
    ///
    /// Bumping the id also stops a parse whose result is still being
    /// formatted from redrawing or emitting `Change`.
    fn cancel_pending_parse(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        if let Some(id) = self.pending_request.take() {
            trace!(request = id, "pending parse cancelled");
        }
        self.request_id += 1;
    }
}

#[derive(Clone, Copy, Debug)]
enum Rendering {
    Html,
    PlainText,
}

struct ViewInner {
    view_port: ViewPort,
    services: ValueViewServices,
    view_state: ViewState,
    notifier: Notifier,
    state: RefCell<ViewFields>,
    expert: RefCell<Option<ExpertInstance>>,
    listeners: RefCell<SmallVec<[EventListener; 2]>>,
    in_flight: Cell<usize>,
    idle: Notify,
}

/// Counts a unit of async work until dropped
struct InFlight {
    inner: Weak<ViewInner>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let remaining = inner.in_flight.get().saturating_sub(1);
            inner.in_flight.set(remaining);
            if remaining == 0 {
                inner.idle.notify_waiters();
            }
        }
    }
}

impl ViewInner {
    fn track(self: &Rc<Self>) -> InFlight {
        self.in_flight.set(self.in_flight.get() + 1);
        InFlight {
            inner: Rc::downgrade(self),
        }
    }

    fn emit(&self, event: ValueViewEvent) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
    }

    fn message(&self, key: &str) -> String {
        self.services
            .message_provider
            .get_message(key, &[])
            .unwrap_or_else(|| key.to_string())
    }

    // -------------------------------------------------------------------------
    // Expert management
    // -------------------------------------------------------------------------

    fn expert_args(&self) -> ExpertArgs {
        let state = self.state.borrow();
        ExpertArgs {
            view_port: self.view_port.clone(),
            view_state: self.view_state.clone(),
            notifier: self.notifier.clone(),
            options: ExpertOptions {
                message_provider: self.services.message_provider.clone(),
                language: state.options.language.clone(),
                content_languages: state.options.content_languages.clone(),
            },
        }
    }

    /// Constructor for the current value and declared types
    fn lookup_constructor(&self) -> ExpertConstructor {
        let (data_value_type, data_type_id) = {
            let state = self.state.borrow();
            let data_value_type = state
                .value
                .as_ref()
                .map(|value| value.type_tag().to_string())
                .or_else(|| state.options.data_value_type.clone());
            (data_value_type, state.options.data_type_id.clone())
        };
        let data_value_type = data_value_type.filter(|key| !key.is_empty());
        let data_type_id = data_type_id.filter(|key| !key.is_empty());

        if data_value_type.is_none() && data_type_id.is_none() {
            return self
                .services
                .expert_store
                .default_expert()
                .unwrap_or(EmptyValue::CONSTRUCTOR);
        }
        match self
            .services
            .expert_store
            .get_expert(data_value_type.as_deref(), data_type_id.as_deref())
        {
            Ok(Some(constructor)) => constructor,
            Ok(None) => UnsupportedValue::CONSTRUCTOR,
            Err(err) => {
                warn!(%err, "expert lookup failed");
                UnsupportedValue::CONSTRUCTOR
            }
        }
    }

    /// Re-derive the constructor; the live expert is destroyed only if it changed
    fn update_expert_constructor(&self) {
        let constructor = self.lookup_constructor();
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.expert_constructor != Some(constructor);
            state.expert_constructor = Some(constructor);
            changed
        };
        if changed {
            debug!(expert = constructor.name(), "expert constructor changed");
            self.destroy_expert();
        }
    }

    fn destroy_expert(&self) {
        let old = match self.expert.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                warn!("expert busy, cannot destroy it now");
                None
            }
        };
        if let Some(mut old) = old {
            old.destroy();
        }
        let mut state = self.state.borrow_mut();
        state.last_characteristics = ValueCharacteristics::new();
        state.last_raw = RawValue::Empty;
    }

    /// Build and initialise the expert if edit mode has none yet
    fn ensure_expert(self: &Rc<Self>) -> Result<()> {
        if self.expert.try_borrow().map_or(true, |slot| slot.is_some()) {
            return Ok(());
        }
        let constructor = match self.state.borrow().expert_constructor {
            Some(constructor) => constructor,
            None => self.lookup_constructor(),
        };
        self.state.borrow_mut().expert_constructor = Some(constructor);

        let mut expert = constructor.instantiate(self.expert_args());
        expert.init()?;
        let characteristics = expert.value_characteristics();
        let raw = expert.raw_value();
        {
            let mut state = self.state.borrow_mut();
            state.last_characteristics = characteristics;
            state.last_raw = raw;
        }
        if let Ok(mut slot) = self.expert.try_borrow_mut() {
            *slot = Some(expert);
        }
        Ok(())
    }

    /// Run `f` on the live expert, then handle changes it notified meanwhile
    fn with_expert<R>(self: &Rc<Self>, f: impl FnOnce(&mut ExpertInstance) -> R) -> Option<R> {
        let result = match self.expert.try_borrow_mut() {
            Ok(mut slot) => slot.as_mut().map(f),
            Err(_) => None,
        };
        let pending = std::mem::take(&mut self.state.borrow_mut().pending_change);
        if pending {
            self.on_change();
        }
        result
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    fn draw(self: &Rc<Self>) -> Result<()> {
        let (editing, disabled) = {
            let state = self.state.borrow();
            (state.editing, state.disabled)
        };

        let port = &self.view_port;
        if editing {
            port.remove_class(STATIC_MODE_CLASS);
            port.add_class(EDIT_MODE_CLASS);
        } else {
            port.remove_class(EDIT_MODE_CLASS);
            port.add_class(STATIC_MODE_CLASS);
        }
        if disabled {
            port.add_class(DISABLED_CLASS);
        } else {
            port.remove_class(DISABLED_CLASS);
        }

        if editing {
            self.ensure_expert()?;
            self.with_expert(|expert| expert.draw()).transpose()?;
        } else {
            port.remove_class(EXPERT_CLASS);
            let content = {
                let state = self.state.borrow();
                match state.value {
                    Some(_) => Node::Html(state.formatted_value.clone()),
                    None => Node::Text(self.message(EMPTY_MESSAGE)),
                }
            };
            port.set_content(vec![content]);
        }

        self.emit(ValueViewEvent::AfterDraw);
        Ok(())
    }

    /// Draw, logging instead of failing; used from background tasks
    fn redraw(self: &Rc<Self>) {
        if let Err(err) = self.draw() {
            warn!(%err, "redraw failed");
        }
    }

    // -------------------------------------------------------------------------
    // Change propagation
    // -------------------------------------------------------------------------

    fn on_change(self: &Rc<Self>) {
        let (characteristics, raw) = {
            let Ok(slot) = self.expert.try_borrow() else {
                self.state.borrow_mut().pending_change = true;
                return;
            };
            let Some(expert) = slot.as_ref() else {
                return;
            };
            (expert.value_characteristics(), expert.raw_value())
        };

        {
            let mut state = self.state.borrow_mut();
            if !characteristics.differs_from(&state.last_characteristics) && raw == state.last_raw {
                trace!("change without effect ignored");
                return;
            }
            state.last_characteristics = characteristics.clone();
            state.last_raw = raw.clone();
        }
        self.update_value(raw, characteristics);
    }

    fn update_value(self: &Rc<Self>, raw: RawValue, characteristics: ValueCharacteristics) {
        let (id, delay, data_value_type, data_type_id) = {
            let mut state = self.state.borrow_mut();
            let data_value_type = state.data_value_type();

            // The view is blank until the new input is parsed.
            state.value = None;
            state.formatted_value.clear();
            state.text_value.clear();
            state.formatting = None;

            state.cancel_pending_parse();
            state.request_id += 1;
            let id = state.request_id;
            state.pending_request = Some(id);
            (
                id,
                state.options.parse_delay(),
                data_value_type,
                state.options.data_type_id.clone(),
            )
        };
        trace!(request = id, "parse requested");

        let inner = Rc::clone(self);
        let guard = self.track();
        match raw {
            RawValue::Text(text) => {
                let parser = self
                    .services
                    .parser_store
                    .get_parser(data_value_type.as_deref(), data_type_id.as_deref());
                let handle = tokio::task::spawn_local(async move {
                    let _guard = guard;
                    tokio::time::sleep(delay).await;
                    {
                        // Past the debounce only the id guards the request.
                        let mut state = inner.state.borrow_mut();
                        if state.pending_request != Some(id) {
                            return;
                        }
                        state.debounce = None;
                    }
                    let result = match parser {
                        Some(parser) => parser.parse(&text, &characteristics).await,
                        None => {
                            warn!(?data_value_type, ?data_type_id, "no parser available");
                            Err(ServiceError::silent())
                        }
                    };
                    inner.accept_parse(id, text, result).await;
                });
                self.state.borrow_mut().debounce = Some(handle);
            }
            RawValue::Empty => {
                tokio::task::spawn_local(async move {
                    let _guard = guard;
                    inner.accept_parse(id, String::new(), Ok(None)).await;
                });
            }
            RawValue::Value(value) => {
                tokio::task::spawn_local(async move {
                    let _guard = guard;
                    inner.accept_parse(id, String::new(), Ok(Some(value))).await;
                });
            }
        }
        self.redraw();
    }

    async fn accept_parse(
        self: Rc<Self>,
        id: u64,
        text: String,
        result: std::result::Result<Option<DataValue>, ServiceError>,
    ) {
        {
            let mut state = self.state.borrow_mut();
            if state.pending_request != Some(id) {
                trace!(request = id, "stale parse result dropped");
                return;
            }
            state.pending_request = None;
        }

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                self.redraw();
                self.report_failure(Some(err));
                return;
            }
        };
        debug!(request = id, ?value, "parse result applied");

        {
            let mut state = self.state.borrow_mut();
            if let Some(value) = &value {
                state.last_value_type = Some(value.type_tag().to_string());
            }
            state.value = value.clone();
            state.text_value = text;
        }
        let failure = match value {
            Some(value) => self.format(value, Rendering::Html).await,
            None => None,
        };

        // A newer request or a cancel may have come in while formatting.
        let current = {
            let state = self.state.borrow();
            state.request_id == id && state.pending_request.is_none()
        };
        if current {
            self.redraw();
            self.emit(ValueViewEvent::Change);
            self.report_failure(failure);
        } else {
            trace!(request = id, "parse superseded while formatting");
        }
    }

    /// Format `value`, keeping the result only if the view still holds it
    ///
    /// Returns the failure for the current value. The caller reports it once
    /// it has redrawn, so the redraw does not wipe the message.
    async fn format(
        self: &Rc<Self>,
        value: DataValue,
        rendering: Rendering,
    ) -> Option<ServiceError> {
        let _guard = self.track();
        let (formatter, data_type_id) = {
            let mut state = self.state.borrow_mut();
            if let Rendering::Html = rendering {
                state.formatting = Some(value.clone());
            }
            let formatter = match rendering {
                Rendering::Html => self.services.html_formatter.clone(),
                Rendering::PlainText => self.services.plaintext_formatter.clone(),
            };
            (formatter, state.options.data_type_id.clone())
        };

        let result = formatter.format(value.clone(), data_type_id.as_deref()).await;

        let mut state = self.state.borrow_mut();
        if state
            .formatting
            .as_ref()
            .is_some_and(|formatting| formatting.same_instance(&value))
        {
            state.formatting = None;
        }
        let current = state.value.clone();
        let is_current = |candidate: &DataValue| {
            current
                .as_ref()
                .is_some_and(|current| current.same_instance(candidate))
        };
        match result {
            Ok(formatted) if is_current(&formatted.value) => {
                match rendering {
                    Rendering::Html => state.formatted_value = formatted.text,
                    Rendering::PlainText => state.text_value = formatted.text,
                }
                None
            }
            Ok(_) => {
                trace!(?rendering, "stale format result dropped");
                None
            }
            Err(err) if is_current(&value) => Some(err),
            Err(_) => None,
        }
    }

    fn report_failure(self: &Rc<Self>, err: Option<ServiceError>) {
        let Some(err) = err else {
            return;
        };
        let Some(message) = err.message else {
            trace!("silent service failure ignored");
            return;
        };
        debug!(%message, "service failure");
        let shown = self
            .with_expert(|expert| expert.show_error(&message))
            .unwrap_or(false);
        if !shown {
            debug!("no preview to show the failure");
        }
    }
}

impl ViewStateSource for ViewInner {
    fn is_in_edit_mode(&self) -> bool {
        self.state.borrow().editing
    }

    fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    fn value(&self) -> Option<DataValue> {
        self.state.borrow().value.clone()
    }

    fn formatted_value(&self) -> String {
        self.state.borrow().formatted_value.clone()
    }

    fn text_value(&self) -> String {
        self.state.borrow().text_value.clone()
    }

    fn is_pending(&self) -> bool {
        let state = self.state.borrow();
        state.pending_request.is_some() || state.formatting.is_some()
    }

    fn option(&self, key: &str) -> Option<Json> {
        self.state.borrow().options.get(key)
    }
}

// =============================================================================
// ValueView
// =============================================================================

/// A widget displaying and editing one data value
///
/// Cloning yields another handle to the same view.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use valueview_core::{DataValue, MapParserStore, NullParser, ViewPort};
/// use valueview_widgets::{experts, ValueView, ValueViewOptions, ValueViewServices};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(
/// #     tokio::task::LocalSet::new().run_until(async {
/// let services = ValueViewServices::new(
///     Rc::new(experts::standard_store().unwrap()),
///     Rc::new(MapParserStore::new().with_default(Rc::new(NullParser))),
/// );
/// let view = ValueView::create(
///     ViewPort::new(),
///     services,
///     ValueViewOptions::default(),
///     Some(DataValue::string("hello")),
/// )
/// .await
/// .unwrap();
///
/// assert!(!view.is_in_edit_mode());
/// assert_eq!(view.view_port().text(), "hello");
/// # }));
/// ```
#[derive(Clone)]
pub struct ValueView {
    inner: Rc<ViewInner>,
}

impl ValueView {
    fn new(
        view_port: ViewPort,
        services: ValueViewServices,
        options: ValueViewOptions,
        value: Option<DataValue>,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<ViewInner>| {
            let handler = weak.clone();
            let notifier = Notifier::builder()
                .on(notification::CHANGE, move |_| {
                    if let Some(inner) = handler.upgrade() {
                        inner.on_change();
                    }
                })
                .build();
            let source: Weak<dyn ViewStateSource> = weak.clone();
            ViewInner {
                view_port,
                services,
                view_state: ViewState::new(source),
                notifier,
                state: RefCell::new(ViewFields {
                    last_value_type: value.as_ref().map(|v| v.type_tag().to_string()),
                    value,
                    options,
                    ..ViewFields::default()
                }),
                expert: RefCell::new(None),
                listeners: RefCell::new(SmallVec::new()),
                in_flight: Cell::new(0),
                idle: Notify::new(),
            }
        });
        Self { inner }
    }

    /// Create a view rendering into `view_port`
    ///
    /// With `auto_start_editing` and no value the view starts in edit mode.
    pub async fn create(
        view_port: ViewPort,
        services: ValueViewServices,
        options: ValueViewOptions,
        value: Option<DataValue>,
    ) -> Result<Self> {
        let auto_start = options.auto_start_editing && value.is_none();
        let view = Self::new(view_port, services, options, value.clone());
        let inner = &view.inner;
        inner.view_port.add_class(VALUEVIEW_CLASS);
        inner.update_expert_constructor();
        debug!(
            expert = inner.state.borrow().expert_constructor.map(|c| c.name()),
            "value view created"
        );

        if auto_start {
            view.start_editing().await?;
        } else {
            let failure = match value {
                Some(value) => inner.format(value, Rendering::Html).await,
                None => None,
            };
            inner.draw()?;
            inner.report_failure(failure);
        }
        Ok(view)
    }

    /// The container the view renders into
    pub fn view_port(&self) -> &ViewPort {
        &self.inner.view_port
    }

    /// A read-only state handle, as experts get it
    pub fn view_state(&self) -> ViewState {
        self.inner.view_state.clone()
    }

    /// Subscribe to view events
    pub fn on_event<F>(&self, listener: F)
    where
        F: Fn(&ValueViewEvent) + 'static,
    {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// The current value, `None` while empty or while input is being parsed
    pub fn value(&self) -> Option<DataValue> {
        self.inner.state.borrow().value.clone()
    }

    /// HTML rendering of the current value
    pub fn formatted_value(&self) -> String {
        self.inner.state.borrow().formatted_value.clone()
    }

    /// Plain text of the current value, as the user typed or as formatted
    pub fn text_value(&self) -> String {
        self.inner.state.borrow().text_value.clone()
    }

    /// Whether the view holds no value
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().value.is_none()
    }

    /// Whether an expert is live for editing
    pub fn is_in_edit_mode(&self) -> bool {
        self.inner.state.borrow().editing
    }

    /// Whether the view is disabled; independent of the mode
    pub fn is_disabled(&self) -> bool {
        self.inner.state.borrow().disabled
    }

    /// Name of the live expert, `None` in static mode
    pub fn expert_name(&self) -> Option<&'static str> {
        self.inner
            .expert
            .try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(ExpertInstance::name))
    }

    /// The expert the current value and options call for
    pub fn expert_constructor(&self) -> Option<ExpertConstructor> {
        self.inner.state.borrow().expert_constructor
    }

    /// Enter edit mode
    pub async fn start_editing(&self) -> Result<()> {
        let inner = &self.inner;
        let value = {
            let mut state = inner.state.borrow_mut();
            if state.editing {
                return Ok(());
            }
            state.initial = Some(Snapshot {
                value: state.value.clone(),
                formatted_value: state.formatted_value.clone(),
                text_value: state.text_value.clone(),
            });
            state.editing = true;
            state.value.clone()
        };
        debug!("start editing");

        let failure = match value {
            Some(value) => inner.format(value, Rendering::PlainText).await,
            None => None,
        };
        if !self.is_in_edit_mode() {
            return Ok(());
        }

        inner.update_expert_constructor();
        inner.draw()?;
        inner.emit(ValueViewEvent::AfterStartEditing);
        inner.report_failure(failure);
        Ok(())
    }

    /// Leave edit mode, restoring the value from before editing if `drop_value`
    pub async fn stop_editing(&self, drop_value: bool) -> Result<()> {
        let inner = &self.inner;
        {
            let mut state = inner.state.borrow_mut();
            if !state.editing {
                return Ok(());
            }
            let initial = state.initial.take().unwrap_or_default();
            if drop_value {
                state.cancel_pending_parse();
                state.formatting = None;
                state.value = initial.value;
                state.formatted_value = initial.formatted_value;
                state.text_value = initial.text_value;
            }
        }
        debug!(drop_value, "stop editing");

        inner.destroy_expert();
        inner.state.borrow_mut().editing = false;
        // The restored value may call for another expert next time.
        inner.update_expert_constructor();
        inner.draw()?;
        inner.emit(ValueViewEvent::AfterStopEditing { drop_value });
        Ok(())
    }

    /// Leave edit mode discarding the edit
    pub async fn cancel_editing(&self) -> Result<()> {
        self.stop_editing(true).await
    }

    /// Replace the value
    pub async fn set_value(&self, value: Option<DataValue>) -> Result<()> {
        let inner = &self.inner;
        let editing = {
            let mut state = inner.state.borrow_mut();
            state.cancel_pending_parse();
            if let Some(value) = &value {
                state.last_value_type = Some(value.type_tag().to_string());
            }
            state.value = value.clone();
            state.formatted_value.clear();
            state.text_value.clear();
            state.editing
        };
        inner.update_expert_constructor();

        let failure = match value.clone() {
            Some(value) if editing => {
                let (html, plain) = futures::join!(
                    inner.format(value.clone(), Rendering::Html),
                    inner.format(value, Rendering::PlainText)
                );
                html.or(plain)
            }
            Some(value) => inner.format(value, Rendering::Html).await,
            None => None,
        };

        let current = self.value();
        let superseded = match (&current, &value) {
            (Some(current), Some(value)) => !current.same_instance(value),
            (None, None) => false,
            _ => true,
        };
        if superseded {
            trace!("set_value superseded while formatting");
            return Ok(());
        }

        if editing {
            let raw = match &value {
                None => RawValue::Empty,
                Some(_) => RawValue::from_text(self.text_value()),
            };
            let baseline = inner.with_expert(|expert| {
                expert.set_raw_value(raw);
                (expert.value_characteristics(), expert.raw_value())
            });
            if let Some((characteristics, raw)) = baseline {
                let mut state = inner.state.borrow_mut();
                state.last_characteristics = characteristics;
                state.last_raw = raw;
            }
        }

        inner.draw()?;
        inner.emit(ValueViewEvent::Change);
        inner.report_failure(failure);
        Ok(())
    }

    /// Re-enable the view and redraw
    pub fn enable(&self) -> Result<()> {
        self.set_disabled(false)
    }

    /// Disable the view, keeping its mode, and redraw
    pub fn disable(&self) -> Result<()> {
        self.set_disabled(true)
    }

    fn set_disabled(&self, disabled: bool) -> Result<()> {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.disabled == disabled {
                return Ok(());
            }
            state.disabled = disabled;
        }
        self.inner.draw()
    }

    /// Render the current state into the view port
    pub fn draw(&self) -> Result<()> {
        self.inner.draw()
    }

    /// Focus the live expert, if any
    pub fn focus(&self) {
        self.inner.with_expert(|expert| expert.focus());
    }

    /// Blur the live expert, if any
    pub fn blur(&self) {
        self.inner.with_expert(|expert| expert.blur());
    }

    /// Read an option by key
    pub fn option(&self, key: &str) -> Option<Json> {
        self.inner.state.borrow().options.get(key)
    }

    /// Change an option after construction
    pub async fn set_option(&self, key: &str, value: Json) -> Result<()> {
        let inner = &self.inner;
        inner.state.borrow_mut().options.set(key, value)?;
        match key {
            keys::DATA_TYPE_ID | keys::DATA_VALUE_TYPE => {
                inner.update_expert_constructor();
                inner.draw()?;
            }
            keys::LANGUAGE => {
                let failure = match self.value() {
                    Some(value) => inner.format(value, Rendering::Html).await,
                    None => None,
                };
                inner.draw()?;
                inner.report_failure(failure);
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolves once no parse or format work is in flight
    pub async fn settled(&self) {
        while self.inner.in_flight.get() > 0 {
            self.inner.idle.notified().await;
        }
    }
}

impl fmt::Debug for ValueView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ValueView")
            .field("value", &state.value)
            .field("editing", &state.editing)
            .field("disabled", &state.disabled)
            .field("expert", &state.expert_constructor)
            .finish()
    }
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().debounce.take() {
            handle.abort();
        }
        if let Some(mut expert) = self.expert.get_mut().take() {
            expert.destroy();
        }
    }
}

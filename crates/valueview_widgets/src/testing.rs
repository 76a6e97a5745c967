//! Shared test fixtures

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::FutureExt;
use rustc_hash::FxHashMap;
use serde_json::Value as Json;
use valueview_core::{
    DataValue, Formatted, MapParserStore, MessageProvider, NullParser, Notifier, PlainFormatter,
    ServiceError, ServiceFuture, ValueCharacteristics, ValueFormatter, ValueParser, ViewPort,
};

use crate::expert::{ExpertArgs, ExpertOptions};
use crate::value_view::ValueViewServices;
use crate::view_state::{ViewState, ViewStateSource};

/// Hand-driven view state
#[derive(Default)]
pub struct FakeViewState {
    editing: Cell<bool>,
    disabled: Cell<bool>,
    pending: Cell<bool>,
    value: RefCell<Option<DataValue>>,
    formatted: RefCell<String>,
    options: RefCell<FxHashMap<String, Json>>,
}

impl FakeViewState {
    pub fn set_editing(&self, editing: bool) {
        self.editing.set(editing);
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn set_pending(&self, pending: bool) {
        self.pending.set(pending);
    }

    pub fn set_value(&self, value: Option<DataValue>) {
        *self.value.borrow_mut() = value;
    }

    pub fn set_formatted(&self, formatted: &str) {
        *self.formatted.borrow_mut() = formatted.to_string();
    }

    pub fn set_option(&self, key: &str, value: impl Into<Json>) {
        self.options.borrow_mut().insert(key.to_string(), value.into());
    }
}

impl ViewStateSource for FakeViewState {
    fn is_in_edit_mode(&self) -> bool {
        self.editing.get()
    }

    fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    fn value(&self) -> Option<DataValue> {
        self.value.borrow().clone()
    }

    fn formatted_value(&self) -> String {
        self.formatted.borrow().clone()
    }

    fn text_value(&self) -> String {
        self.value
            .borrow()
            .as_ref()
            .map(|value| PlainFormatter::plaintext().render(value))
            .unwrap_or_default()
    }

    fn is_pending(&self) -> bool {
        self.pending.get()
    }

    fn option(&self, key: &str) -> Option<Json> {
        self.options.borrow().get(key).cloned()
    }
}

/// Message provider with the built-in defaults
pub fn messages() -> Rc<MessageProvider> {
    Rc::new(MessageProvider::with_builtin_defaults().unwrap())
}

/// Arguments binding an expert to `source` on a fresh view port
pub fn expert_args(source: &Rc<FakeViewState>) -> ExpertArgs {
    expert_args_with(source, Notifier::empty())
}

pub fn expert_args_with(source: &Rc<FakeViewState>, notifier: Notifier) -> ExpertArgs {
    ExpertArgs {
        view_port: ViewPort::new(),
        view_state: ViewState::from_source(source),
        notifier,
        options: ExpertOptions {
            message_provider: messages(),
            language: Some("en".into()),
            content_languages: vec!["en".into(), "de".into()],
        },
    }
}

/// Echo parser counting its calls
#[derive(Default)]
pub struct CountingParser {
    calls: Cell<usize>,
    last_options: RefCell<Option<ValueCharacteristics>>,
}

impl CountingParser {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_options(&self) -> Option<ValueCharacteristics> {
        self.last_options.borrow().clone()
    }
}

impl ValueParser for CountingParser {
    fn parse(&self, raw: &str, options: &ValueCharacteristics) -> ServiceFuture<Option<DataValue>> {
        self.calls.set(self.calls.get() + 1);
        *self.last_options.borrow_mut() = Some(options.clone());
        NullParser.parse(raw, options)
    }
}

type ParseReply = oneshot::Sender<Result<Option<DataValue>, ServiceError>>;

/// Parser whose calls stay pending until the test resolves them
#[derive(Default)]
pub struct ControlledParser {
    requests: RefCell<Vec<(String, Option<ParseReply>)>>,
}

impl ControlledParser {
    /// Raw inputs received so far, in call order
    pub fn received(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(raw, _)| raw.clone()).collect()
    }

    /// Resolve call `index` with a string value echoing its input
    pub fn resolve(&self, index: usize) {
        let mut requests = self.requests.borrow_mut();
        let (raw, reply) = &mut requests[index];
        let value = DataValue::string(raw.clone());
        if let Some(reply) = reply.take() {
            let _ = reply.send(Ok(Some(value)));
        }
    }

    /// Fail call `index`
    pub fn fail(&self, index: usize, error: ServiceError) {
        let mut requests = self.requests.borrow_mut();
        if let Some(reply) = requests[index].1.take() {
            let _ = reply.send(Err(error));
        }
    }
}

impl ValueParser for ControlledParser {
    fn parse(&self, raw: &str, _options: &ValueCharacteristics) -> ServiceFuture<Option<DataValue>> {
        let (tx, rx) = oneshot::channel();
        self.requests.borrow_mut().push((raw.to_string(), Some(tx)));
        rx.map(|reply| reply.unwrap_or_else(|_| Err(ServiceError::silent())))
            .boxed_local()
    }
}

type FormatReply = oneshot::Sender<Result<Formatted, ServiceError>>;

/// Formatter whose calls stay pending until the test resolves them
#[derive(Default)]
pub struct ControlledFormatter {
    requests: RefCell<Vec<(DataValue, Option<FormatReply>)>>,
}

impl ControlledFormatter {
    pub fn received(&self) -> Vec<DataValue> {
        self.requests.borrow().iter().map(|(v, _)| v.clone()).collect()
    }

    /// Resolve call `index` with `text`, echoing the exact instance
    pub fn resolve(&self, index: usize, text: &str) {
        let mut requests = self.requests.borrow_mut();
        let (value, reply) = &mut requests[index];
        let formatted = Formatted {
            text: text.to_string(),
            value: value.clone(),
        };
        if let Some(reply) = reply.take() {
            let _ = reply.send(Ok(formatted));
        }
    }
}

impl ControlledFormatter {
    /// Fail call `index`
    pub fn fail(&self, index: usize, error: ServiceError) {
        let mut requests = self.requests.borrow_mut();
        if let Some(reply) = requests[index].1.take() {
            let _ = reply.send(Err(error));
        }
    }
}

impl ValueFormatter for ControlledFormatter {
    fn format(&self, value: DataValue, _data_type_id: Option<&str>) -> ServiceFuture<Formatted> {
        let (tx, rx) = oneshot::channel();
        self.requests.borrow_mut().push((value, Some(tx)));
        rx.map(|reply| reply.unwrap_or_else(|_| Err(ServiceError::silent())))
            .boxed_local()
    }
}

/// Services using `parser` for everything and the plain formatters
pub fn services(parser: Rc<dyn ValueParser>) -> ValueViewServices {
    ValueViewServices::new(
        Rc::new(crate::experts::standard_store().unwrap()),
        Rc::new(MapParserStore::new().with_default(parser)),
    )
    .message_provider(messages())
}

/// Let spawned local tasks run until they block
pub async fn flush() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Route `tracing` output to the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

//! Parser and formatter service contracts
//!
//! Parsing and formatting are external, asynchronous services with
//! unbounded latency (they may well be network round trips). A view only
//! consumes them through these traits:
//!
//! - [`ValueParser`]: raw text → `Option<DataValue>`
//! - [`ValueFormatter`]: `DataValue` → display text, echoing the instance
//! - [`ParserStore`]: picks the parser for a data value type / data type id
//!
//! Failures carry an optional human-readable message. A failure without a
//! message means "superseded, ignore".

use std::rc::Rc;

use futures::future::{ready, LocalBoxFuture};
use futures::FutureExt;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::characteristics::ValueCharacteristics;
use crate::data_value::{DataValue, DataValueKind};
use crate::error::{Error as RegistryError, Result};

/// Future returned by parse/format services
pub type ServiceFuture<T> = LocalBoxFuture<'static, std::result::Result<T, ServiceError>>;

/// Failure of an asynchronous service call
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{}", .message.as_deref().unwrap_or("request superseded"))]
pub struct ServiceError {
    /// Text to show the user, `None` to drop silently
    pub message: Option<String>,
}

impl ServiceError {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A failure that produces no user-visible effect
    pub fn silent() -> Self {
        Self::default()
    }
}

/// Turns raw user input into a data value
pub trait ValueParser {
    /// Parse `raw` using the expert's current characteristics as options
    ///
    /// Resolves to `None` when the input denotes "no value".
    fn parse(&self, raw: &str, options: &ValueCharacteristics) -> ServiceFuture<Option<DataValue>>;
}

/// Output of a formatter: the text plus the exact instance it was made from
#[derive(Debug, Clone)]
pub struct Formatted {
    pub text: String,
    pub value: DataValue,
}

/// Turns a data value into display text
pub trait ValueFormatter {
    fn format(&self, value: DataValue, data_type_id: Option<&str>) -> ServiceFuture<Formatted>;
}

/// Resolves the parser for a value type
pub trait ParserStore {
    /// Data type id first, then data value type, then the default
    fn get_parser(
        &self,
        data_value_type: Option<&str>,
        data_type_id: Option<&str>,
    ) -> Option<Rc<dyn ValueParser>>;
}

// =============================================================================
// Registry-backed parser store
// =============================================================================

/// Parser store backed by two registries and an optional default
#[derive(Default)]
pub struct MapParserStore {
    by_data_value_type: FxHashMap<String, Rc<dyn ValueParser>>,
    by_data_type: FxHashMap<String, Rc<dyn ValueParser>>,
    default: Option<Rc<dyn ValueParser>>,
}

impl MapParserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `parser` when no registration matches
    pub fn with_default(mut self, parser: Rc<dyn ValueParser>) -> Self {
        self.default = Some(parser);
        self
    }

    pub fn register_data_value_parser(
        &mut self,
        parser: Rc<dyn ValueParser>,
        data_value_type: &str,
    ) -> Result<()> {
        register(&mut self.by_data_value_type, "data value type", data_value_type, parser)
    }

    pub fn register_data_type_parser(
        &mut self,
        parser: Rc<dyn ValueParser>,
        data_type_id: &str,
    ) -> Result<()> {
        register(&mut self.by_data_type, "data type", data_type_id, parser)
    }
}

fn register(
    map: &mut FxHashMap<String, Rc<dyn ValueParser>>,
    kind: &'static str,
    key: &str,
    parser: Rc<dyn ValueParser>,
) -> Result<()> {
    if key.is_empty() {
        return Err(RegistryError::InvalidKey { kind });
    }
    if map.contains_key(key) {
        return Err(RegistryError::DuplicateRegistration {
            kind,
            key: key.to_string(),
        });
    }
    map.insert(key.to_string(), parser);
    debug!(kind, key, "parser registered");
    Ok(())
}

impl ParserStore for MapParserStore {
    fn get_parser(
        &self,
        data_value_type: Option<&str>,
        data_type_id: Option<&str>,
    ) -> Option<Rc<dyn ValueParser>> {
        data_type_id
            .and_then(|id| self.by_data_type.get(id))
            .or_else(|| data_value_type.and_then(|t| self.by_data_value_type.get(t)))
            .or(self.default.as_ref())
            .cloned()
    }
}

// =============================================================================
// Reference services
// =============================================================================

/// Parser that turns non-empty input into a string value
#[derive(Debug, Clone, Copy, Default)]
pub struct NullParser;

impl ValueParser for NullParser {
    fn parse(&self, raw: &str, _options: &ValueCharacteristics) -> ServiceFuture<Option<DataValue>> {
        let value = (!raw.is_empty()).then(|| DataValue::string(raw));
        ready(Ok(value)).boxed_local()
    }
}

/// Formatter rendering a value's plain text, optionally HTML-escaped
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter {
    escape_html: bool,
}

impl PlainFormatter {
    pub fn plaintext() -> Self {
        Self { escape_html: false }
    }

    pub fn html() -> Self {
        Self { escape_html: true }
    }

    /// Synchronous rendering used by the async `format`
    pub fn render(&self, value: &DataValue) -> String {
        let text = match value.kind() {
            DataValueKind::String(text) => text.clone(),
            DataValueKind::MonolingualText(v) => v.text.clone(),
            DataValueKind::Quantity(v) if v.unit == "1" => v.amount.clone(),
            DataValueKind::Quantity(v) => format!("{} {}", v.amount, v.unit),
            DataValueKind::Time(v) => v.time.clone(),
            DataValueKind::GlobeCoordinate(v) => format!("{}, {}", v.latitude, v.longitude),
            DataValueKind::Unknown { value, .. } => value.to_string(),
        };
        if self.escape_html {
            escape_html(&text)
        } else {
            text
        }
    }
}

impl ValueFormatter for PlainFormatter {
    fn format(&self, value: DataValue, _data_type_id: Option<&str>) -> ServiceFuture<Formatted> {
        let text = self.render(&value);
        ready(Ok(Formatted { text, value })).boxed_local()
    }
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    struct Fixed(&'static str);

    impl ValueParser for Fixed {
        fn parse(&self, _raw: &str, _options: &ValueCharacteristics) -> ServiceFuture<Option<DataValue>> {
            ready(Ok(Some(DataValue::string(self.0)))).boxed_local()
        }
    }

    #[test]
    fn test_parser_store_precedence() {
        let mut store = MapParserStore::new().with_default(Rc::new(Fixed("default")));
        store
            .register_data_value_parser(Rc::new(Fixed("by-value-type")), "string")
            .unwrap();
        store
            .register_data_type_parser(Rc::new(Fixed("by-data-type")), "url")
            .unwrap();

        let parse = |parser: Rc<dyn ValueParser>| {
            block_on(parser.parse("", &ValueCharacteristics::new()))
                .unwrap()
                .unwrap()
        };

        let p = store.get_parser(Some("string"), Some("url")).unwrap();
        assert_eq!(parse(p).as_str(), Some("by-data-type"));
        let p = store.get_parser(Some("string"), Some("unknown")).unwrap();
        assert_eq!(parse(p).as_str(), Some("by-value-type"));
        let p = store.get_parser(None, None).unwrap();
        assert_eq!(parse(p).as_str(), Some("default"));
    }

    #[test]
    fn test_parser_store_rejects_duplicates() {
        let mut store = MapParserStore::new();
        store.register_data_value_parser(Rc::new(NullParser), "string").unwrap();
        let err = store
            .register_data_value_parser(Rc::new(NullParser), "string")
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));
        assert!(matches!(
            store.register_data_type_parser(Rc::new(NullParser), ""),
            Err(RegistryError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_null_parser() {
        let options = ValueCharacteristics::new();
        assert_eq!(block_on(NullParser.parse("", &options)), Ok(None));
        assert_eq!(
            block_on(NullParser.parse("abc", &options)),
            Ok(Some(DataValue::string("abc")))
        );
    }

    #[test]
    fn test_formatter_echoes_instance() {
        let value = DataValue::string("<b>");
        let out = block_on(PlainFormatter::html().format(value.clone(), None)).unwrap();
        assert_eq!(out.text, "&lt;b&gt;");
        assert!(out.value.same_instance(&value));

        let out = block_on(PlainFormatter::plaintext().format(value, None)).unwrap();
        assert_eq!(out.text, "<b>");
    }

    #[test]
    fn test_service_error_display() {
        assert_eq!(ServiceError::silent().to_string(), "request superseded");
        assert_eq!(ServiceError::with_message("bad date").to_string(), "bad date");
    }
}

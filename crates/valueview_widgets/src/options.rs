//! Value view options
//!
//! Plain, serializable options of a [`ValueView`](crate::ValueView). They
//! can be built in code, or loaded from a `[valueview]` TOML table:
//!
//! ```rust
//! use valueview_widgets::ValueViewOptions;
//!
//! let options = ValueViewOptions::from_toml_str(
//!     r#"
//!     [valueview]
//!     data_type_id = "url"
//!     parse_delay_ms = 150
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(options.data_type_id.as_deref(), Some("url"));
//! assert!(options.auto_start_editing);
//! ```
//!
//! The services a view talks to (expert store, parser store, formatters,
//! message provider) are fixed at construction and live in
//! [`ValueViewServices`](crate::ValueViewServices) instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use valueview_core::{Error, Result};

/// Option keys for [`ValueViewOptions::get`] and `ValueView::set_option`
pub mod keys {
    pub const DATA_TYPE_ID: &str = "data_type_id";
    pub const DATA_VALUE_TYPE: &str = "data_value_type";
    pub const LANGUAGE: &str = "language";
    pub const CONTENT_LANGUAGES: &str = "content_languages";
    pub const AUTO_START_EDITING: &str = "auto_start_editing";
    pub const PARSE_DELAY_MS: &str = "parse_delay_ms";

    pub const EXPERT_STORE: &str = "expert_store";
    pub const PARSER_STORE: &str = "parser_store";
    pub const HTML_FORMATTER: &str = "html_formatter";
    pub const PLAINTEXT_FORMATTER: &str = "plaintext_formatter";
    pub const MESSAGE_PROVIDER: &str = "message_provider";
}

/// Options that can only be given on construction
pub const INIT_ONLY: &[&str] = &[
    keys::EXPERT_STORE,
    keys::PARSER_STORE,
    keys::HTML_FORMATTER,
    keys::PLAINTEXT_FORMATTER,
    keys::MESSAGE_PROVIDER,
    keys::AUTO_START_EDITING,
];

/// Default debounce before input is parsed
pub const DEFAULT_PARSE_DELAY_MS: u64 = 300;

/// Value view configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueViewOptions {
    /// Data type id, selects a more specific expert than the value type
    pub data_type_id: Option<String>,
    /// Data value type to edit when there is no value yet
    pub data_value_type: Option<String>,
    /// User interface language
    pub language: Option<String>,
    /// Languages offered for monolingual text
    pub content_languages: Vec<String>,
    /// Enter edit mode on construction when there is no value
    pub auto_start_editing: bool,
    /// Debounce before typed input is parsed
    pub parse_delay_ms: u64,
}

impl Default for ValueViewOptions {
    fn default() -> Self {
        Self {
            data_type_id: None,
            data_value_type: None,
            language: None,
            content_languages: Vec::new(),
            auto_start_editing: true,
            parse_delay_ms: DEFAULT_PARSE_DELAY_MS,
        }
    }
}

#[derive(Deserialize)]
struct OptionsFile {
    #[serde(default)]
    valueview: ValueViewOptions,
}

impl ValueViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `[valueview]` table of a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str::<OptionsFile>(source)
            .map(|file| file.valueview)
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn data_type_id(mut self, data_type_id: impl Into<String>) -> Self {
        self.data_type_id = Some(data_type_id.into());
        self
    }

    pub fn data_value_type(mut self, data_value_type: impl Into<String>) -> Self {
        self.data_value_type = Some(data_value_type.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn content_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn auto_start_editing(mut self, auto_start_editing: bool) -> Self {
        self.auto_start_editing = auto_start_editing;
        self
    }

    pub fn parse_delay_ms(mut self, parse_delay_ms: u64) -> Self {
        self.parse_delay_ms = parse_delay_ms;
        self
    }

    pub fn parse_delay(&self) -> Duration {
        Duration::from_millis(self.parse_delay_ms)
    }

    /// Read an option by key
    pub fn get(&self, key: &str) -> Option<Json> {
        match key {
            keys::DATA_TYPE_ID => self.data_type_id.clone().map(Json::String),
            keys::DATA_VALUE_TYPE => self.data_value_type.clone().map(Json::String),
            keys::LANGUAGE => self.language.clone().map(Json::String),
            keys::CONTENT_LANGUAGES => Some(Json::from(self.content_languages.clone())),
            keys::AUTO_START_EDITING => Some(Json::Bool(self.auto_start_editing)),
            keys::PARSE_DELAY_MS => Some(Json::from(self.parse_delay_ms)),
            _ => None,
        }
    }

    /// Change an option after construction
    ///
    /// Init-only keys fail with [`Error::InitOnlyOption`], keys this type
    /// does not know with [`Error::UnknownOption`].
    pub fn set(&mut self, key: &str, value: Json) -> Result<()> {
        if INIT_ONLY.contains(&key) {
            return Err(Error::InitOnlyOption(key.to_string()));
        }
        match key {
            keys::DATA_TYPE_ID => self.data_type_id = optional_string(key, value)?,
            keys::DATA_VALUE_TYPE => self.data_value_type = optional_string(key, value)?,
            keys::LANGUAGE => self.language = optional_string(key, value)?,
            keys::CONTENT_LANGUAGES => {
                self.content_languages =
                    serde_json::from_value(value).map_err(|e| invalid(key, e.to_string()))?;
            }
            keys::PARSE_DELAY_MS => {
                self.parse_delay_ms = value
                    .as_u64()
                    .ok_or_else(|| invalid(key, "expected a non-negative integer".into()))?;
            }
            _ => return Err(Error::UnknownOption(key.to_string())),
        }
        Ok(())
    }
}

fn optional_string(key: &str, value: Json) -> Result<Option<String>> {
    match value {
        Json::Null => Ok(None),
        Json::String(text) if text.is_empty() => Ok(None),
        Json::String(text) => Ok(Some(text)),
        other => Err(invalid(key, format!("expected a string or null, got {other}"))),
    }
}

fn invalid(key: &str, reason: String) -> Error {
    Error::InvalidOption {
        key: key.to_string(),
        reason,
    }
}

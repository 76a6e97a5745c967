//! Data values
//!
//! A [`DataValue`] is an immutable, typed value a view displays and edits.
//! Values are identified by a type tag (see [`types`]), compare
//! structurally with `==`, and are cheap to clone: clones share one
//! allocation, which is what [`DataValue::same_instance`] checks. The
//! instance check is how a view recognizes that an asynchronous formatter
//! answered for the value it currently holds rather than an older one.
//!
//! Values serialize to the `{"type": ..., "value": ...}` envelope:
//!
//! ```rust
//! use valueview_core::DataValue;
//!
//! let value = DataValue::string("hello");
//! let json = value.to_json();
//! assert_eq!(json["type"], "string");
//! assert_eq!(DataValue::from_json(json).unwrap(), value);
//! ```

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

use crate::error::{Error, Result};

/// Data value type tags
pub mod types {
    pub const STRING: &str = "string";
    pub const MONOLINGUAL_TEXT: &str = "monolingualtext";
    pub const QUANTITY: &str = "quantity";
    pub const TIME: &str = "time";
    pub const GLOBE_COORDINATE: &str = "globecoordinate";
}

/// Calendar model identifiers used by time values
pub mod calendars {
    pub const GREGORIAN: &str = "http://www.wikidata.org/entity/Q1985727";
    pub const JULIAN: &str = "http://www.wikidata.org/entity/Q1985786";
}

/// Globe identifier used when a coordinate does not name one
pub const EARTH: &str = "http://www.wikidata.org/entity/Q2";

/// Text in a single language
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonolingualText {
    pub text: String,
    pub language: String,
}

/// A decimal amount with a unit and optional bounds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: String,
    /// Unit concept URI, `"1"` for unitless quantities
    pub unit: String,
    #[serde(rename = "upperBound", default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(rename = "lowerBound", default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
}

/// A point in time with precision and calendar model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Time {
    pub time: String,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub before: u32,
    #[serde(default)]
    pub after: u32,
    /// 0 (billion years) through 14 (second)
    pub precision: u8,
    #[serde(rename = "calendarmodel")]
    pub calendar_model: String,
}

/// A position on a globe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobeCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default = "default_globe")]
    pub globe: String,
}

fn default_globe() -> String {
    EARTH.to_string()
}

/// The typed payload of a [`DataValue`]
#[derive(Clone, Debug, PartialEq)]
pub enum DataValueKind {
    String(String),
    MonolingualText(MonolingualText),
    Quantity(Quantity),
    Time(Time),
    GlobeCoordinate(GlobeCoordinate),
    /// A value of a type this crate has no model for, kept verbatim
    Unknown { type_tag: String, value: Json },
}

/// An immutable, typed data value
#[derive(Clone)]
pub struct DataValue(Rc<DataValueKind>);

impl DataValue {
    pub fn new(kind: DataValueKind) -> Self {
        Self(Rc::new(kind))
    }

    /// Create a string value
    pub fn string(text: impl Into<String>) -> Self {
        Self::new(DataValueKind::String(text.into()))
    }

    /// Create a monolingual text value
    pub fn monolingual_text(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self::new(DataValueKind::MonolingualText(MonolingualText {
            text: text.into(),
            language: language.into(),
        }))
    }

    /// Create a value of a type without a dedicated model
    pub fn unknown(type_tag: impl Into<String>, value: Json) -> Self {
        Self::new(DataValueKind::Unknown {
            type_tag: type_tag.into(),
            value,
        })
    }

    pub fn kind(&self) -> &DataValueKind {
        &self.0
    }

    /// The data value type tag
    pub fn type_tag(&self) -> &str {
        match self.kind() {
            DataValueKind::String(_) => types::STRING,
            DataValueKind::MonolingualText(_) => types::MONOLINGUAL_TEXT,
            DataValueKind::Quantity(_) => types::QUANTITY,
            DataValueKind::Time(_) => types::TIME,
            DataValueKind::GlobeCoordinate(_) => types::GLOBE_COORDINATE,
            DataValueKind::Unknown { type_tag, .. } => type_tag,
        }
    }

    /// Whether both handles point at the very same value instance
    pub fn same_instance(&self, other: &DataValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The text of a string value
    pub fn as_str(&self) -> Option<&str> {
        match self.kind() {
            DataValueKind::String(text) => Some(text),
            _ => None,
        }
    }

    /// The bare payload, without the type envelope
    pub fn get_value(&self) -> Json {
        let payload = match self.kind() {
            DataValueKind::String(text) => Ok(Json::String(text.clone())),
            DataValueKind::MonolingualText(v) => serde_json::to_value(v),
            DataValueKind::Quantity(v) => serde_json::to_value(v),
            DataValueKind::Time(v) => serde_json::to_value(v),
            DataValueKind::GlobeCoordinate(v) => serde_json::to_value(v),
            DataValueKind::Unknown { value, .. } => Ok(value.clone()),
        };
        // Plain structs of strings and numbers always serialize; NaN
        // coordinates are the one input that does not and become null.
        payload.unwrap_or(Json::Null)
    }

    /// Serialize into the `{"type", "value"}` envelope
    pub fn to_json(&self) -> Json {
        serde_json::json!({
            "type": self.type_tag(),
            "value": self.get_value(),
        })
    }

    /// Read a value from the `{"type", "value"}` envelope
    ///
    /// Unknown type tags are kept as [`DataValueKind::Unknown`]; known tags
    /// with a malformed payload are an error.
    pub fn from_json(json: Json) -> Result<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            type_tag: String,
            value: Json,
        }

        let Envelope { type_tag, value } =
            serde_json::from_value(json).map_err(|e| Error::InvalidDataValue(e.to_string()))?;

        let invalid = |e: serde_json::Error| Error::InvalidDataValue(format!("{type_tag}: {e}"));
        let kind = match type_tag.as_str() {
            types::STRING => DataValueKind::String(serde_json::from_value(value).map_err(invalid)?),
            types::MONOLINGUAL_TEXT => {
                DataValueKind::MonolingualText(serde_json::from_value(value).map_err(invalid)?)
            }
            types::QUANTITY => DataValueKind::Quantity(serde_json::from_value(value).map_err(invalid)?),
            types::TIME => DataValueKind::Time(serde_json::from_value(value).map_err(invalid)?),
            types::GLOBE_COORDINATE => {
                DataValueKind::GlobeCoordinate(serde_json::from_value(value).map_err(invalid)?)
            }
            _ => DataValueKind::Unknown { type_tag, value },
        };
        Ok(Self::new(kind))
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other) || self.kind() == other.kind()
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataValue").field(self.kind()).finish()
    }
}

impl From<DataValueKind> for DataValue {
    fn from(kind: DataValueKind) -> Self {
        Self::new(kind)
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        DataValue::from_json(json).map_err(serde::de::Error::custom)
    }
}

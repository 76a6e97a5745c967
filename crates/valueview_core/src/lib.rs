//! ValueView Core
//!
//! Leaf primitives shared by the valueview widgets:
//!
//! - **Data values**: immutable typed values with structural equality and
//!   instance identity
//! - **Value characteristics**: parser/formatter hints derived from UI state
//! - **Notifier**: synchronous keyed notifications from experts to views
//! - **Message provider**: message keys to display text with defaults
//! - **Services**: asynchronous parser/formatter contracts and reference
//!   implementations
//! - **View ports**: headless content containers experts render into
//!
//! # Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use valueview_core::{NullParser, ValueCharacteristics, ValueParser};
//!
//! let parsed = block_on(NullParser.parse("hello", &ValueCharacteristics::new())).unwrap();
//! assert_eq!(parsed.unwrap().as_str(), Some("hello"));
//! ```

pub mod characteristics;
pub mod data_value;
pub mod error;
pub mod message;
pub mod notifier;
pub mod service;
pub mod view_port;

pub use characteristics::ValueCharacteristics;
pub use data_value::{
    types, DataValue, DataValueKind, GlobeCoordinate, MonolingualText, Quantity, Time,
};
pub use error::{Error, Result};
pub use message::{MessageGetter, MessageProvider};
pub use notifier::{Notification, NotificationHandler, Notifier, NotifierBuilder};
pub use service::{
    escape_html, Formatted, MapParserStore, NullParser, ParserStore, PlainFormatter,
    ServiceError, ServiceFuture, ValueFormatter, ValueParser,
};
pub use view_port::{InputElement, Node, SelectElement, SelectOption, ViewPort};

//! Built-in experts
//!
//! | Expert                   | Used for                          |
//! |--------------------------|-----------------------------------|
//! | [`StringValue`]          | `string` values                   |
//! | [`MonolingualText`]      | `monolingualtext` values          |
//! | [`QuantityInput`]        | `quantity` values                 |
//! | [`TimeInput`]            | `time` values                     |
//! | [`GlobeCoordinateInput`] | `globecoordinate` values          |
//! | [`UrlType`]              | the `url` data type               |
//! | [`StaticDom`]            | read-only formatted display       |
//! | [`EmptyValue`]           | no value and no declared type     |
//! | [`UnsupportedValue`]     | types without a registered expert |

mod empty_value;
mod globe_coordinate;
mod input;
mod monolingual_text;
mod quantity;
mod static_dom;
mod time;
mod unsupported_value;
mod url;

pub use empty_value::EmptyValue;
pub use globe_coordinate::GlobeCoordinateInput;
pub use input::{InputExpert, StringValue};
pub use monolingual_text::MonolingualText;
pub use quantity::QuantityInput;
pub use static_dom::StaticDom;
pub use time::TimeInput;
pub use unsupported_value::UnsupportedValue;
pub use url::UrlType;

use valueview_core::{types, Result};

use crate::store::ExpertStore;

/// Data type id of URLs
pub const URL_DATA_TYPE: &str = "url";

/// A store with every built-in expert registered
pub fn standard_store() -> Result<ExpertStore> {
    let mut store = ExpertStore::new();
    register_standard_experts(&mut store)?;
    Ok(store)
}

/// Register the built-in experts into an existing store
///
/// Fails with [`Error::DuplicateRegistration`](valueview_core::Error) if
/// the store already has an expert for one of their keys.
pub fn register_standard_experts(store: &mut ExpertStore) -> Result<()> {
    let registrations = [
        (StringValue::CONSTRUCTOR, types::STRING),
        (MonolingualText::CONSTRUCTOR, types::MONOLINGUAL_TEXT),
        (QuantityInput::CONSTRUCTOR, types::QUANTITY),
        (TimeInput::CONSTRUCTOR, types::TIME),
        (GlobeCoordinateInput::CONSTRUCTOR, types::GLOBE_COORDINATE),
    ];
    for (constructor, data_value_type) in registrations {
        store.register_data_value_expert(constructor, data_value_type)?;
    }
    store.register_data_type_expert(UrlType::CONSTRUCTOR, URL_DATA_TYPE)
}

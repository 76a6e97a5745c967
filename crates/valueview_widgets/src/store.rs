//! Expert store
//!
//! Registry mapping data value types and data type ids to expert
//! constructors. Registration is add-only; a lookup prefers the data type id
//! over the data value type and falls back to an optional default:
//!
//! ```rust
//! use valueview_widgets::experts::{StringValue, UrlType};
//! use valueview_widgets::store::ExpertStore;
//!
//! let mut store = ExpertStore::new();
//! store.register_data_value_expert(StringValue::CONSTRUCTOR, "string").unwrap();
//! store.register_data_type_expert(UrlType::CONSTRUCTOR, "url").unwrap();
//!
//! let expert = store.get_expert(Some("string"), Some("url")).unwrap();
//! assert_eq!(expert, Some(UrlType::CONSTRUCTOR));
//! ```

use rustc_hash::FxHashMap;
use tracing::debug;
use valueview_core::{Error, Result};

use crate::expert::ExpertConstructor;

const DATA_VALUE_TYPE: &str = "data value type";
const DATA_TYPE: &str = "data type";

/// Data (value) type → expert constructor
#[derive(Debug, Default, Clone)]
pub struct ExpertStore {
    by_data_value_type: FxHashMap<String, ExpertConstructor>,
    by_data_type: FxHashMap<String, ExpertConstructor>,
    default: Option<ExpertConstructor>,
}

impl ExpertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `constructor` when no registration matches
    pub fn with_default(mut self, constructor: ExpertConstructor) -> Self {
        self.default = Some(constructor);
        self
    }

    pub fn default_expert(&self) -> Option<ExpertConstructor> {
        self.default
    }

    pub fn register_data_value_expert(
        &mut self,
        constructor: ExpertConstructor,
        data_value_type: &str,
    ) -> Result<()> {
        Self::register(
            &mut self.by_data_value_type,
            DATA_VALUE_TYPE,
            data_value_type,
            constructor,
        )
    }

    pub fn register_data_type_expert(
        &mut self,
        constructor: ExpertConstructor,
        data_type_id: &str,
    ) -> Result<()> {
        Self::register(&mut self.by_data_type, DATA_TYPE, data_type_id, constructor)
    }

    fn register(
        map: &mut FxHashMap<String, ExpertConstructor>,
        kind: &'static str,
        key: &str,
        constructor: ExpertConstructor,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidKey { kind });
        }
        if map.contains_key(key) {
            return Err(Error::DuplicateRegistration {
                kind,
                key: key.to_string(),
            });
        }
        debug!(kind, key, expert = constructor.name(), "expert registered");
        map.insert(key.to_string(), constructor);
        Ok(())
    }

    /// Resolve the constructor for a value
    ///
    /// Empty strings count as absent. With neither key given this is
    /// [`Error::MissingLookupKey`].
    pub fn get_expert(
        &self,
        data_value_type: Option<&str>,
        data_type_id: Option<&str>,
    ) -> Result<Option<ExpertConstructor>> {
        let data_value_type = data_value_type.filter(|key| !key.is_empty());
        let data_type_id = data_type_id.filter(|key| !key.is_empty());
        if data_value_type.is_none() && data_type_id.is_none() {
            return Err(Error::MissingLookupKey);
        }

        Ok(data_type_id
            .and_then(|id| self.by_data_type.get(id))
            .or_else(|| data_value_type.and_then(|t| self.by_data_value_type.get(t)))
            .copied()
            .or(self.default))
    }

    /// Registered data value types, sorted
    pub fn registered_data_value_types(&self) -> Vec<&str> {
        sorted_keys(&self.by_data_value_type)
    }

    /// Registered data type ids, sorted
    pub fn registered_data_type_ids(&self) -> Vec<&str> {
        sorted_keys(&self.by_data_type)
    }
}

fn sorted_keys(map: &FxHashMap<String, ExpertConstructor>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

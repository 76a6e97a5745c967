//! ValueView Widget Library
//!
//! Inline display and editing of typed data values.
//!
//! # Architecture
//!
//! 1. **Experts**: each data value type (or data type) is handled by an
//!    [`Expert`] built from an [`ExpertConstructor`]. An [`ExpertStore`]
//!    maps type keys to constructors; the lifecycle
//!    `init → draw* → destroy` is enforced by [`ExpertInstance`].
//!
//! 2. **Extensions**: previews, unit/language selectors and list rotators
//!    are [`ExpertExtension`]s composed into experts, not inherited.
//!
//! 3. **The value view**: [`ValueView`] owns the value, the mode and the live
//!    expert. Experts only read it through a [`ViewState`] and report edits
//!    through a [`Notifier`](valueview_core::Notifier); the view then runs
//!    debounced, staleness-safe parse and format round trips.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use valueview_core::{MapParserStore, NullParser, ViewPort};
//! use valueview_widgets::prelude::*;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(
//! #     tokio::task::LocalSet::new().run_until(async {
//! let services = ValueViewServices::new(
//!     Rc::new(standard_store().unwrap()),
//!     Rc::new(MapParserStore::new().with_default(Rc::new(NullParser))),
//! );
//! let options = ValueViewOptions::new().data_value_type("string").parse_delay_ms(0);
//! let view = ValueView::create(ViewPort::new(), services, options, None)
//!     .await
//!     .unwrap();
//!
//! // No value: the view starts editing right away.
//! assert_eq!(view.expert_name(), Some("StringValue"));
//!
//! view.view_port().find_input().unwrap().type_text("hello");
//! view.settled().await;
//! assert_eq!(view.value().unwrap().as_str(), Some("hello"));
//! # }));
//! ```

pub mod bifid;
pub mod expert;
pub mod experts;
pub mod extension;
pub mod list_rotator;
pub mod options;
pub mod preview;
pub mod selectors;
pub mod store;
pub mod value_view;
pub mod view_state;

#[cfg(test)]
mod testing;

pub use bifid::{BifidExpert, BifidState};
pub use expert::{
    Expert, ExpertArgs, ExpertBase, ExpertConstructor, ExpertInstance, ExpertOptions, Lifecycle,
    RawValue, EXPERT_CLASS,
};
pub use extension::{ExpertExtender, ExpertExtension, ExtensionContext};
pub use list_rotator::{ListRotator, ListRotatorExtension, RotatorItem};
pub use options::ValueViewOptions;
pub use preview::{Preview, PreviewContent, PreviewExtension};
pub use selectors::{LanguageSelector, UnitSelector};
pub use store::ExpertStore;
pub use value_view::{ValueView, ValueViewEvent, ValueViewServices};
pub use view_state::{ViewState, ViewStateSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::expert::{Expert, ExpertArgs, ExpertBase, ExpertConstructor, RawValue};
    pub use crate::experts::standard_store;
    pub use crate::options::ValueViewOptions;
    pub use crate::store::ExpertStore;
    pub use crate::value_view::{ValueView, ValueViewEvent, ValueViewServices};
    pub use crate::view_state::ViewState;
}

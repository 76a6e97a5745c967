//! List rotator
//!
//! A picker over a fixed list of values with an optional "auto" entry.
//! While on auto, the rotator contributes nothing and the parser decides;
//! the auto label shows what was detected. Time precision, calendar model
//! and coordinate precision pickers are list rotators.

use serde_json::Value as Json;
use tracing::trace;
use valueview_core::notifier::keys;
use valueview_core::{
    DataValue, Node, SelectElement, SelectOption, ValueCharacteristics, ViewPort,
};

use crate::extension::{ExpertExtension, ExtensionContext};

/// Option value of the auto entry
pub const AUTO: &str = "auto";

pub const LIST_ROTATOR_CLASS: &str = "valueview-listrotator";

/// One selectable value
#[derive(Clone, Debug, PartialEq)]
pub struct RotatorItem {
    pub value: Json,
    pub label: String,
}

impl RotatorItem {
    pub fn new(value: impl Into<Json>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Headless list rotator
#[derive(Debug)]
pub struct ListRotator {
    select: SelectElement,
    items: Vec<RotatorItem>,
    auto_label: Option<String>,
}

impl ListRotator {
    /// Create a rotator; `auto_label` adds the auto entry and selects it
    pub fn new(items: Vec<RotatorItem>, auto_label: Option<String>) -> Self {
        let select = SelectElement::new(Self::options(&items, auto_label.as_deref(), None));
        let rotator = Self {
            select,
            items,
            auto_label,
        };
        match (&rotator.auto_label, rotator.items.first()) {
            (Some(_), _) => {
                rotator.select.select(AUTO);
            }
            (None, Some(_)) => {
                rotator.select.select("0");
            }
            (None, None) => {}
        }
        rotator
    }

    fn options(
        items: &[RotatorItem],
        auto_label: Option<&str>,
        detected: Option<&str>,
    ) -> Vec<SelectOption> {
        let auto = auto_label.map(|label| SelectOption {
            value: AUTO.to_string(),
            label: match detected {
                Some(detected) => format!("{label} ({detected})"),
                None => label.to_string(),
            },
        });
        auto.into_iter()
            .chain(items.iter().enumerate().map(|(index, item)| SelectOption {
                value: index.to_string(),
                label: item.label.clone(),
            }))
            .collect()
    }

    pub fn element(&self) -> &SelectElement {
        &self.select
    }

    /// The offered items, without the auto entry
    pub fn values(&self) -> &[RotatorItem] {
        &self.items
    }

    /// Whether the auto entry is selected
    pub fn is_auto(&self) -> bool {
        self.select.selected().as_deref() == Some(AUTO)
    }

    /// The chosen value; `None` while on auto
    pub fn value(&self) -> Option<&Json> {
        let selected = self.select.selected()?;
        let index: usize = selected.parse().ok()?;
        self.items.get(index).map(|item| &item.value)
    }

    /// Select `value` without firing listeners
    pub fn select(&self, value: &Json) -> bool {
        match self.items.iter().position(|item| &item.value == value) {
            Some(index) => self.select.select(&index.to_string()),
            None => false,
        }
    }

    /// Return to auto without firing listeners
    pub fn select_auto(&self) -> bool {
        self.auto_label.is_some() && self.select.select(AUTO)
    }

    /// Show which value auto mode currently resolves to
    pub fn set_detected(&self, detected: Option<&Json>) {
        let Some(auto_label) = self.auto_label.as_deref() else {
            return;
        };
        let detected = detected.and_then(|value| {
            self.items
                .iter()
                .find(|item| &item.value == value)
                .map(|item| item.label.as_str())
        });
        self.select
            .set_options(Self::options(&self.items, Some(auto_label), detected));
    }
}

/// Reads the value a rotator's auto entry would resolve to
pub type DetectFn = fn(&DataValue) -> Option<Json>;

/// A [`ListRotator`] contributing one value characteristic
pub struct ListRotatorExtension {
    key: &'static str,
    label_key: &'static str,
    items: fn(&ExtensionContext<'_>) -> Vec<RotatorItem>,
    detect: Option<DetectFn>,
    container: Option<ViewPort>,
    rotator: Option<ListRotator>,
}

impl ListRotatorExtension {
    /// `items` builds the choices once the messages are available
    pub fn new(
        key: &'static str,
        label_key: &'static str,
        items: fn(&ExtensionContext<'_>) -> Vec<RotatorItem>,
    ) -> Self {
        Self {
            key,
            label_key,
            items,
            detect: None,
            container: None,
            rotator: None,
        }
    }

    /// Offer an auto entry resolving through `detect`
    pub fn with_auto(mut self, detect: DetectFn) -> Self {
        self.detect = Some(detect);
        self
    }

    pub fn rotator(&self) -> Option<&ListRotator> {
        self.rotator.as_ref()
    }

    fn render(&self, label: &str) {
        if let (Some(container), Some(rotator)) = (&self.container, &self.rotator) {
            container.set_content(vec![
                Node::Text(label.to_string()),
                Node::Select(rotator.element().clone()),
            ]);
        }
    }
}

impl ExpertExtension for ListRotatorExtension {
    fn init(&mut self, container: &ViewPort, cx: &ExtensionContext<'_>) {
        container.add_class(LIST_ROTATOR_CLASS);
        let auto_label = self
            .detect
            .map(|_| cx.message("valueview-listrotator-auto", &[]));
        let rotator = ListRotator::new((self.items)(cx), auto_label);

        self.container = Some(container.clone());
        let notifier = cx.notifier.clone();
        rotator.element().on_change(move |_| {
            notifier.notify(keys::CHANGE, &[]);
        });
        self.rotator = Some(rotator);
        self.render(&cx.message(self.label_key, &[]));
    }

    fn draw(&mut self, cx: &ExtensionContext<'_>) {
        let detected = match (cx.view_state.value(), self.detect) {
            (Some(value), Some(detect)) => detect(&value),
            _ => None,
        };
        let Some(rotator) = self.rotator.as_ref() else {
            return;
        };
        if rotator.is_auto() {
            rotator.set_detected(detected.as_ref());
        }
        rotator.element().set_disabled(cx.view_state.is_disabled());
        self.render(&cx.message(self.label_key, &[]));
    }

    fn destroy(&mut self) {
        if let Some(rotator) = self.rotator.take() {
            rotator.element().clear_listeners();
        }
        self.container = None;
    }

    fn value_characteristics(&self) -> ValueCharacteristics {
        let mut characteristics = ValueCharacteristics::new();
        if let Some(value) = self.rotator.as_ref().and_then(ListRotator::value) {
            trace!(key = self.key, %value, "rotator characteristic");
            characteristics.insert(self.key, value.clone());
        }
        characteristics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expert::ExpertBase;
    use crate::testing::{expert_args_with, FakeViewState};
    use std::cell::Cell;
    use std::rc::Rc;
    use valueview_core::characteristics::keys as characteristic;
    use valueview_core::Notifier;

    fn precisions(_cx: &ExtensionContext<'_>) -> Vec<RotatorItem> {
        vec![
            RotatorItem::new(9, "year"),
            RotatorItem::new(10, "month"),
            RotatorItem::new(11, "day"),
        ]
    }

    fn always_day(_value: &DataValue) -> Option<Json> {
        Some(Json::from(11))
    }

    #[test]
    fn test_rotator_without_auto_selects_first() {
        let rotator = ListRotator::new(precisions_items(), None);
        assert!(!rotator.is_auto());
        assert_eq!(rotator.value(), Some(&Json::from(9)));
        assert!(rotator.select(&Json::from(11)));
        assert_eq!(rotator.element().selected_label().as_deref(), Some("day"));
        assert!(!rotator.select(&Json::from(99)));
        assert!(!rotator.select_auto());
    }

    fn precisions_items() -> Vec<RotatorItem> {
        vec![RotatorItem::new(9, "year"), RotatorItem::new(11, "day")]
    }

    #[test]
    fn test_auto_contributes_nothing() {
        let rotator = ListRotator::new(precisions_items(), Some("auto".into()));
        assert!(rotator.is_auto());
        assert_eq!(rotator.value(), None);

        rotator.set_detected(Some(&Json::from(11)));
        assert_eq!(
            rotator.element().selected_label().as_deref(),
            Some("auto (day)")
        );
        assert!(rotator.is_auto());
    }

    #[test]
    fn test_choice_notifies_and_sets_characteristic() {
        let source = Rc::new(FakeViewState::default());
        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        let notifier = Notifier::builder()
            .on(keys::CHANGE, move |_| counter.set(counter.get() + 1))
            .build();
        let base = ExpertBase::new(expert_args_with(&source, notifier));

        let mut extension = ListRotatorExtension::new(
            characteristic::PRECISION,
            "valueview-expert-timeinput-precision",
            precisions,
        )
        .with_auto(always_day);
        let container = ViewPort::new();
        extension.init(&container, &base.extension_context());
        extension.draw(&base.extension_context());
        assert!(extension.value_characteristics().is_empty());

        let select = container.find_select().unwrap();
        assert!(select.choose("1"));
        assert_eq!(changes.get(), 1);
        assert_eq!(
            extension.value_characteristics().get(characteristic::PRECISION),
            Some(&Json::from(10))
        );

        extension.destroy();
        select.choose("2");
        assert_eq!(changes.get(), 1);
    }
}

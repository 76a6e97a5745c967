//! Language and unit selector extensions
//!
//! Both contribute a single value characteristic: the chosen content
//! language of a monolingual text, and the unit of a quantity.

use serde_json::Value as Json;
use valueview_core::characteristics::keys as characteristic;
use valueview_core::notifier::keys;
use valueview_core::{
    DataValueKind, InputElement, Node, SelectElement, SelectOption, ValueCharacteristics, ViewPort,
};

use crate::extension::{ExpertExtension, ExtensionContext};

pub const LANGUAGE_SELECTOR_CLASS: &str = "valueview-languageselector";
pub const UNIT_SELECTOR_CLASS: &str = "valueview-unitselector";

/// Unit of quantities that have none
pub const UNITLESS: &str = "1";

// =============================================================================
// Language selector
// =============================================================================

/// Picks the language of a monolingual text
#[derive(Debug, Default)]
pub struct LanguageSelector {
    select: Option<SelectElement>,
}

impl LanguageSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chosen language code
    pub fn language(&self) -> Option<String> {
        self.select.as_ref().and_then(SelectElement::selected)
    }
}

impl ExpertExtension for LanguageSelector {
    fn init(&mut self, container: &ViewPort, cx: &ExtensionContext<'_>) {
        container.add_class(LANGUAGE_SELECTOR_CLASS);

        let mut languages = cx.options.content_languages.clone();
        if languages.is_empty() {
            languages.extend(cx.options.language.clone());
        }
        let current = match cx.view_state.value().as_ref().map(|v| v.kind().clone()) {
            Some(DataValueKind::MonolingualText(text)) => Some(text.language),
            _ => cx.options.language.clone(),
        };
        if let Some(current) = &current {
            if !languages.contains(current) {
                languages.push(current.clone());
            }
        }

        let select = SelectElement::new(
            languages
                .iter()
                .map(|code| SelectOption {
                    value: code.clone(),
                    label: code.clone(),
                })
                .collect(),
        );
        if let Some(language) = current.or_else(|| languages.first().cloned()) {
            select.select(&language);
        }

        let notifier = cx.notifier.clone();
        select.on_change(move |_| {
            notifier.notify(keys::CHANGE, &[]);
        });

        container.set_content(vec![
            Node::Text(cx.message("valueview-expertextender-languageselector-label", &[])),
            Node::Select(select.clone()),
        ]);
        self.select = Some(select);
    }

    fn draw(&mut self, cx: &ExtensionContext<'_>) {
        if let Some(select) = &self.select {
            select.set_disabled(cx.view_state.is_disabled());
        }
    }

    fn on_value_set(&mut self, cx: &ExtensionContext<'_>) {
        let (Some(select), Some(value)) = (&self.select, cx.view_state.value()) else {
            return;
        };
        let DataValueKind::MonolingualText(text) = value.kind() else {
            return;
        };
        if !select.select(&text.language) {
            let mut options = select.options();
            options.push(SelectOption {
                value: text.language.clone(),
                label: text.language.clone(),
            });
            select.set_options(options);
            select.select(&text.language);
        }
    }

    fn destroy(&mut self) {
        if let Some(select) = self.select.take() {
            select.clear_listeners();
        }
    }

    fn value_characteristics(&self) -> ValueCharacteristics {
        self.language()
            .map(|language| ValueCharacteristics::new().with(characteristic::LANGUAGE, language))
            .unwrap_or_default()
    }
}

// =============================================================================
// Unit selector
// =============================================================================

/// Free-text unit input for quantities
#[derive(Debug, Default)]
pub struct UnitSelector {
    input: Option<InputElement>,
}

impl UnitSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entered unit, [`UNITLESS`] when blank
    pub fn unit(&self) -> String {
        let unit = self
            .input
            .as_ref()
            .map(|input| input.value().trim().to_string())
            .unwrap_or_default();
        if unit.is_empty() {
            UNITLESS.to_string()
        } else {
            unit
        }
    }
}

impl ExpertExtension for UnitSelector {
    fn init(&mut self, container: &ViewPort, cx: &ExtensionContext<'_>) {
        container.add_class(UNIT_SELECTOR_CLASS);

        let input = InputElement::new();
        if let Some(DataValueKind::Quantity(quantity)) =
            cx.view_state.value().as_ref().map(|v| v.kind())
        {
            if quantity.unit != UNITLESS {
                input.set_value(&quantity.unit);
            }
        }

        let notifier = cx.notifier.clone();
        input.on_input(move |_| {
            notifier.notify(keys::CHANGE, &[]);
        });

        container.set_content(vec![
            Node::Text(cx.message("valueview-expertextender-unitsuggester-label", &[])),
            Node::Input(input.clone()),
        ]);
        self.input = Some(input);
    }

    fn draw(&mut self, cx: &ExtensionContext<'_>) {
        if let Some(input) = &self.input {
            input.set_disabled(cx.view_state.is_disabled());
        }
    }

    fn on_value_set(&mut self, cx: &ExtensionContext<'_>) {
        let (Some(input), Some(value)) = (&self.input, cx.view_state.value()) else {
            return;
        };
        if let DataValueKind::Quantity(quantity) = value.kind() {
            let unit = if quantity.unit == UNITLESS {
                ""
            } else {
                quantity.unit.as_str()
            };
            input.set_value(unit);
        }
    }

    fn destroy(&mut self) {
        if let Some(input) = self.input.take() {
            input.clear_listeners();
        }
    }

    fn value_characteristics(&self) -> ValueCharacteristics {
        if self.input.is_none() {
            return ValueCharacteristics::new();
        }
        ValueCharacteristics::new().with(characteristic::UNIT, Json::String(self.unit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expert::ExpertBase;
    use crate::testing::{expert_args, expert_args_with, FakeViewState};
    use std::cell::Cell;
    use std::rc::Rc;
    use valueview_core::{DataValue, Notifier, Quantity};

    #[test]
    fn test_language_selector_defaults_to_value_language() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::monolingual_text("Hallo", "de")));
        let base = ExpertBase::new(expert_args(&source));

        let mut selector = LanguageSelector::new();
        selector.init(&ViewPort::new(), &base.extension_context());

        assert_eq!(selector.language().as_deref(), Some("de"));
        assert_eq!(
            selector.value_characteristics().get_str(characteristic::LANGUAGE),
            Some("de")
        );
    }

    #[test]
    fn test_language_choice_notifies() {
        let source = Rc::new(FakeViewState::default());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let notifier = Notifier::builder()
            .on(keys::CHANGE, move |_| counter.set(counter.get() + 1))
            .build();
        let base = ExpertBase::new(expert_args_with(&source, notifier));

        let container = ViewPort::new();
        let mut selector = LanguageSelector::new();
        selector.init(&container, &base.extension_context());
        assert_eq!(selector.language().as_deref(), Some("en"));

        assert!(container.find_select().unwrap().choose("de"));
        assert_eq!(hits.get(), 1);
        assert_eq!(selector.language().as_deref(), Some("de"));
    }

    #[test]
    fn test_language_follows_value_set_from_outside() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::monolingual_text("Hallo", "de")));
        let base = ExpertBase::new(expert_args(&source));
        let mut selector = LanguageSelector::new();
        selector.init(&ViewPort::new(), &base.extension_context());

        source.set_value(Some(DataValue::monolingual_text("hello", "en")));
        selector.on_value_set(&base.extension_context());
        assert_eq!(selector.language().as_deref(), Some("en"));

        // A language outside the offered list is added, not ignored.
        source.set_value(Some(DataValue::monolingual_text("bonjour", "fr")));
        selector.on_value_set(&base.extension_context());
        assert_eq!(selector.language().as_deref(), Some("fr"));
    }

    #[test]
    fn test_unit_selector() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::new(DataValueKind::Quantity(Quantity {
            amount: "+5".into(),
            unit: "http://www.wikidata.org/entity/Q11573".into(),
            upper_bound: None,
            lower_bound: None,
        }))));
        let base = ExpertBase::new(expert_args(&source));

        let container = ViewPort::new();
        let mut selector = UnitSelector::new();
        assert!(selector.value_characteristics().is_empty());
        selector.init(&container, &base.extension_context());
        assert_eq!(selector.unit(), "http://www.wikidata.org/entity/Q11573");

        container.find_input().unwrap().type_text("  ");
        assert_eq!(
            selector.value_characteristics().get_str(characteristic::UNIT),
            Some(UNITLESS)
        );

        source.set_value(Some(DataValue::new(DataValueKind::Quantity(Quantity {
            amount: "+2".into(),
            unit: "http://www.wikidata.org/entity/Q11570".into(),
            upper_bound: None,
            lower_bound: None,
        }))));
        selector.on_value_set(&base.extension_context());
        assert_eq!(selector.unit(), "http://www.wikidata.org/entity/Q11570");
    }
}

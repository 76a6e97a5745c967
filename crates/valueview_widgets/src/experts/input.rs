//! Text input experts
//!
//! [`InputExpert`] is a single text input plus an [`ExpertExtender`]. The
//! concrete input experts differ only in the extensions they attach.

use valueview_core::notifier::keys;
use valueview_core::{InputElement, Node, PlainFormatter, ValueCharacteristics};

use crate::expert::{Expert, ExpertArgs, ExpertBase, ExpertConstructor, RawValue};
use crate::extension::{ExpertExtender, ExpertExtension};

/// Text input with extensions
pub struct InputExpert {
    base: ExpertBase,
    extender: ExpertExtender,
}

impl InputExpert {
    pub fn new(args: ExpertArgs, extensions: Vec<Box<dyn ExpertExtension>>) -> Self {
        let extender = extensions
            .into_iter()
            .fold(ExpertExtender::new(InputElement::new()), ExpertExtender::with);
        Self {
            base: ExpertBase::new(args),
            extender,
        }
    }

    pub fn input(&self) -> &InputElement {
        self.extender.input()
    }
}

impl Expert for InputExpert {
    fn init(&mut self) {
        let input = self.extender.input().clone();
        input.set_value(&self.base.view_state().text_value());

        let notifier = self.base.notifier().clone();
        input.on_input(move |_| {
            notifier.notify(keys::CHANGE, &[]);
        });

        let mut content = vec![Node::Input(input)];
        if !self.extender.is_empty() {
            content.push(Node::Element(self.extender.container().clone()));
        }
        self.base.view_port().set_content(content);
        self.extender.init(&self.base.extension_context());
    }

    fn draw(&mut self) {
        self.extender
            .input()
            .set_disabled(self.base.view_state().is_disabled());
        self.extender.draw(&self.base.extension_context());
    }

    fn destroy(&mut self) {
        self.extender.input().clear_listeners();
        self.extender.destroy();
    }

    fn raw_value(&self) -> RawValue {
        RawValue::from_text(self.extender.input().value())
    }

    fn set_raw_value(&mut self, raw: RawValue) {
        let text = match raw {
            RawValue::Empty => String::new(),
            RawValue::Text(text) => text,
            RawValue::Value(value) => PlainFormatter::plaintext().render(&value),
        };
        self.extender.input().set_value(&text);
        self.extender.value_set(&self.base.extension_context());
    }

    fn value_characteristics(&self) -> ValueCharacteristics {
        self.extender.value_characteristics()
    }

    fn focus(&mut self) {
        self.extender.input().focus();
    }

    fn blur(&mut self) {
        self.extender.input().blur();
    }

    fn show_error(&mut self, message: &str) -> bool {
        self.extender.show_error(message)
    }
}

/// Plain string values
pub struct StringValue;

impl StringValue {
    pub const CONSTRUCTOR: ExpertConstructor = ExpertConstructor::new("StringValue", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(InputExpert::new(args, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expert_args, expert_args_with, FakeViewState};
    use std::cell::Cell;
    use std::rc::Rc;
    use valueview_core::{DataValue, Notifier};

    #[test]
    fn test_input_starts_from_text_value() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::string("foo")));
        let mut expert = StringValue::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        assert_eq!(expert.raw_value(), RawValue::Text("foo".into()));
        assert!(expert.value_characteristics().is_empty());
    }

    #[test]
    fn test_typing_notifies_change() {
        let source = Rc::new(FakeViewState::default());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let notifier = Notifier::builder()
            .on(keys::CHANGE, move |_| counter.set(counter.get() + 1))
            .build();
        let mut expert = StringValue::CONSTRUCTOR.instantiate(expert_args_with(&source, notifier));
        expert.init().unwrap();

        let input = expert.view_port().find_input().unwrap();
        input.type_text("bar");
        assert_eq!(hits.get(), 1);
        assert_eq!(expert.raw_value(), RawValue::Text("bar".into()));

        input.type_text("");
        assert_eq!(expert.raw_value(), RawValue::Empty);

        expert.destroy();
        input.type_text("ignored");
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_disabled_view_disables_input() {
        let source = Rc::new(FakeViewState::default());
        let mut expert = StringValue::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        source.set_disabled(true);
        expert.draw().unwrap();

        let input = expert.view_port().find_input().unwrap();
        assert!(input.is_disabled());
        input.type_text("nope");
        assert_eq!(expert.raw_value(), RawValue::Empty);
    }

    #[test]
    fn test_set_raw_value_renders_typed_values() {
        let source = Rc::new(FakeViewState::default());
        let mut expert = StringValue::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.set_raw_value(RawValue::Value(DataValue::string("typed")));
        assert_eq!(expert.raw_value(), RawValue::Text("typed".into()));
    }
}

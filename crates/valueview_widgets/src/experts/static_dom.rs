//! Read-only display of the formatted value
//!
//! Without a formatted value the raw text is shown, as a link for the
//! `url` data type.

use valueview_core::{Node, PlainFormatter};

use super::URL_DATA_TYPE;
use crate::expert::{Expert, ExpertArgs, ExpertBase, ExpertConstructor, RawValue};
use crate::options::keys;

pub struct StaticDom {
    base: ExpertBase,
    raw: RawValue,
}

impl StaticDom {
    pub const CONSTRUCTOR: ExpertConstructor = ExpertConstructor::new("StaticDom", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(Self {
            base: ExpertBase::new(args),
            raw: RawValue::Empty,
        })
    }

    fn is_url(&self) -> bool {
        self.base.view_state().option_str(keys::DATA_TYPE_ID).as_deref() == Some(URL_DATA_TYPE)
    }
}

impl Expert for StaticDom {
    fn init(&mut self) {
        self.raw = RawValue::from_text(self.base.view_state().text_value());
    }

    fn draw(&mut self) {
        let formatted = self.base.view_state().formatted_value();
        let content = if !formatted.is_empty() {
            vec![Node::Html(formatted)]
        } else {
            match &self.raw {
                RawValue::Empty => Vec::new(),
                RawValue::Text(text) if self.is_url() => vec![Node::Link {
                    href: text.clone(),
                    text: text.clone(),
                }],
                RawValue::Text(text) => vec![Node::Text(text.clone())],
                RawValue::Value(value) => vec![Node::Text(PlainFormatter::plaintext().render(value))],
            }
        };
        self.base.view_port().set_content(content);
    }

    fn raw_value(&self) -> RawValue {
        self.raw.clone()
    }

    fn set_raw_value(&mut self, raw: RawValue) {
        self.raw = raw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expert_args, FakeViewState};
    use std::rc::Rc;
    use valueview_core::DataValue;

    #[test]
    fn test_prefers_formatted_value() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::string("a&b")));
        source.set_formatted("a&amp;b");
        let mut expert = StaticDom::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        assert_eq!(expert.view_port().render_html(), "a&amp;b");
        assert_eq!(expert.raw_value(), RawValue::Text("a&b".into()));
    }

    #[test]
    fn test_unformatted_url_is_a_link() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::string("https://example.org/?a&b")));
        source.set_option(keys::DATA_TYPE_ID, "url");
        let mut expert = StaticDom::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        assert_eq!(
            expert.view_port().render_html(),
            "<a href=\"https://example.org/?a&amp;b\">https://example.org/?a&amp;b</a>"
        );

        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::string("plain")));
        let mut expert = StaticDom::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();
        assert_eq!(expert.view_port().render_html(), "plain");
    }
}

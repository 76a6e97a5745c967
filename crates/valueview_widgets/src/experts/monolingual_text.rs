//! Text in one language: a text input plus a language selector

use crate::expert::{Expert, ExpertArgs, ExpertConstructor};
use crate::experts::InputExpert;
use crate::selectors::LanguageSelector;

pub struct MonolingualText;

impl MonolingualText {
    pub const CONSTRUCTOR: ExpertConstructor =
        ExpertConstructor::new("MonolingualText", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(InputExpert::new(args, vec![Box::new(LanguageSelector::new())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expert::RawValue;
    use crate::testing::{expert_args, FakeViewState};
    use std::rc::Rc;
    use valueview_core::characteristics::keys;
    use valueview_core::DataValue;

    #[test]
    fn test_text_and_language() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(DataValue::monolingual_text("Hallo", "de")));
        let mut expert = MonolingualText::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        assert_eq!(expert.raw_value(), RawValue::Text("Hallo".into()));
        assert_eq!(expert.value_characteristics().get_str(keys::LANGUAGE), Some("de"));

        expert.view_port().find_select().unwrap().choose("en");
        assert_eq!(expert.value_characteristics().get_str(keys::LANGUAGE), Some("en"));
    }
}

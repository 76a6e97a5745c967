//! Quantities: amount input, unit selector and preview

use crate::expert::{Expert, ExpertArgs, ExpertConstructor};
use crate::experts::InputExpert;
use crate::preview::PreviewExtension;
use crate::selectors::UnitSelector;

pub struct QuantityInput;

impl QuantityInput {
    pub const CONSTRUCTOR: ExpertConstructor =
        ExpertConstructor::new("QuantityInput", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(InputExpert::new(
            args,
            vec![Box::new(UnitSelector::new()), Box::new(PreviewExtension::new())],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expert_args, FakeViewState};
    use std::rc::Rc;
    use valueview_core::characteristics::keys;

    #[test]
    fn test_unit_characteristic_and_error_routing() {
        let source = Rc::new(FakeViewState::default());
        let mut expert = QuantityInput::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        assert_eq!(expert.value_characteristics().get_str(keys::UNIT), Some("1"));
        assert!(expert.show_error("Could not parse \"5 m\""));
        assert!(expert.view_port().text().contains("Could not parse"));
    }
}

//! Expert explaining that a value's type has no expert

use valueview_core::Node;

use crate::expert::{Expert, ExpertArgs, ExpertBase, ExpertConstructor, RawValue};
use crate::options::keys;

pub struct UnsupportedValue {
    base: ExpertBase,
}

impl UnsupportedValue {
    pub const CONSTRUCTOR: ExpertConstructor =
        ExpertConstructor::new("UnsupportedValue", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(Self {
            base: ExpertBase::new(args),
        })
    }

    fn explanation(&self) -> String {
        let state = self.base.view_state();
        if let Some(value) = state.value() {
            return self.base.message(
                "valueview-expert-unsupportedvalue-unsupporteddatavalue",
                &[value.type_tag()],
            );
        }
        match state.option_str(keys::DATA_TYPE_ID) {
            Some(data_type) => self.base.message(
                "valueview-expert-unsupportedvalue-unsupporteddatatype",
                &[&data_type],
            ),
            None => {
                let data_value_type = state
                    .option_str(keys::DATA_VALUE_TYPE)
                    .unwrap_or_default();
                self.base.message(
                    "valueview-expert-unsupportedvalue-unsupporteddatavalue",
                    &[&data_value_type],
                )
            }
        }
    }
}

impl Expert for UnsupportedValue {
    fn draw(&mut self) {
        let explanation = self.explanation();
        self.base
            .view_port()
            .set_content(vec![Node::Text(explanation)]);
    }

    /// Hands the value back untouched
    fn raw_value(&self) -> RawValue {
        self.base
            .view_state()
            .value()
            .map(RawValue::Value)
            .unwrap_or_default()
    }
}

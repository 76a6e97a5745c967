//! Expert shown when there is no value and no type to edit it with

use valueview_core::Node;

use crate::expert::{Expert, ExpertArgs, ExpertBase, ExpertConstructor, RawValue};

pub struct EmptyValue {
    base: ExpertBase,
}

impl EmptyValue {
    pub const CONSTRUCTOR: ExpertConstructor = ExpertConstructor::new("EmptyValue", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(Self {
            base: ExpertBase::new(args),
        })
    }
}

impl Expert for EmptyValue {
    fn draw(&mut self) {
        let message = self.base.message("valueview-expert-emptyvalue-empty", &[]);
        self.base.view_port().set_content(vec![Node::Text(message)]);
    }

    fn raw_value(&self) -> RawValue {
        RawValue::Empty
    }
}

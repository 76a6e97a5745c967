//! URLs: the formatted link while static, a string input while editing

use crate::bifid::BifidExpert;
use crate::expert::{Expert, ExpertArgs, ExpertConstructor};
use crate::experts::{StaticDom, StringValue};

pub struct UrlType;

impl UrlType {
    pub const CONSTRUCTOR: ExpertConstructor = ExpertConstructor::new("UrlType", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(BifidExpert::new(
            args,
            StringValue::CONSTRUCTOR,
            StaticDom::CONSTRUCTOR,
        ))
    }
}

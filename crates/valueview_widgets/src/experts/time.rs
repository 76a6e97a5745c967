//! Points in time: text input, precision and calendar rotators, preview

use serde_json::Value as Json;
use valueview_core::characteristics::keys;
use valueview_core::data_value::calendars;
use valueview_core::{DataValue, DataValueKind};

use crate::expert::{Expert, ExpertArgs, ExpertConstructor};
use crate::experts::InputExpert;
use crate::extension::ExtensionContext;
use crate::list_rotator::{ListRotatorExtension, RotatorItem};
use crate::preview::PreviewExtension;

/// Precisions offered, coarsest first
const PRECISIONS: &[(u8, &str)] = &[
    (6, "millennium"),
    (7, "century"),
    (8, "decade"),
    (9, "year"),
    (10, "month"),
    (11, "day"),
];

pub struct TimeInput;

impl TimeInput {
    pub const CONSTRUCTOR: ExpertConstructor = ExpertConstructor::new("TimeInput", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(InputExpert::new(
            args,
            vec![
                Box::new(
                    ListRotatorExtension::new(
                        keys::PRECISION,
                        "valueview-expert-timeinput-precision",
                        precision_items,
                    )
                    .with_auto(detect_precision),
                ),
                Box::new(
                    ListRotatorExtension::new(
                        keys::CALENDAR,
                        "valueview-expert-timeinput-calendar",
                        calendar_items,
                    )
                    .with_auto(detect_calendar),
                ),
                Box::new(PreviewExtension::new()),
            ],
        ))
    }
}

fn precision_items(cx: &ExtensionContext<'_>) -> Vec<RotatorItem> {
    PRECISIONS
        .iter()
        .map(|(precision, name)| {
            RotatorItem::new(
                *precision,
                cx.message(&format!("valueview-expert-timevalue-precision-{name}"), &[]),
            )
        })
        .collect()
}

fn calendar_items(cx: &ExtensionContext<'_>) -> Vec<RotatorItem> {
    vec![
        RotatorItem::new(
            calendars::GREGORIAN,
            cx.message("valueview-expert-timevalue-calendar-gregorian", &[]),
        ),
        RotatorItem::new(
            calendars::JULIAN,
            cx.message("valueview-expert-timevalue-calendar-julian", &[]),
        ),
    ]
}

fn detect_precision(value: &DataValue) -> Option<Json> {
    match value.kind() {
        DataValueKind::Time(time) => Some(Json::from(time.precision)),
        _ => None,
    }
}

fn detect_calendar(value: &DataValue) -> Option<Json> {
    match value.kind() {
        DataValueKind::Time(time) => Some(Json::from(time.calendar_model.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expert_args, FakeViewState};
    use std::rc::Rc;
    use valueview_core::Time;

    fn time(precision: u8) -> DataValue {
        DataValue::new(DataValueKind::Time(Time {
            time: "+1952-03-11T00:00:00Z".into(),
            timezone: 0,
            before: 0,
            after: 0,
            precision,
            calendar_model: calendars::GREGORIAN.into(),
        }))
    }

    #[test]
    fn test_auto_rotators_show_detected_values() {
        let source = Rc::new(FakeViewState::default());
        source.set_value(Some(time(11)));
        let mut expert = TimeInput::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        // Both rotators on auto: the parser decides.
        assert!(expert.value_characteristics().is_empty());
        let text = expert.view_port().text();
        assert!(text.contains("auto (day)"), "{text}");
        assert!(text.contains("auto (Gregorian)"), "{text}");
    }

    #[test]
    fn test_chosen_precision_becomes_characteristic() {
        let source = Rc::new(FakeViewState::default());
        let mut expert = TimeInput::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        let precision = expert.view_port().find_select().unwrap();
        // "auto" first, then the precisions in order; index 3 is "year".
        assert!(precision.choose("3"));
        assert_eq!(
            expert.value_characteristics().get(keys::PRECISION),
            Some(&Json::from(9))
        );
        assert!(!expert.value_characteristics().contains_key(keys::CALENDAR));
    }
}

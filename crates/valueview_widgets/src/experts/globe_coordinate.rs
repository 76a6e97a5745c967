//! Globe coordinates: text input, precision rotator, preview

use serde_json::Value as Json;
use valueview_core::characteristics::keys;
use valueview_core::{DataValue, DataValueKind};

use crate::expert::{Expert, ExpertArgs, ExpertConstructor};
use crate::experts::InputExpert;
use crate::extension::ExtensionContext;
use crate::list_rotator::{ListRotatorExtension, RotatorItem};
use crate::preview::PreviewExtension;

/// Precisions in degrees with their message suffixes
const PRECISIONS: &[(f64, &str)] = &[
    (1.0, "degree"),
    (1.0 / 60.0, "arcminute"),
    (1.0 / 3_600.0, "arcsecond"),
    (1.0 / 36_000.0, "tenth-of-arcsecond"),
    (1.0 / 360_000.0, "hundredth-of-arcsecond"),
    (1.0 / 3_600_000.0, "thousandth-of-arcsecond"),
];

pub struct GlobeCoordinateInput;

impl GlobeCoordinateInput {
    pub const CONSTRUCTOR: ExpertConstructor =
        ExpertConstructor::new("GlobeCoordinateInput", Self::construct);

    fn construct(args: ExpertArgs) -> Box<dyn Expert> {
        Box::new(InputExpert::new(
            args,
            vec![
                Box::new(
                    ListRotatorExtension::new(
                        keys::PRECISION,
                        "valueview-expert-globecoordinateinput-precision",
                        precision_items,
                    )
                    .with_auto(detect_precision),
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
                cx.message(
                    &format!("valueview-expert-globecoordinateinput-precisionlabel-{name}"),
                    &[],
                ),
            )
        })
        .collect()
}

/// The stored precision, snapped to the closest offered one
fn detect_precision(value: &DataValue) -> Option<Json> {
    let DataValueKind::GlobeCoordinate(coordinate) = value.kind() else {
        return None;
    };
    let precision = coordinate.precision?;
    PRECISIONS
        .iter()
        .map(|(offered, _)| *offered)
        .min_by(|a, b| (a - precision).abs().total_cmp(&(b - precision).abs()))
        .map(Json::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expert_args, FakeViewState};
    use std::rc::Rc;
    use valueview_core::data_value::EARTH;
    use valueview_core::GlobeCoordinate;

    #[test]
    fn test_detected_precision_snaps_to_offered() {
        let value = DataValue::new(DataValueKind::GlobeCoordinate(GlobeCoordinate {
            latitude: 52.5,
            longitude: 13.4,
            precision: Some(0.000_277_8),
            globe: EARTH.into(),
        }));
        assert_eq!(detect_precision(&value), Some(Json::from(1.0 / 3_600.0)));
        assert_eq!(detect_precision(&DataValue::string("x")), None);
    }

    #[test]
    fn test_preview_and_rotator_are_attached() {
        let source = Rc::new(FakeViewState::default());
        let mut expert = GlobeCoordinateInput::CONSTRUCTOR.instantiate(expert_args(&source));
        expert.init().unwrap();
        expert.draw().unwrap();

        let text = expert.view_port().text();
        assert!(text.contains("precision"), "{text}");
        assert!(text.contains("no valid value recognized"), "{text}");
        assert!(expert.show_error("Out of range"));
    }
}

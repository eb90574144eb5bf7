//! Season-long soluble-nutrient norms for fertigation, before any spring
//! fertilizer correction.

use smallvec::smallvec;

use crate::products::ORTHOPHOSPHORIC_ACID;
use crate::tables::potassium_for;
use crate::{
    non_negative, round_to_tenth, Constants, CropId, CropParams, Element, Needs, NutrientNeed,
    ReferenceContent, SoilAnalysis,
};

/// Fertigation norms for `crop` at `planned_yield` t/ha, or `None` when the
/// crop has no parameters.
pub fn fertigation_needs(
    soil: &SoilAnalysis,
    crop: &CropId,
    planned_yield: f64,
    content: &ReferenceContent,
) -> Option<Needs> {
    let params = content.crop(crop)?;
    Some(fertigation_needs_for(
        soil,
        params,
        planned_yield,
        &content.constants,
    ))
}

/// N, P2O5, K2O, CaO, MgO. Whole kg/ha except P2O5, which keeps one decimal
/// so the acid back-calculation lands exactly on the product amount.
pub fn fertigation_needs_for(
    soil: &SoilAnalysis,
    crop: &CropParams,
    planned_yield: f64,
    constants: &Constants,
) -> Needs {
    let nitrogen = non_negative(
        crop.nitrogen_factor * planned_yield
            - soil.nitrate_nitrogen * constants.soil_nitrogen_credit_factor,
    );
    let phosphorus = fixed_phosphorus(constants);
    let potassium = potassium_for(&crop.potassium_ranges, soil.potassium).unwrap_or(0.0);
    let calcium = potassium * crop.calcium_factor;
    let magnesium = potassium * crop.magnesium_factor;

    smallvec![
        NutrientNeed::new(Element::Nitrogen, nitrogen.round()),
        NutrientNeed::new(Element::Phosphorus, round_to_tenth(phosphorus)),
        NutrientNeed::new(Element::Potassium, potassium.round()),
        NutrientNeed::new(Element::Calcium, calcium.round()),
        NutrientNeed::new(Element::Magnesium, magnesium.round()),
    ]
}

/// P2O5 delivered by the fixed seasonal dose of orthophosphoric acid.
fn fixed_phosphorus(constants: &Constants) -> f64 {
    constants.fertigation_phosphorus_product_kg * ORTHOPHOSPHORIC_ACID.content_pct / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::norm_of;
    use crate::test_fixtures::{base_constants, base_content, tomato_params, tomato_soil};

    #[test]
    fn nitrogen_credits_soil_nitrate() {
        let soil = SoilAnalysis {
            nitrate_nitrogen: 10.0,
            ..tomato_soil()
        };
        let needs = fertigation_needs_for(&soil, &tomato_params(), 80.0, &base_constants());
        // 3.0 * 80 - 10 * 3 = 210
        assert!((norm_of(&needs, Element::Nitrogen) - 210.0).abs() < 1e-12);
    }

    #[test]
    fn nitrogen_rich_soil_needs_none() {
        let soil = SoilAnalysis {
            nitrate_nitrogen: 200.0,
            ..tomato_soil()
        };
        let needs = fertigation_needs_for(&soil, &tomato_params(), 80.0, &base_constants());
        assert!(norm_of(&needs, Element::Nitrogen).abs() < 1e-12);
    }

    #[test]
    fn phosphorus_is_fixed_with_one_decimal() {
        for soil_p in [0.0, 15.0, 80.0] {
            let soil = SoilAnalysis {
                phosphorus: soil_p,
                ..tomato_soil()
            };
            let needs = fertigation_needs_for(&soil, &tomato_params(), 80.0, &base_constants());
            assert!((norm_of(&needs, Element::Phosphorus) - 20.4).abs() < 1e-12);
        }
    }

    #[test]
    fn potassium_calcium_magnesium_come_from_range_table() {
        let soil = SoilAnalysis {
            potassium: 150.0,
            ..tomato_soil()
        };
        let needs = fertigation_needs_for(&soil, &tomato_params(), 80.0, &base_constants());
        // range 100..=200 -> 240; Ca 0.4 * 240 = 96; Mg 0.15 * 240 = 36
        assert!((norm_of(&needs, Element::Potassium) - 240.0).abs() < 1e-12);
        assert!((norm_of(&needs, Element::Calcium) - 96.0).abs() < 1e-12);
        assert!((norm_of(&needs, Element::Magnesium) - 36.0).abs() < 1e-12);
    }

    #[test]
    fn unmatched_potassium_gives_zero_channels() {
        let soil = SoilAnalysis {
            potassium: f64::NAN,
            ..tomato_soil()
        };
        let needs = fertigation_needs_for(&soil, &tomato_params(), 80.0, &base_constants());
        for element in [Element::Potassium, Element::Calcium, Element::Magnesium] {
            assert!(norm_of(&needs, element).abs() < 1e-12);
        }
    }

    #[test]
    fn unknown_crop_yields_none() {
        let content = base_content();
        let needs = fertigation_needs(&tomato_soil(), &CropId::from("Ананас"), 80.0, &content);
        assert!(needs.is_none());
    }
}

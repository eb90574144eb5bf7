//! Basic (pre-plant, soil-incorporated) nutrient norms.
//!
//! Norms depend only on the soil test; the crop is consulted solely to
//! reject crops without reference parameters. The liming amendment is a
//! separate stage, see `amendment`.

use smallvec::smallvec;

use crate::{
    non_negative, CropId, Constants, Element, Needs, NutrientNeed, ReferenceContent, SoilAnalysis,
};

/// Basic norms for `crop`, or `None` when the crop has no parameters.
pub fn basic_needs(
    soil: &SoilAnalysis,
    crop: &CropId,
    content: &ReferenceContent,
) -> Option<Needs> {
    content.crop(crop)?;
    Some(basic_needs_for(soil, &content.constants))
}

/// P2O5, K2O, CaO, MgO and a zero Amendment entry, rounded to whole kg/ha.
pub fn basic_needs_for(soil: &SoilAnalysis, constants: &Constants) -> Needs {
    let potassium = non_negative(
        constants.basic_potassium_base_kg + constants.basic_potassium_cec_factor * soil.cec
            - soil.potassium,
    );
    let calcium = non_negative(constants.basic_calcium_cec_factor * soil.cec - soil.calcium);
    let magnesium = non_negative(constants.basic_magnesium_cec_factor * soil.cec - soil.magnesium);

    smallvec![
        NutrientNeed::new(Element::Phosphorus, phosphorus_norm(soil.phosphorus)),
        NutrientNeed::new(Element::Potassium, potassium.round()),
        NutrientNeed::new(Element::Calcium, calcium.round()),
        NutrientNeed::new(Element::Magnesium, magnesium.round()),
        NutrientNeed::new(Element::Amendment, 0.0),
    ]
}

/// Step table: the poorer the soil in phosphorus, the larger the norm.
/// NaN falls through to the largest norm.
pub fn phosphorus_norm(soil_p: f64) -> f64 {
    if soil_p > 30.0 {
        50.0
    } else if soil_p > 20.0 {
        100.0
    } else if soil_p > 10.0 {
        150.0
    } else if soil_p >= 5.0 {
        200.0
    } else {
        250.0
    }
}

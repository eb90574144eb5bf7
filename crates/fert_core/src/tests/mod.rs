use super::*;
use crate::test_fixtures::{base_content, spring_npk, tomato_params, tomato_soil};


// --- Shared test helpers ------------------------------------------------

fn tomato() -> CropId {
    CropId::from("Томат")
}

fn initial_tomato_needs(soil: &SoilAnalysis) -> Needs {
    fertigation_needs(soil, &tomato(), 80.0, &base_content()).expect("tomato is known")
}

/// Initial needs with a chosen K2O norm and everything else derived from it
/// the way the fertigation calculator would.
fn needs_with_potassium(potassium: f64) -> Needs {
    let params = tomato_params();
    [
        NutrientNeed::new(Element::Nitrogen, 150.0),
        NutrientNeed::new(Element::Phosphorus, 20.4),
        NutrientNeed::new(Element::Potassium, potassium),
        NutrientNeed::new(Element::Calcium, potassium * params.calcium_factor),
        NutrientNeed::new(Element::Magnesium, potassium * params.magnesium_factor),
    ]
    .into_iter()
    .collect()
}

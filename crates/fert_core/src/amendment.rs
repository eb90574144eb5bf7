//! Liming amendment: the second stage on top of basic norms.
//!
//! On acidic soil a chosen liming material gets an application rate from
//! the pH deficit, and the calcium and magnesium it brings are taken off the
//! basic CaO and MgO norms.

use crate::{non_negative, AmendmentDef, Constants, Element, Needs, NutrientNeed};

/// Liming rate in tons/ha for `ph`, rounded to whole tons. Soil already at
/// or above the target pH gets no material.
pub fn amendment_rate_tons(ph: f64, constants: &Constants) -> f64 {
    non_negative(((constants.liming_target_ph - ph) * constants.liming_tons_per_ph_unit).round())
}

/// Returns `base` with Amendment, CaO and MgO recomputed for `material`.
///
/// Without a material, or when pH is above the liming threshold (or NaN),
/// the result equals `base`.
pub fn apply_amendment(
    base: &[NutrientNeed],
    ph: f64,
    material: Option<&AmendmentDef>,
    constants: &Constants,
) -> Needs {
    let Some(material) = material.filter(|_| ph <= constants.liming_ph_threshold) else {
        return base.iter().copied().collect();
    };

    let tons = amendment_rate_tons(ph, constants);
    let calcium_supplied = tons * material.calcium_kg_per_ton;
    let magnesium_supplied = tons * material.magnesium_kg_per_ton;

    base.iter()
        .map(|need| match need.element {
            Element::Amendment => NutrientNeed::new(Element::Amendment, tons * 1000.0),
            Element::Calcium => {
                NutrientNeed::new(Element::Calcium, non_negative(need.norm - calcium_supplied))
            }
            Element::Magnesium => NutrientNeed::new(
                Element::Magnesium,
                non_negative(need.norm - magnesium_supplied),
            ),
            _ => *need,
        })
        .collect()
}

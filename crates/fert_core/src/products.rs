//! Fertilizer products and active-ingredient → product mass conversion.
//!
//! Contents are guaranteed nutrient percentages. Report and persistence
//! code relies on these exact figures.

use crate::NitrogenFertilizer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductDef {
    pub name: &'static str,
    /// Percent of the channel's nutrient in the product.
    pub content_pct: f64,
}

pub const POTASSIUM_SULFATE: ProductDef = ProductDef {
    name: "Potassium sulfate",
    content_pct: 52.0,
};

pub const CALCIUM_NITRATE: ProductDef = ProductDef {
    name: "Calcium nitrate",
    content_pct: 26.0,
};

/// Share of calcium nitrate mass that is nitrogen.
pub const CALCIUM_NITRATE_NITROGEN_SHARE: f64 = 0.15;

pub const MAGNESIUM_SULFATE: ProductDef = ProductDef {
    name: "Magnesium sulfate",
    content_pct: 16.0,
};

pub const ORTHOPHOSPHORIC_ACID: ProductDef = ProductDef {
    name: "Orthophosphoric acid",
    content_pct: 68.0,
};

pub const AMMONIUM_NITRATE: ProductDef = ProductDef {
    name: "Ammonium nitrate",
    content_pct: 34.0,
};

pub const UREA: ProductDef = ProductDef {
    name: "Urea",
    content_pct: 46.0,
};

impl NitrogenFertilizer {
    pub fn product(self) -> ProductDef {
        match self {
            NitrogenFertilizer::AmmoniumNitrate => AMMONIUM_NITRATE,
            NitrogenFertilizer::Urea => UREA,
        }
    }
}

/// Products for the five plan channels, in N, P, K, Ca, Mg order.
pub fn channel_products(nitrogen: NitrogenFertilizer) -> [ProductDef; 5] {
    [
        nitrogen.product(),
        ORTHOPHOSPHORIC_ACID,
        POTASSIUM_SULFATE,
        CALCIUM_NITRATE,
        MAGNESIUM_SULFATE,
    ]
}

/// Product mass that delivers `need` kg of active ingredient. Zero, negative
/// and NaN needs all map to zero product.
pub fn product_mass(need: f64, product: ProductDef) -> f64 {
    if need > 0.0 {
        need / product.content_pct * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_by_content_percentage() {
        assert!((product_mass(52.0, POTASSIUM_SULFATE) - 100.0).abs() < 1e-9);
        assert!((product_mass(26.0, CALCIUM_NITRATE) - 100.0).abs() < 1e-9);
        assert!((product_mass(8.0, MAGNESIUM_SULFATE) - 50.0).abs() < 1e-9);
        assert!((product_mass(46.0, UREA) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn phosphorus_dose_round_trips_to_thirty_kg() {
        assert!((product_mass(20.4, ORTHOPHOSPHORIC_ACID) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_and_nan_needs_give_zero() {
        assert!(product_mass(0.0, POTASSIUM_SULFATE).abs() < 1e-12);
        assert!(product_mass(-5.0, POTASSIUM_SULFATE).abs() < 1e-12);
        assert!(product_mass(f64::NAN, POTASSIUM_SULFATE).abs() < 1e-12);
    }

    #[test]
    fn nitrogen_fertilizer_choice_selects_content() {
        assert!((NitrogenFertilizer::AmmoniumNitrate.product().content_pct - 34.0).abs() < 1e-12);
        assert!((NitrogenFertilizer::Urea.product().content_pct - 46.0).abs() < 1e-12);
    }

    #[test]
    fn channel_products_follow_nitrogen_choice() {
        let names = channel_products(NitrogenFertilizer::Urea).map(|product| product.name);
        assert_eq!(
            names,
            [
                "Urea",
                "Orthophosphoric acid",
                "Potassium sulfate",
                "Calcium nitrate",
                "Magnesium sulfate"
            ]
        );
    }
}

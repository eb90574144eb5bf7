//! Fertigation plan: spring correction, product conversion and the weekly
//! split of season totals.

use crate::products::{
    product_mass, CALCIUM_NITRATE, CALCIUM_NITRATE_NITROGEN_SHARE, MAGNESIUM_SULFATE,
    ORTHOPHOSPHORIC_ACID, POTASSIUM_SULFATE,
};
use crate::{
    non_negative, norm_of, Channels, Constants, CropParams, Element, FertigationPlan,
    FertigationSchedule, Needs, NitrogenFertilizer, NutrientNeed, ReferenceContent,
    SpringFertilizerSelection, Totals, WeeklyPlanEntry,
};

/// Fertigation needs after the spring correction, with the rate it used.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringCorrection {
    pub needs: Needs,
    /// kg/ha; `None` when no correction was applied.
    pub rate: Option<f64>,
}

/// Offsets `initial` by what an already applied spring fertilizer supplies.
///
/// Applies only when the selection is enabled, the product carries
/// potassium and there is a potassium need. Without a manual rate, the rate
/// covers `spring_potassium_share` of the K2O need. CaO and MgO are
/// re-derived from the remaining K2O before the product's own Ca and Mg are
/// subtracted.
pub fn apply_spring_correction(
    initial: &[NutrientNeed],
    crop: &CropParams,
    spring: &SpringFertilizerSelection,
    constants: &Constants,
) -> SpringCorrection {
    let initial_potassium = norm_of(initial, Element::Potassium);
    if !spring.enabled || !(spring.potassium_pct > 0.0) || !(initial_potassium > 0.0) {
        return SpringCorrection {
            needs: initial.iter().copied().collect(),
            rate: None,
        };
    }

    let rate = spring.manual_rate.unwrap_or_else(|| {
        initial_potassium * constants.spring_potassium_share / spring.potassium_pct * 100.0
    });
    let supplied = |pct: f64| rate * pct / 100.0;

    let potassium = non_negative(initial_potassium - supplied(spring.potassium_pct));
    let calcium = non_negative(potassium * crop.calcium_factor - supplied(spring.calcium_pct));
    let magnesium =
        non_negative(potassium * crop.magnesium_factor - supplied(spring.magnesium_pct));

    let needs = initial
        .iter()
        .map(|need| {
            let norm = match need.element {
                Element::Nitrogen => non_negative(need.norm - supplied(spring.nitrogen_pct)),
                Element::Phosphorus => non_negative(need.norm - supplied(spring.phosphorus_pct)),
                Element::Potassium => potassium,
                Element::Calcium => calcium,
                Element::Magnesium => magnesium,
                Element::Amendment => need.norm,
            };
            NutrientNeed::new(need.element, norm)
        })
        .collect();

    SpringCorrection {
        needs,
        rate: Some(rate),
    }
}

/// Season totals of physical product, kg/ha, for the adjusted needs.
///
/// Calcium nitrate brings nitrogen along; only the nitrogen still missing
/// after it is bought as `nitrogen_fertilizer`.
pub fn product_totals(needs: &[NutrientNeed], nitrogen_fertilizer: NitrogenFertilizer) -> Totals {
    let calcium = product_mass(norm_of(needs, Element::Calcium), CALCIUM_NITRATE);
    let remaining_nitrogen =
        norm_of(needs, Element::Nitrogen) - calcium * CALCIUM_NITRATE_NITROGEN_SHARE;

    Channels {
        nitrogen: product_mass(remaining_nitrogen, nitrogen_fertilizer.product()),
        phosphorus: product_mass(norm_of(needs, Element::Phosphorus), ORTHOPHOSPHORIC_ACID),
        potassium: product_mass(norm_of(needs, Element::Potassium), POTASSIUM_SULFATE),
        calcium,
        magnesium: product_mass(norm_of(needs, Element::Magnesium), MAGNESIUM_SULFATE),
    }
}

/// Splits `totals` across the schedule's weeks. A length mismatch between
/// weeks and weights is truncated to the shorter list; weeks where every
/// channel stays below `min_product_kg` are left out.
pub fn distribute_weekly(
    totals: &Totals,
    schedule: &FertigationSchedule,
    min_product_kg: f64,
) -> Vec<WeeklyPlanEntry> {
    schedule
        .weeks
        .iter()
        .zip(&schedule.weights)
        .map(|(week, shares)| WeeklyPlanEntry::new(*week, totals.scaled_by(shares)))
        .filter(|entry| !entry.amounts().all_below(min_product_kg))
        .collect()
}

/// Builds the full plan for a crop from its initial fertigation needs.
///
/// A crop without a schedule still gets its spring correction; the plan is
/// then empty with zero totals and `schedule_missing` set.
pub fn fertigation_plan(
    initial: &[NutrientNeed],
    crop: &CropParams,
    spring: &SpringFertilizerSelection,
    nitrogen_fertilizer: NitrogenFertilizer,
    content: &ReferenceContent,
) -> FertigationPlan {
    let constants = &content.constants;
    let correction = apply_spring_correction(initial, crop, spring, constants);

    let Some(schedule) = content.schedule_for(crop) else {
        return FertigationPlan {
            weekly_plan: Vec::new(),
            totals: Totals::ZERO,
            fertilizer_rate: correction.rate,
            adjusted_needs: correction.needs,
            schedule_missing: true,
        };
    };

    let totals = product_totals(&correction.needs, nitrogen_fertilizer);
    let weekly_plan = distribute_weekly(&totals, schedule, constants.weekly_min_product_kg);

    FertigationPlan {
        weekly_plan,
        totals,
        fertilizer_rate: correction.rate,
        adjusted_needs: correction.needs,
        schedule_missing: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_constants, spring_npk, tomato_params, tomato_schedule};
    use smallvec::smallvec;

    fn initial_needs(n: f64, p: f64, k: f64, ca: f64, mg: f64) -> Needs {
        smallvec![
            NutrientNeed::new(Element::Nitrogen, n),
            NutrientNeed::new(Element::Phosphorus, p),
            NutrientNeed::new(Element::Potassium, k),
            NutrientNeed::new(Element::Calcium, ca),
            NutrientNeed::new(Element::Magnesium, mg),
        ]
    }

    #[test]
    fn disabled_selection_passes_needs_through() {
        let initial = initial_needs(200.0, 20.4, 240.0, 96.0, 36.0);
        let spring = SpringFertilizerSelection {
            enabled: false,
            ..spring_npk()
        };
        let correction =
            apply_spring_correction(&initial, &tomato_params(), &spring, &base_constants());
        assert_eq!(correction.needs, initial);
        assert!(correction.rate.is_none());
    }

    #[test]
    fn product_without_potassium_is_not_applied() {
        let initial = initial_needs(200.0, 20.4, 240.0, 96.0, 36.0);
        let spring = SpringFertilizerSelection {
            potassium_pct: 0.0,
            ..spring_npk()
        };
        let correction =
            apply_spring_correction(&initial, &tomato_params(), &spring, &base_constants());
        assert_eq!(correction.needs, initial);
        assert!(correction.rate.is_none());
    }

    #[test]
    fn zero_potassium_need_is_not_corrected() {
        let initial = initial_needs(200.0, 20.4, 0.0, 0.0, 0.0);
        let correction =
            apply_spring_correction(&initial, &tomato_params(), &spring_npk(), &base_constants());
        assert!(correction.rate.is_none());
    }

    #[test]
    fn auto_rate_covers_half_the_potassium() {
        // 16-16-16 product, no Ca/Mg.
        let initial = initial_needs(200.0, 20.4, 240.0, 96.0, 36.0);
        let correction =
            apply_spring_correction(&initial, &tomato_params(), &spring_npk(), &base_constants());

        // rate = 240 * 0.5 / 16 * 100 = 750; each channel supplies 120
        let rate = correction.rate.expect("correction applied");
        assert!((rate - 750.0).abs() < 1e-9);
        assert!((norm_of(&correction.needs, Element::Nitrogen) - 80.0).abs() < 1e-9);
        assert!(norm_of(&correction.needs, Element::Phosphorus).abs() < 1e-9);
        assert!((norm_of(&correction.needs, Element::Potassium) - 120.0).abs() < 1e-9);
        // Ca/Mg follow the remaining K2O: 0.4 * 120, 0.15 * 120
        assert!((norm_of(&correction.needs, Element::Calcium) - 48.0).abs() < 1e-9);
        assert!((norm_of(&correction.needs, Element::Magnesium) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn manual_rate_overrides_auto_rate() {
        let initial = initial_needs(200.0, 20.4, 240.0, 96.0, 36.0);
        let spring = SpringFertilizerSelection {
            manual_rate: Some(100.0),
            calcium_pct: 10.0,
            ..spring_npk()
        };
        let correction =
            apply_spring_correction(&initial, &tomato_params(), &spring, &base_constants());

        assert!((correction.rate.unwrap_or_default() - 100.0).abs() < 1e-9);
        // K2O 240 - 16 = 224; CaO 0.4 * 224 - 10 = 79.6
        assert!((norm_of(&correction.needs, Element::Potassium) - 224.0).abs() < 1e-9);
        assert!((norm_of(&correction.needs, Element::Calcium) - 79.6).abs() < 1e-9);
    }

    #[test]
    fn calcium_nitrate_nitrogen_is_credited() {
        // CaO 26 -> 100 kg calcium nitrate -> 15 kg N
        let needs = initial_needs(49.0, 0.0, 0.0, 26.0, 0.0);
        let totals = product_totals(&needs, NitrogenFertilizer::AmmoniumNitrate);

        assert!((totals.calcium - 100.0).abs() < 1e-9);
        // (49 - 15) / 34 * 100 = 100
        assert!((totals.nitrogen - 100.0).abs() < 1e-9);
    }

    #[test]
    fn nitrogen_covered_by_calcium_nitrate_needs_no_product() {
        let needs = initial_needs(10.0, 0.0, 0.0, 26.0, 0.0);
        let totals = product_totals(&needs, NitrogenFertilizer::Urea);
        assert!(totals.nitrogen.abs() < 1e-12);
    }

    #[test]
    fn urea_needs_less_product_than_ammonium_nitrate() {
        let needs = initial_needs(92.0, 0.0, 0.0, 0.0, 0.0);
        let urea = product_totals(&needs, NitrogenFertilizer::Urea);
        let nitrate = product_totals(&needs, NitrogenFertilizer::AmmoniumNitrate);
        assert!((urea.nitrogen - 200.0).abs() < 1e-9);
        assert!(urea.nitrogen < nitrate.nitrogen);
    }

    #[test]
    fn weekly_values_are_totals_times_shares() {
        let totals = Channels {
            nitrogen: 100.0,
            phosphorus: 30.0,
            potassium: 200.0,
            calcium: 50.0,
            magnesium: 40.0,
        };
        let plan = distribute_weekly(&totals, &tomato_schedule(), 0.01);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].week, 20);
        assert!((plan[0].nitrogen - 20.0).abs() < 1e-9);
        assert!((plan[2].potassium - 100.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_schedule_is_truncated() {
        let mut schedule = tomato_schedule();
        schedule.weeks.truncate(2);
        let totals = Channels {
            nitrogen: 100.0,
            ..Channels::ZERO
        };
        let plan = distribute_weekly(&totals, &schedule, 0.01);
        let weeks: Vec<u32> = plan.iter().map(|entry| entry.week).collect();
        assert_eq!(weeks, vec![20, 21]);
    }
}

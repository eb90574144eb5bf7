use anyhow::{bail, Result};
use fert_core::SpringFertilizerSelection;

/// Rejects a spring fertilizer whose percentages fall outside 0..100 or
/// whose manual rate is negative or not a number.
pub fn check_spring_fertilizer(spring: &SpringFertilizerSelection) -> Result<()> {
    for (field, pct) in [
        ("nitrogen_pct", spring.nitrogen_pct),
        ("phosphorus_pct", spring.phosphorus_pct),
        ("potassium_pct", spring.potassium_pct),
        ("calcium_pct", spring.calcium_pct),
        ("magnesium_pct", spring.magnesium_pct),
    ] {
        if !(0.0..=100.0).contains(&pct) {
            bail!("spring_fertilizer '{field}' must be within 0..100, got {pct}");
        }
    }
    if let Some(rate) = spring.manual_rate {
        if !rate.is_finite() || rate < 0.0 {
            bail!("spring_fertilizer 'manual_rate' must be a non-negative number, got {rate}");
        }
    }
    Ok(())
}

use anyhow::{bail, Result};
use fert_core::Constants;
use std::collections::HashMap;

pub const VALID_KEYS: &[&str] = &[
    "basic_potassium_base_kg",
    "basic_potassium_cec_factor",
    "basic_calcium_cec_factor",
    "basic_magnesium_cec_factor",
    "soil_nitrogen_credit_factor",
    "fertigation_phosphorus_product_kg",
    "liming_ph_threshold",
    "liming_target_ph",
    "liming_tons_per_ph_unit",
    "spring_potassium_share",
    "weekly_min_product_kg",
];

fn field_mut<'a>(constants: &'a mut Constants, key: &str) -> Option<&'a mut f64> {
    let field = match key {
        "basic_potassium_base_kg" => &mut constants.basic_potassium_base_kg,
        "basic_potassium_cec_factor" => &mut constants.basic_potassium_cec_factor,
        "basic_calcium_cec_factor" => &mut constants.basic_calcium_cec_factor,
        "basic_magnesium_cec_factor" => &mut constants.basic_magnesium_cec_factor,
        "soil_nitrogen_credit_factor" => &mut constants.soil_nitrogen_credit_factor,
        "fertigation_phosphorus_product_kg" => &mut constants.fertigation_phosphorus_product_kg,
        "liming_ph_threshold" => &mut constants.liming_ph_threshold,
        "liming_target_ph" => &mut constants.liming_target_ph,
        "liming_tons_per_ph_unit" => &mut constants.liming_tons_per_ph_unit,
        "spring_potassium_share" => &mut constants.spring_potassium_share,
        "weekly_min_product_kg" => &mut constants.weekly_min_product_kg,
        _ => return None,
    };
    Some(field)
}

/// Every tunable constant with its current value, in `VALID_KEYS` order.
pub fn constant_values(constants: &Constants) -> Vec<(&'static str, f64)> {
    let mut copy = constants.clone();
    VALID_KEYS
        .iter()
        .filter_map(|&key| field_mut(&mut copy, key).map(|value| (key, *value)))
        .collect()
}

/// Rejects constants no calculation can use: negative or non-finite values,
/// a spring potassium share above 1, and a liming target below the pH at
/// which liming starts.
pub fn check_constants(constants: &Constants) -> Result<()> {
    for (key, value) in constant_values(constants) {
        if !value.is_finite() || value < 0.0 {
            bail!("constant '{key}' must be a non-negative number, got {value}");
        }
    }
    if constants.spring_potassium_share > 1.0 {
        bail!(
            "constant 'spring_potassium_share' must not exceed 1, got {}",
            constants.spring_potassium_share
        );
    }
    if constants.liming_target_ph < constants.liming_ph_threshold {
        bail!(
            "constant 'liming_target_ph' ({}) must not be below 'liming_ph_threshold' ({})",
            constants.liming_target_ph,
            constants.liming_ph_threshold
        );
    }
    Ok(())
}

/// Applies `key -> number` overrides on top of loaded constants.
///
/// Unknown keys and non-numeric values are errors; so is any result that
/// `check_constants` rejects.
pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        let Some(field) = field_mut(constants, key) else {
            bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            );
        };
        *field = as_f64(key, value)?;
        tracing::debug!(key = %key, value = *field, "constant overridden");
    }
    check_constants(constants)
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_constants() -> Constants {
        serde_json::from_str(include_str!("../../../content/constants.json")).unwrap()
    }

    #[test]
    fn test_apply_override() {
        let mut constants = default_constants();
        let overrides = HashMap::from([(
            "basic_magnesium_cec_factor".to_string(),
            serde_json::json!(8.0),
        )]);
        apply_overrides(&mut constants, &overrides).unwrap();
        assert!((constants.basic_magnesium_cec_factor - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_integer_json_is_accepted() {
        let mut constants = default_constants();
        let overrides = HashMap::from([(
            "fertigation_phosphorus_product_kg".to_string(),
            serde_json::json!(40),
        )]);
        apply_overrides(&mut constants, &overrides).unwrap();
        assert!((constants.fertigation_phosphorus_product_kg - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_key_errors() {
        let mut constants = default_constants();
        let overrides = HashMap::from([("bogus_key".to_string(), serde_json::json!(1))]);
        let err = apply_overrides(&mut constants, &overrides).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bogus_key"));
        assert!(message.contains("liming_target_ph"));
    }

    #[test]
    fn test_non_number_errors() {
        let mut constants = default_constants();
        let overrides = HashMap::from([(
            "liming_target_ph".to_string(),
            serde_json::json!("seven"),
        )]);
        let err = apply_overrides(&mut constants, &overrides).unwrap_err();
        assert!(err.to_string().contains("expected a number"));
    }

    #[test]
    fn test_negative_override_rejected() {
        let mut constants = default_constants();
        let overrides = HashMap::from([(
            "weekly_min_product_kg".to_string(),
            serde_json::json!(-0.5),
        )]);
        let err = apply_overrides(&mut constants, &overrides).unwrap_err();
        assert!(err.to_string().contains("weekly_min_product_kg"));
    }

    #[test]
    fn test_share_above_one_rejected() {
        let mut constants = default_constants();
        let overrides = HashMap::from([(
            "spring_potassium_share".to_string(),
            serde_json::json!(1.5),
        )]);
        assert!(apply_overrides(&mut constants, &overrides).is_err());
    }

    #[test]
    fn test_liming_target_below_threshold_rejected() {
        let mut constants = default_constants();
        let overrides = HashMap::from([("liming_target_ph".to_string(), serde_json::json!(6.0))]);
        let err = apply_overrides(&mut constants, &overrides).unwrap_err();
        assert!(err.to_string().contains("liming_ph_threshold"));

        let mut constants = default_constants();
        let overrides = HashMap::from([(
            "liming_ph_threshold".to_string(),
            serde_json::json!(constants.liming_target_ph),
        )]);
        apply_overrides(&mut constants, &overrides).unwrap();
    }

    #[test]
    fn test_every_valid_key_is_settable() {
        let mut constants = default_constants();
        for key in VALID_KEYS {
            assert!(field_mut(&mut constants, key).is_some(), "{key}");
        }
        assert_eq!(constant_values(&constants).len(), VALID_KEYS.len());
    }

    #[test]
    fn test_empty_overrides_noop() {
        let mut constants = default_constants();
        let before = constants.clone();
        apply_overrides(&mut constants, &HashMap::new()).unwrap();
        assert_eq!(constant_values(&constants), constant_values(&before));
    }
}

//! Shared test fixtures for fert_core and downstream crates.
//!
//! `base_content()` is a small self-contained `ReferenceContent`: one crop
//! with a schedule (tomato), one crop without (cabbage), one liming material.
//! Numbers are chosen so expected values can be worked out by hand.

use ahash::AHashMap;

use crate::{
    AmendmentDef, AmendmentId, Channels, Constants, CropId, CropParams, FertigationSchedule,
    PotassiumRange, ReferenceContent, ScheduleKey, SoilAnalysis, SoilCropRecord,
    SpringFertilizerSelection,
};

pub fn base_constants() -> Constants {
    Constants {
        basic_potassium_base_kg: 110.0,
        basic_potassium_cec_factor: 2.5,
        basic_calcium_cec_factor: 130.0,
        basic_magnesium_cec_factor: 10.0,
        soil_nitrogen_credit_factor: 3.0,
        fertigation_phosphorus_product_kg: 30.0,
        liming_ph_threshold: 6.8,
        liming_target_ph: 7.0,
        liming_tons_per_ph_unit: 5.0,
        spring_potassium_share: 0.5,
        weekly_min_product_kg: 0.01,
    }
}

fn range(min: f64, max: f64, value: f64) -> PotassiumRange {
    PotassiumRange { min, max, value }
}

/// Tomato: 3 kg N/t, K2O 300/240/180/120/60 by 100 mg/kg steps, Ca 0.4, Mg 0.15.
pub fn tomato_params() -> CropParams {
    CropParams {
        id: CropId::from("Томат"),
        schedule_key: ScheduleKey::from("tomato"),
        nitrogen_factor: 3.0,
        potassium_ranges: vec![
            range(0.0, 100.0, 300.0),
            range(100.0, 200.0, 240.0),
            range(200.0, 300.0, 180.0),
            range(300.0, 400.0, 120.0),
            range(400.0, f64::INFINITY, 60.0),
        ],
        calcium_factor: 0.4,
        magnesium_factor: 0.15,
    }
}

/// Same shape as tomato but pointing at a schedule that does not exist.
pub fn cabbage_params() -> CropParams {
    CropParams {
        id: CropId::from("Капуста"),
        schedule_key: ScheduleKey::from("cabbage"),
        ..tomato_params()
    }
}

fn uniform(share: f64) -> Channels {
    Channels {
        nitrogen: share,
        phosphorus: share,
        potassium: share,
        calcium: share,
        magnesium: share,
    }
}

/// Weeks 20–23 with shares 0.2 / 0.3 / 0.5 / 0 on every channel.
pub fn tomato_schedule() -> FertigationSchedule {
    FertigationSchedule {
        key: ScheduleKey::from("tomato"),
        weeks: vec![20, 21, 22, 23],
        weights: vec![uniform(0.2), uniform(0.3), uniform(0.5), uniform(0.0)],
    }
}

/// 300 kg CaO and 180 kg MgO per ton.
pub fn dolomite() -> AmendmentDef {
    AmendmentDef {
        id: AmendmentId::from("dolomite_flour"),
        name: "Доломитовая мука".to_string(),
        calcium_kg_per_ton: 300.0,
        magnesium_kg_per_ton: 180.0,
    }
}

/// Enabled 16-16-16 product without Ca or Mg, auto rate.
pub fn spring_npk() -> SpringFertilizerSelection {
    SpringFertilizerSelection {
        enabled: true,
        nitrogen_pct: 16.0,
        phosphorus_pct: 16.0,
        potassium_pct: 16.0,
        calcium_pct: 0.0,
        magnesium_pct: 0.0,
        manual_rate: None,
    }
}

pub fn tomato_soil() -> SoilAnalysis {
    SoilAnalysis {
        nitrate_nitrogen: 10.0,
        ph: 6.5,
        phosphorus: 25.0,
        potassium: 150.0,
        calcium: 1200.0,
        magnesium: 120.0,
        cec: 15.0,
    }
}

/// `tomato_soil()` as form text, 80 t/ha planned.
pub fn tomato_record() -> SoilCropRecord {
    SoilCropRecord {
        crop: "Томат".to_string(),
        planned_yield: "80".to_string(),
        nitrate_nitrogen: "10".to_string(),
        ph: "6.5".to_string(),
        phosphorus: "25".to_string(),
        potassium: "150".to_string(),
        calcium: "1200".to_string(),
        magnesium: "120".to_string(),
        cec: "15".to_string(),
    }
}

pub fn base_content() -> ReferenceContent {
    let tomato = tomato_params();
    let cabbage = cabbage_params();
    let schedule = tomato_schedule();
    let material = dolomite();
    ReferenceContent {
        content_version: "test".to_string(),
        crops: AHashMap::from_iter([(tomato.id.clone(), tomato), (cabbage.id.clone(), cabbage)]),
        schedules: AHashMap::from_iter([(schedule.key.clone(), schedule)]),
        amendments: AHashMap::from_iter([(material.id.clone(), material)]),
        constants: base_constants(),
    }
}

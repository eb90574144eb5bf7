//! Type definitions for `fert_core`.
//!
//! Reference-table types, calculation inputs and calculation outputs. All
//! outputs are plain values: calculators build new ones instead of mutating.

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(CropId);
string_id!(ScheduleKey);
string_id!(AmendmentId);

// ---------------------------------------------------------------------------
// Nutrient needs
// ---------------------------------------------------------------------------

/// Nutrient element of a norm. Serialized with the agronomic tokens that
/// downstream report and fertilizer-selection code use as dictionary keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P2O5")]
    Phosphorus,
    #[serde(rename = "K2O")]
    Potassium,
    #[serde(rename = "CaO")]
    Calcium,
    #[serde(rename = "MgO")]
    Magnesium,
    /// Liming material, not a nutrient. Only present in basic needs.
    Amendment,
}

impl Element {
    pub fn token(self) -> &'static str {
        match self {
            Element::Nitrogen => "N",
            Element::Phosphorus => "P2O5",
            Element::Potassium => "K2O",
            Element::Calcium => "CaO",
            Element::Magnesium => "MgO",
            Element::Amendment => "Amendment",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.token())
    }
}

/// Application norm for one element, kg of active ingredient per hectare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientNeed {
    pub element: Element,
    pub norm: f64,
}

impl NutrientNeed {
    pub fn new(element: Element, norm: f64) -> Self {
        Self { element, norm }
    }
}

/// Need lists hold at most six entries, so they stay on the stack.
pub type Needs = SmallVec<[NutrientNeed; 6]>;

/// Norm for `element`, or 0 when the list has no such entry.
pub fn norm_of(needs: &[NutrientNeed], element: Element) -> f64 {
    needs
        .iter()
        .find(|need| need.element == element)
        .map_or(0.0, |need| need.norm)
}

// ---------------------------------------------------------------------------
// Soil input
// ---------------------------------------------------------------------------

/// Parsed soil-test snapshot. Any field may be NaN when the source string
/// did not parse; calculators let NaN flow through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilAnalysis {
    /// Nitrate nitrogen, mg/kg.
    pub nitrate_nitrogen: f64,
    pub ph: f64,
    /// mg/kg
    pub phosphorus: f64,
    /// mg/kg
    pub potassium: f64,
    /// mg/kg
    pub calcium: f64,
    /// mg/kg
    pub magnesium: f64,
    /// Cation-exchange capacity, mEq/100g.
    pub cec: f64,
}

// ---------------------------------------------------------------------------
// Reference tables
// ---------------------------------------------------------------------------

/// One step of a crop's soluble-potassium table. `max` is inclusive; an
/// unbounded top range is written as `null` in content and held as infinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotassiumRange {
    pub min: f64,
    #[serde(deserialize_with = "upper_bound")]
    pub max: f64,
    /// K2O norm, kg/ha.
    pub value: f64,
}

fn upper_bound<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let bound: Option<f64> = Option::deserialize(deserializer)?;
    Ok(bound.unwrap_or(f64::INFINITY))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropParams {
    pub id: CropId,
    /// References a `FertigationSchedule` key. May have no schedule.
    pub schedule_key: ScheduleKey,
    /// kg N per ton of planned yield.
    pub nitrogen_factor: f64,
    pub potassium_ranges: Vec<PotassiumRange>,
    /// CaO need as a ratio of soluble K2O need.
    pub calcium_factor: f64,
    /// MgO need as a ratio of soluble K2O need.
    pub magnesium_factor: f64,
}

/// Physical-product amounts (or distribution shares) for the five
/// fertigation channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Channels {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub calcium: f64,
    pub magnesium: f64,
}

impl Channels {
    pub const ZERO: Channels = Channels {
        nitrogen: 0.0,
        phosphorus: 0.0,
        potassium: 0.0,
        calcium: 0.0,
        magnesium: 0.0,
    };

    /// Channel-wise product with a set of shares.
    pub fn scaled_by(&self, shares: &Channels) -> Channels {
        Channels {
            nitrogen: self.nitrogen * shares.nitrogen,
            phosphorus: self.phosphorus * shares.phosphorus,
            potassium: self.potassium * shares.potassium,
            calcium: self.calcium * shares.calcium,
            magnesium: self.magnesium * shares.magnesium,
        }
    }

    pub fn values(&self) -> [f64; 5] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.calcium,
            self.magnesium,
        ]
    }

    pub fn all_below(&self, threshold: f64) -> bool {
        self.values().iter().all(|value| *value < threshold)
    }
}

/// Season-aggregated physical product mass, kg/ha.
pub type Totals = Channels;

/// Per-week shares of the season total, 0..1.
pub type DistributionWeights = Channels;

/// Weekly split of a crop's season. `weights[i]` belongs to `weeks[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertigationSchedule {
    pub key: ScheduleKey,
    /// Calendar week numbers, ascending.
    pub weeks: Vec<u32>,
    pub weights: Vec<DistributionWeights>,
}

/// Liming material and what one ton of it supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendmentDef {
    pub id: AmendmentId,
    pub name: String,
    /// kg CaO per ton of material.
    pub calcium_kg_per_ton: f64,
    /// kg MgO per ton of material.
    pub magnesium_kg_per_ton: f64,
}

/// Tunable formula coefficients, loaded from `constants.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub basic_potassium_base_kg: f64,
    pub basic_potassium_cec_factor: f64,
    pub basic_calcium_cec_factor: f64,
    /// Multiplier of CEC in the basic MgO norm. Older tables used 8.
    pub basic_magnesium_cec_factor: f64,
    /// kg N credited per mg/kg of soil nitrate nitrogen.
    pub soil_nitrogen_credit_factor: f64,
    /// Orthophosphoric acid applied every season regardless of soil P, kg/ha.
    pub fertigation_phosphorus_product_kg: f64,
    pub liming_ph_threshold: f64,
    pub liming_target_ph: f64,
    pub liming_tons_per_ph_unit: f64,
    /// Share of the soluble K2O need an auto-rated spring fertilizer covers.
    pub spring_potassium_share: f64,
    /// Weeks where every channel is below this, kg/ha, are left out of a plan.
    pub weekly_min_product_kg: f64,
}

/// All read-only reference data the calculators consult.
#[derive(Debug, Clone)]
pub struct ReferenceContent {
    pub content_version: String,
    pub crops: AHashMap<CropId, CropParams>,
    pub schedules: AHashMap<ScheduleKey, FertigationSchedule>,
    pub amendments: AHashMap<AmendmentId, AmendmentDef>,
    pub constants: Constants,
}

impl ReferenceContent {
    pub fn crop(&self, id: &CropId) -> Option<&CropParams> {
        self.crops.get(id)
    }

    pub fn schedule_for(&self, crop: &CropParams) -> Option<&FertigationSchedule> {
        self.schedules.get(&crop.schedule_key)
    }

    pub fn amendment(&self, id: &AmendmentId) -> Option<&AmendmentDef> {
        self.amendments.get(id)
    }
}

// ---------------------------------------------------------------------------
// Fertigation plan inputs and outputs
// ---------------------------------------------------------------------------

/// Supplemental fertilizer already applied early in the season.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringFertilizerSelection {
    pub enabled: bool,
    /// Nutrient content of the product, percent 0..100.
    pub nitrogen_pct: f64,
    pub phosphorus_pct: f64,
    pub potassium_pct: f64,
    pub calcium_pct: f64,
    pub magnesium_pct: f64,
    /// Rate entered by the user, kg/ha. When absent the rate is derived
    /// from the potassium need.
    pub manual_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NitrogenFertilizer {
    #[default]
    AmmoniumNitrate,
    Urea,
}

/// Physical product mass for one calendar week, kg/ha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlanEntry {
    pub week: u32,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub calcium: f64,
    pub magnesium: f64,
}

impl WeeklyPlanEntry {
    pub fn new(week: u32, amounts: Channels) -> Self {
        Self {
            week,
            nitrogen: amounts.nitrogen,
            phosphorus: amounts.phosphorus,
            potassium: amounts.potassium,
            calcium: amounts.calcium,
            magnesium: amounts.magnesium,
        }
    }

    pub fn amounts(&self) -> Channels {
        Channels {
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            calcium: self.calcium,
            magnesium: self.magnesium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertigationPlan {
    pub weekly_plan: Vec<WeeklyPlanEntry>,
    pub totals: Totals,
    /// Spring-fertilizer rate used for the correction, kg/ha.
    pub fertilizer_rate: Option<f64>,
    /// Fertigation needs after the spring correction, kg a.i./ha.
    pub adjusted_needs: Needs,
    /// True when the crop has no weekly schedule; plan and totals are empty.
    pub schedule_missing: bool,
}

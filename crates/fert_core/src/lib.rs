//! Deterministic fertilizer-needs and fertigation-plan engine.
//!
//! No IO. Every calculation is a pure function of its inputs and the
//! read-only `ReferenceContent`; malformed numbers travel as NaN instead of
//! failing.

pub mod amendment;
pub mod basic;
pub mod fertigation;
pub mod plan;
pub mod products;
mod recommend;
mod soil;
pub mod tables;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;

pub use amendment::{amendment_rate_tons, apply_amendment};
pub use basic::{basic_needs, basic_needs_for};
pub use fertigation::{fertigation_needs, fertigation_needs_for};
pub use plan::{
    apply_spring_correction, distribute_weekly, fertigation_plan, product_totals,
    SpringCorrection,
};
pub use recommend::{recommend, Recommendation, RecommendationRequest};
pub use soil::{parse_number, ParsedRecord, SoilCropRecord};
pub use tables::TableError;
pub use types::*;

/// `max(0, value)` that keeps NaN as NaN.
pub(crate) fn non_negative(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests;

use fert_core::{recommend, Recommendation, ReferenceContent};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::BatchConfig;
use crate::input::FieldRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Ok,
    UnsupportedCrop,
    ScheduleMissing,
}

impl RowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RowStatus::Ok => "ok",
            RowStatus::UnsupportedCrop => "unsupported_crop",
            RowStatus::ScheduleMissing => "schedule_missing",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RowResult {
    pub field_id: String,
    pub status: RowStatus,
    pub recommendation: Option<Recommendation>,
}

pub fn evaluate_row(
    row: &FieldRecord,
    config: &BatchConfig,
    content: &ReferenceContent,
) -> RowResult {
    let request = config.request_for(row.record.clone());
    let recommendation = recommend(&request, content);
    let status = match &recommendation {
        None => RowStatus::UnsupportedCrop,
        Some(rec) if rec.plan.schedule_missing => RowStatus::ScheduleMissing,
        Some(_) => RowStatus::Ok,
    };
    if status != RowStatus::Ok {
        tracing::debug!(
            field_id = %row.field_id,
            crop = %row.record.crop,
            status = status.as_str(),
            "row evaluated without a weekly plan"
        );
    }
    RowResult {
        field_id: row.field_id.clone(),
        status,
        recommendation,
    }
}

/// Evaluates all rows in parallel; results keep input order.
pub fn run_rows(
    rows: &[FieldRecord],
    config: &BatchConfig,
    content: &ReferenceContent,
) -> Vec<RowResult> {
    rows.par_iter()
        .map(|row| evaluate_row(row, config, content))
        .collect()
}

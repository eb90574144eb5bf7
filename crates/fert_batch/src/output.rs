use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::runner::RowResult;

/// Write JSON atomically: write to `.tmp` then rename.
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {}", path.display()))?;
    let mut file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {}", tmp_path.display()))?;
    Ok(())
}

#[derive(Serialize)]
struct WeeklyRow<'a> {
    field_id: &'a str,
    week: u32,
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    calcium: f64,
    magnesium: f64,
}

/// One CSV line per field and week, for rows that have a weekly plan.
/// Returns the number of lines written.
pub fn write_weekly_plan_csv(results: &[RowResult], path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut lines = 0;
    for result in results {
        let Some(recommendation) = &result.recommendation else {
            continue;
        };
        for entry in &recommendation.plan.weekly_plan {
            writer
                .serialize(WeeklyRow {
                    field_id: &result.field_id,
                    week: entry.week,
                    nitrogen: entry.nitrogen,
                    phosphorus: entry.phosphorus,
                    potassium: entry.potassium,
                    calcium: entry.calcium,
                    magnesium: entry.magnesium,
                })
                .with_context(|| format!("writing {}", path.display()))?;
            lines += 1;
        }
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(lines)
}

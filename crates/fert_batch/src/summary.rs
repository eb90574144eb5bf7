use fert_core::Totals;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::runner::{RowResult, RowStatus};

type Extractor = (&'static str, fn(&Totals) -> f64);

const CHANNELS: [Extractor; 5] = [
    ("nitrogen", |t| t.nitrogen),
    ("phosphorus", |t| t.phosphorus),
    ("potassium", |t| t.potassium),
    ("calcium", |t| t.calcium),
    ("magnesium", |t| t.magnesium),
];

#[derive(Debug, Serialize)]
pub struct ChannelSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub row_count: usize,
    pub status_counts: BTreeMap<&'static str, usize>,
    /// Season product totals over rows with a weekly plan.
    pub totals: Vec<ChannelSummary>,
}

pub fn compute_summary(results: &[RowResult]) -> SummaryStats {
    let mut status_counts = BTreeMap::new();
    for status in [
        RowStatus::Ok,
        RowStatus::UnsupportedCrop,
        RowStatus::ScheduleMissing,
    ] {
        status_counts.insert(status.as_str(), 0);
    }
    for result in results {
        *status_counts.entry(result.status.as_str()).or_insert(0) += 1;
    }

    let planned: Vec<&Totals> = results
        .iter()
        .filter(|r| r.status == RowStatus::Ok)
        .filter_map(|r| r.recommendation.as_ref())
        .map(|rec| &rec.plan.totals)
        .collect();

    let totals = if planned.is_empty() {
        Vec::new()
    } else {
        CHANNELS
            .iter()
            .map(|(name, extract)| {
                let values: Vec<f64> = planned.iter().map(|t| extract(t)).collect();
                compute_channel_summary(name, &values)
            })
            .collect()
    };

    SummaryStats {
        row_count: results.len(),
        status_counts,
        totals,
    }
}

fn compute_channel_summary(name: &str, values: &[f64]) -> ChannelSummary {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ChannelSummary {
        name: name.to_string(),
        mean,
        min,
        max,
    }
}

/// `{ "nitrogen": { "mean": ..., "min": ..., "max": ... }, ... }`
pub fn aggregated_totals(stats: &SummaryStats) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for channel in &stats.totals {
        map.insert(
            channel.name.clone(),
            serde_json::json!({
                "mean": channel.mean,
                "min": channel.min,
                "max": channel.max,
            }),
        );
    }
    serde_json::Value::Object(map)
}

pub fn print_summary(batch_name: &str, stats: &SummaryStats) {
    println!("\n=== {} ({} rows) ===\n", batch_name, stats.row_count);
    for (status, count) in &stats.status_counts {
        println!("{status:<20} {count}");
    }
    if stats.totals.is_empty() {
        println!("\nNo rows produced a weekly plan.");
        return;
    }
    println!(
        "\n{:<20} {:>10} {:>10} {:>10}",
        "Product kg/ha", "Mean", "Min", "Max"
    );
    println!("{}", "-".repeat(53));
    for channel in &stats.totals {
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2}",
            channel.name, channel.mean, channel.min, channel.max
        );
    }
}

//! Lookups into and structural checks of the reference tables.

use thiserror::Error;

use crate::{Channels, FertigationSchedule, PotassiumRange};

/// Tolerance for schedule shares summing to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

const BOUND_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("potassium table is empty")]
    EmptyRanges,
    #[error("potassium table starts at {min} instead of 0")]
    DoesNotStartAtZero { min: f64 },
    #[error("potassium range {index} has min {min} above max {max}")]
    InvertedRange { index: usize, min: f64, max: f64 },
    #[error("potassium ranges {index} and {next} leave a gap between {max} and {min}", next = .index + 1)]
    Gap { index: usize, max: f64, min: f64 },
    #[error("potassium ranges {index} and {next} overlap between {min} and {max}", next = .index + 1)]
    Overlap { index: usize, max: f64, min: f64 },
    #[error("potassium table ends at {max} instead of being unbounded")]
    BoundedTop { max: f64 },
    #[error("potassium range {index} has negative value {value}")]
    NegativeValue { index: usize, value: f64 },
    #[error("schedule has no weeks")]
    EmptySchedule,
    #[error("schedule lists {weeks} weeks but {weights} weight rows")]
    LengthMismatch { weeks: usize, weights: usize },
    #[error("schedule week {week} does not follow week {previous}")]
    WeeksNotAscending { previous: u32, week: u32 },
    #[error("schedule week {week} has a negative {channel} share")]
    NegativeWeight { week: u32, channel: &'static str },
    #[error("schedule {channel} shares sum to {sum} instead of 1.0")]
    WeightSum { channel: &'static str, sum: f64 },
}

/// K2O norm of the first range with `min <= soil_k <= max`.
pub fn potassium_for(ranges: &[PotassiumRange], soil_k: f64) -> Option<f64> {
    ranges
        .iter()
        .find(|range| range.min <= soil_k && soil_k <= range.max)
        .map(|range| range.value)
}

/// Ranges must cover `[0, ∞)` with each range starting where the previous
/// one ends. A shared boundary value belongs to the lower range.
pub fn check_potassium_ranges(ranges: &[PotassiumRange]) -> Result<(), TableError> {
    let first = ranges.first().ok_or(TableError::EmptyRanges)?;
    if first.min.abs() > BOUND_TOLERANCE {
        return Err(TableError::DoesNotStartAtZero { min: first.min });
    }
    for (index, range) in ranges.iter().enumerate() {
        if range.min > range.max {
            return Err(TableError::InvertedRange {
                index,
                min: range.min,
                max: range.max,
            });
        }
        if range.value < 0.0 {
            return Err(TableError::NegativeValue {
                index,
                value: range.value,
            });
        }
    }
    for (index, pair) in ranges.windows(2).enumerate() {
        let (lower, upper) = (&pair[0], &pair[1]);
        if (upper.min - lower.max).abs() > BOUND_TOLERANCE {
            return Err(if upper.min > lower.max {
                TableError::Gap {
                    index,
                    max: lower.max,
                    min: upper.min,
                }
            } else {
                TableError::Overlap {
                    index,
                    max: lower.max,
                    min: upper.min,
                }
            });
        }
    }
    match ranges.last() {
        Some(last) if last.max.is_finite() => Err(TableError::BoundedTop { max: last.max }),
        _ => Ok(()),
    }
}

/// Per-channel sum of a schedule's shares.
pub fn channel_sums(schedule: &FertigationSchedule) -> Channels {
    schedule
        .weights
        .iter()
        .fold(Channels::ZERO, |acc, w| Channels {
            nitrogen: acc.nitrogen + w.nitrogen,
            phosphorus: acc.phosphorus + w.phosphorus,
            potassium: acc.potassium + w.potassium,
            calcium: acc.calcium + w.calcium,
            magnesium: acc.magnesium + w.magnesium,
        })
}

const CHANNEL_NAMES: [&str; 5] = ["nitrogen", "phosphorus", "potassium", "calcium", "magnesium"];

pub fn check_schedule(schedule: &FertigationSchedule) -> Result<(), TableError> {
    if schedule.weeks.is_empty() {
        return Err(TableError::EmptySchedule);
    }
    if schedule.weeks.len() != schedule.weights.len() {
        return Err(TableError::LengthMismatch {
            weeks: schedule.weeks.len(),
            weights: schedule.weights.len(),
        });
    }
    for pair in schedule.weeks.windows(2) {
        if pair[1] <= pair[0] {
            return Err(TableError::WeeksNotAscending {
                previous: pair[0],
                week: pair[1],
            });
        }
    }
    for (week, weights) in schedule.weeks.iter().zip(&schedule.weights) {
        for (channel, share) in CHANNEL_NAMES.into_iter().zip(weights.values()) {
            if share < 0.0 {
                return Err(TableError::NegativeWeight {
                    week: *week,
                    channel,
                });
            }
        }
    }
    for (channel, sum) in CHANNEL_NAMES.into_iter().zip(channel_sums(schedule).values()) {
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(TableError::WeightSum { channel, sum });
        }
    }
    Ok(())
}

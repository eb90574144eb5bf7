//! Parsing of string-typed soil and crop records.
//!
//! Form inputs arrive as text. Parsing never fails: a value that is not a
//! number becomes NaN and flows through the formulas.

use serde::{Deserialize, Serialize};

use crate::{CropId, SoilAnalysis};

/// A soil/crop record as received from a form or a CSV row. Missing fields
/// read as empty text and so parse as NaN.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilCropRecord {
    pub crop: String,
    /// t/ha
    pub planned_yield: String,
    pub nitrate_nitrogen: String,
    pub ph: String,
    pub phosphorus: String,
    pub potassium: String,
    pub calcium: String,
    pub magnesium: String,
    pub cec: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub crop: CropId,
    pub planned_yield: f64,
    pub soil: SoilAnalysis,
}

impl SoilCropRecord {
    pub fn parse(&self) -> ParsedRecord {
        ParsedRecord {
            crop: CropId(self.crop.trim().to_string()),
            planned_yield: parse_number(&self.planned_yield),
            soil: SoilAnalysis {
                nitrate_nitrogen: parse_number(&self.nitrate_nitrogen),
                ph: parse_number(&self.ph),
                phosphorus: parse_number(&self.phosphorus),
                potassium: parse_number(&self.potassium),
                calcium: parse_number(&self.calcium),
                magnesium: parse_number(&self.magnesium),
                cec: parse_number(&self.cec),
            },
        }
    }
}

/// Parses a decimal number, accepting `,` as the decimal separator.
/// Returns NaN for anything else.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.replace(',', ".").parse::<f64>().unwrap_or(f64::NAN)
}

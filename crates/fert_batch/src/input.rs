use anyhow::{bail, Context, Result};
use fert_core::SoilCropRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// One CSV row: a field identifier plus the record columns, kept as text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InputRow {
    field_id: String,
    crop: String,
    planned_yield: String,
    nitrate_nitrogen: String,
    ph: String,
    phosphorus: String,
    potassium: String,
    calcium: String,
    magnesium: String,
    cec: String,
}

#[derive(Debug, Clone)]
pub struct FieldRecord {
    pub field_id: String,
    pub record: SoilCropRecord,
}

impl From<InputRow> for FieldRecord {
    fn from(row: InputRow) -> Self {
        Self {
            field_id: row.field_id,
            record: SoilCropRecord {
                crop: row.crop,
                planned_yield: row.planned_yield,
                nitrate_nitrogen: row.nitrate_nitrogen,
                ph: row.ph,
                phosphorus: row.phosphorus,
                potassium: row.potassium,
                calcium: row.calcium,
                magnesium: row.magnesium,
                cec: row.cec,
            },
        }
    }
}

/// Rows read from an analyses CSV, plus how many lines were skipped.
#[derive(Debug)]
pub struct LoadedRows {
    pub rows: Vec<FieldRecord>,
    pub skipped: usize,
}

/// Reads the analyses CSV. Lines that cannot be read or have no `field_id`
/// are skipped with a warning; an input without a single usable row is an
/// error.
pub fn load_rows(path: &Path) -> Result<LoadedRows> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening analyses file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?;
    if !headers.iter().any(|header| header == "field_id") {
        bail!("{} has no 'field_id' column", path.display());
    }

    let mut rows = Vec::new();
    let mut skipped = 0;
    let mut seen = HashSet::new();
    for (index, result) in reader.deserialize::<InputRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!(line, "skipping unreadable row: {err}");
                skipped += 1;
                continue;
            }
        };
        if row.field_id.is_empty() {
            tracing::warn!(line, "skipping row without field_id");
            skipped += 1;
            continue;
        }
        if !seen.insert(row.field_id.clone()) {
            tracing::warn!(line, field_id = %row.field_id, "duplicate field_id");
        }
        rows.push(FieldRecord::from(row));
    }

    if rows.is_empty() {
        bail!("{} contains no usable rows", path.display());
    }
    Ok(LoadedRows { rows, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    const HEADER: &str =
        "field_id,crop,planned_yield,nitrate_nitrogen,ph,phosphorus,potassium,calcium,magnesium,cec";

    #[test]
    fn test_reads_rows_in_order() {
        let file = write_csv(&[
            HEADER,
            "F1,Томат,80,10,6.5,25,150,1200,120,15",
            "F2, Огурец ,60,12,\"6,2\",18,240,900,90,12",
        ]);
        let loaded = load_rows(file.path()).unwrap();
        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.rows[0].field_id, "F1");
        assert_eq!(loaded.rows[1].record.crop, "Огурец");
        assert_eq!(loaded.rows[1].record.ph, "6,2");
    }

    #[test]
    fn test_missing_columns_read_as_empty() {
        let file = write_csv(&["field_id,crop,planned_yield", "F1,Томат,80"]);
        let loaded = load_rows(file.path()).unwrap();
        let record = &loaded.rows[0].record;
        assert_eq!(record.planned_yield, "80");
        assert!(record.cec.is_empty());
    }

    #[test]
    fn test_rows_without_field_id_are_skipped() {
        let file = write_csv(&[
            HEADER,
            ",Томат,80,10,6.5,25,150,1200,120,15",
            "F2,Томат,80,10,6.5,25,150,1200,120,15",
        ]);
        let loaded = load_rows(file.path()).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].field_id, "F2");
    }

    #[test]
    fn test_missing_field_id_column_fails() {
        let file = write_csv(&["crop,planned_yield", "Томат,80"]);
        let err = load_rows(file.path()).unwrap_err();
        assert!(err.to_string().contains("field_id"));
    }

    #[test]
    fn test_header_only_fails() {
        let file = write_csv(&[HEADER]);
        assert!(load_rows(file.path()).is_err());
    }
}

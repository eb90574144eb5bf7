//! Reference content loading shared between fert_cli and fert_batch.
//!
//! Crop parameters, weekly distribution tables, liming materials and engine
//! constants live in `content/*.json`. They are parsed once into immutable
//! keyed maps and checked before any calculation sees them.

mod overrides;
mod selection;

use std::hash::Hash;
use std::path::Path;
use std::sync::OnceLock;

use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use fert_core::tables::{check_potassium_ranges, check_schedule};
use fert_core::{AmendmentDef, Constants, CropParams, FertigationSchedule, ReferenceContent};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use overrides::{apply_overrides, check_constants, constant_values, VALID_KEYS};
pub use selection::check_spring_fertilizer;

#[derive(Deserialize)]
struct CropsFile {
    content_version: String,
    crops: Vec<CropParams>,
}

#[derive(Deserialize)]
struct SchedulesFile {
    schedules: Vec<FertigationSchedule>,
}

#[derive(Deserialize)]
struct AmendmentsFile {
    amendments: Vec<AmendmentDef>,
}

/// Raw text of the four content files.
struct ContentSources<'a> {
    constants: &'a str,
    crops: &'a str,
    schedules: &'a str,
    amendments: &'a str,
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a potassium table with a gap, a schedule whose
/// shares do not add up to 1.0, or a liming material with a negative supply
/// rate. A crop whose schedule key has no schedule is only logged; the
/// engine reports that state to the user.
pub fn validate_content(content: &ReferenceContent) {
    if let Err(err) = check_constants(&content.constants) {
        panic!("constants.json: {err}");
    }

    for crop in content.crops.values() {
        if let Err(err) = check_potassium_ranges(&crop.potassium_ranges) {
            panic!("crop '{}' {err}", crop.id);
        }
        for (name, factor) in [
            ("nitrogen_factor", crop.nitrogen_factor),
            ("calcium_factor", crop.calcium_factor),
            ("magnesium_factor", crop.magnesium_factor),
        ] {
            assert!(
                factor.is_finite() && factor >= 0.0,
                "crop '{}' has invalid {name}: {factor}",
                crop.id,
            );
        }
        if !content.schedules.contains_key(&crop.schedule_key) {
            tracing::warn!(
                crop = %crop.id,
                schedule = %crop.schedule_key,
                "crop has no fertigation schedule; plans for it will be empty"
            );
        }
    }

    for schedule in content.schedules.values() {
        if let Err(err) = check_schedule(schedule) {
            panic!("schedule '{}': {err}", schedule.key);
        }
    }

    for material in content.amendments.values() {
        assert!(
            material.calcium_kg_per_ton >= 0.0 && material.magnesium_kg_per_ton >= 0.0,
            "amendment '{}' has a negative supply rate",
            material.id,
        );
    }
}

fn parse<T: DeserializeOwned>(text: &str, file: &str) -> Result<T> {
    serde_json::from_str(text).with_context(|| format!("parsing {file}"))
}

fn keyed<K, V>(items: Vec<V>, key: impl Fn(&V) -> &K, file: &str) -> Result<AHashMap<K, V>>
where
    K: Clone + Eq + Hash + std::fmt::Display,
{
    let mut map = AHashMap::with_capacity(items.len());
    for item in items {
        let id = key(&item).clone();
        if map.insert(id.clone(), item).is_some() {
            bail!("duplicate id '{id}' in {file}");
        }
    }
    Ok(map)
}

fn build_content(sources: &ContentSources<'_>) -> Result<ReferenceContent> {
    let constants: Constants = parse(sources.constants, "constants.json")?;
    let crops_file: CropsFile = parse(sources.crops, "crops.json")?;
    let schedules_file: SchedulesFile = parse(sources.schedules, "schedules.json")?;
    let amendments_file: AmendmentsFile = parse(sources.amendments, "amendments.json")?;

    let content = ReferenceContent {
        content_version: crops_file.content_version,
        crops: keyed(crops_file.crops, |crop| &crop.id, "crops.json")?,
        schedules: keyed(
            schedules_file.schedules,
            |schedule| &schedule.key,
            "schedules.json",
        )?,
        amendments: keyed(
            amendments_file.amendments,
            |material| &material.id,
            "amendments.json",
        )?,
        constants,
    };
    validate_content(&content);
    tracing::debug!(
        content_version = %content.content_version,
        crops = content.crops.len(),
        schedules = content.schedules.len(),
        amendments = content.amendments.len(),
        "reference content ready"
    );
    Ok(content)
}

/// Loads and validates the content files in `content_dir`.
pub fn load_content(content_dir: &str) -> Result<ReferenceContent> {
    let dir = Path::new(content_dir);
    let read = |name: &str| {
        std::fs::read_to_string(dir.join(name)).with_context(|| format!("reading {name}"))
    };
    let constants = read("constants.json")?;
    let crops = read("crops.json")?;
    let schedules = read("schedules.json")?;
    let amendments = read("amendments.json")?;

    let content = build_content(&ContentSources {
        constants: &constants,
        crops: &crops,
        schedules: &schedules,
        amendments: &amendments,
    })
    .with_context(|| format!("loading content from {}", dir.display()))?;
    tracing::info!(
        dir = %dir.display(),
        content_version = %content.content_version,
        "loaded reference content"
    );
    Ok(content)
}

/// The content shipped with the workspace, embedded at compile time and
/// parsed on first use.
pub fn builtin_content() -> Result<&'static ReferenceContent> {
    static BUILTIN: OnceLock<ReferenceContent> = OnceLock::new();
    if let Some(content) = BUILTIN.get() {
        return Ok(content);
    }
    let content = build_content(&ContentSources {
        constants: include_str!("../../../content/constants.json"),
        crops: include_str!("../../../content/crops.json"),
        schedules: include_str!("../../../content/schedules.json"),
        amendments: include_str!("../../../content/amendments.json"),
    })
    .context("loading built-in content")?;
    Ok(BUILTIN.get_or_init(|| content))
}

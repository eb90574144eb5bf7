use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use fert_content::check_spring_fertilizer;
use fert_core::{
    AmendmentId, NitrogenFertilizer, RecommendationRequest, SoilCropRecord,
    SpringFertilizerSelection,
};
use serde::Deserialize;

/// One saved calculation: the soil/crop record, the user's choices, and
/// optional constant overrides.
#[derive(Debug, Deserialize)]
pub struct Session {
    pub record: SoilCropRecord,
    #[serde(default)]
    pub amendment: Option<AmendmentId>,
    #[serde(default)]
    pub spring_fertilizer: SpringFertilizerSelection,
    #[serde(default)]
    pub nitrogen_fertilizer: NitrogenFertilizer,
    #[serde(default)]
    pub overrides: HashMap<String, serde_json::Value>,
}

impl Session {
    pub fn request(&self) -> RecommendationRequest {
        RecommendationRequest {
            record: self.record.clone(),
            amendment: self.amendment.clone(),
            spring_fertilizer: self.spring_fertilizer.clone(),
            nitrogen_fertilizer: self.nitrogen_fertilizer,
        }
    }
}

pub fn load_session(path: &Path) -> Result<Session> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading session file: {}", path.display()))?;
    let session: Session = serde_json::from_str(&json)
        .with_context(|| format!("parsing session file: {}", path.display()))?;
    check_spring_fertilizer(&session.spring_fertilizer)
        .with_context(|| format!("checking session file: {}", path.display()))?;
    Ok(session)
}

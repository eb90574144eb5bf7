use anyhow::{bail, Context, Result};
use fert_content::check_spring_fertilizer;
use fert_core::{
    AmendmentId, NitrogenFertilizer, RecommendationRequest, SoilCropRecord,
    SpringFertilizerSelection,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Choices shared by every row of a batch.
#[derive(Debug, Deserialize)]
pub struct BatchConfig {
    pub name: String,
    /// Content directory; the built-in content is used when absent.
    #[serde(default)]
    pub content_dir: Option<String>,
    #[serde(default)]
    pub amendment: Option<AmendmentId>,
    #[serde(default)]
    pub spring_fertilizer: SpringFertilizerSelection,
    #[serde(default)]
    pub nitrogen_fertilizer: NitrogenFertilizer,
    #[serde(default)]
    pub overrides: HashMap<String, serde_json::Value>,
}

impl BatchConfig {
    pub fn request_for(&self, record: SoilCropRecord) -> RecommendationRequest {
        RecommendationRequest {
            record,
            amendment: self.amendment.clone(),
            spring_fertilizer: self.spring_fertilizer.clone(),
            nitrogen_fertilizer: self.nitrogen_fertilizer,
        }
    }
}

pub fn load_config(path: &Path) -> Result<BatchConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch config: {}", path.display()))?;
    let config: BatchConfig = serde_json::from_str(&json)
        .with_context(|| format!("parsing batch config: {}", path.display()))?;
    if config.name.is_empty() {
        bail!("batch 'name' must not be empty");
    }
    if config.name.contains(['/', '\\']) {
        bail!("batch 'name' must not contain path separators");
    }
    check_spring_fertilizer(&config.spring_fertilizer)
        .with_context(|| format!("checking batch config: {}", path.display()))?;
    Ok(config)
}

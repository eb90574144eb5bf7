//! Whole-pipeline entry point for one soil/crop record.

use serde::{Deserialize, Serialize};

use crate::amendment::apply_amendment;
use crate::basic::basic_needs_for;
use crate::fertigation::fertigation_needs_for;
use crate::plan::fertigation_plan;
use crate::{
    AmendmentId, CropId, FertigationPlan, Needs, NitrogenFertilizer, ReferenceContent,
    SoilAnalysis, SoilCropRecord, SpringFertilizerSelection,
};

/// One calculation session: the record plus the user's choices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationRequest {
    pub record: SoilCropRecord,
    /// Liming material to apply on acidic soil.
    pub amendment: Option<AmendmentId>,
    pub spring_fertilizer: SpringFertilizerSelection,
    pub nitrogen_fertilizer: NitrogenFertilizer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop: CropId,
    pub planned_yield: f64,
    pub soil: SoilAnalysis,
    /// Basic norms after the amendment stage.
    pub basic_needs: Needs,
    /// Material used by the amendment stage; `None` when none was requested
    /// or the requested id is not in the table.
    pub amendment: Option<AmendmentId>,
    /// Initial fertigation norms, before the spring correction.
    pub fertigation_needs: Needs,
    pub plan: FertigationPlan,
}

/// Parses the record and runs basic needs, amendment, fertigation needs and
/// the plan builder. `None` when the crop has no reference parameters.
pub fn recommend(
    request: &RecommendationRequest,
    content: &ReferenceContent,
) -> Option<Recommendation> {
    let parsed = request.record.parse();
    let crop = content.crop(&parsed.crop)?;
    let constants = &content.constants;

    let material = request
        .amendment
        .as_ref()
        .and_then(|id| content.amendment(id));
    let base_needs = basic_needs_for(&parsed.soil, constants);
    let basic_needs = apply_amendment(&base_needs, parsed.soil.ph, material, constants);

    let fertigation_needs =
        fertigation_needs_for(&parsed.soil, crop, parsed.planned_yield, constants);
    let plan = fertigation_plan(
        &fertigation_needs,
        crop,
        &request.spring_fertilizer,
        request.nitrogen_fertilizer,
        content,
    );

    Some(Recommendation {
        crop: parsed.crop,
        planned_yield: parsed.planned_yield,
        soil: parsed.soil,
        basic_needs,
        amendment: material.map(|def| def.id.clone()),
        fertigation_needs,
        plan,
    })
}

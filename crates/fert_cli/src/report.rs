use std::fmt::Write;

use fert_core::products::channel_products;
use fert_core::{
    Channels, Element, NitrogenFertilizer, NutrientNeed, Recommendation, ReferenceContent,
};

const RULE_WIDTH: usize = 72;
const CHANNEL_LABELS: [&str; 5] = ["N", "P", "K", "Ca", "Mg"];

fn rule(out: &mut String) {
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
}

fn needs_block(out: &mut String, title: &str, needs: &[NutrientNeed]) {
    let _ = writeln!(out, "{title}");
    for need in needs {
        let unit = if need.element == Element::Amendment {
            "kg material/ha"
        } else {
            "kg a.i./ha"
        };
        let _ = writeln!(out, "  {:<10} {:>10.1} {unit}", need.element, need.norm);
    }
}

fn channels_row(out: &mut String, label: &str, amounts: &Channels) {
    let _ = write!(out, "{label:>6}");
    for amount in amounts.values() {
        let _ = write!(out, " {amount:>10.2}");
    }
    out.push('\n');
}

/// Plain-text report for terminal output. `nitrogen` names the product in
/// the N column.
pub fn render_text(
    recommendation: &Recommendation,
    content: &ReferenceContent,
    nitrogen: NitrogenFertilizer,
) -> String {
    let mut out = String::new();
    let soil = &recommendation.soil;
    let _ = writeln!(
        out,
        "Crop: {}  planned yield: {} t/ha  content: {}",
        recommendation.crop, recommendation.planned_yield, content.content_version
    );
    let _ = writeln!(
        out,
        "Soil: N-NO3 {}  pH {}  P {}  K {}  Ca {}  Mg {}  CEC {}",
        soil.nitrate_nitrogen,
        soil.ph,
        soil.phosphorus,
        soil.potassium,
        soil.calcium,
        soil.magnesium,
        soil.cec
    );
    rule(&mut out);

    needs_block(&mut out, "Basic application", &recommendation.basic_needs);
    if let Some(material) = recommendation
        .amendment
        .as_ref()
        .and_then(|id| content.amendment(id))
    {
        let _ = writeln!(out, "  liming material: {}", material.name);
    }
    needs_block(&mut out, "Fertigation needs", &recommendation.fertigation_needs);

    let plan = &recommendation.plan;
    if let Some(rate) = plan.fertilizer_rate {
        let _ = writeln!(out, "Spring fertilizer rate: {rate:.1} kg/ha");
        needs_block(&mut out, "Needs after spring fertilizer", &plan.adjusted_needs);
    }
    rule(&mut out);

    if plan.schedule_missing {
        let _ = writeln!(
            out,
            "No fertigation schedule for {}; weekly plan unavailable.",
            recommendation.crop
        );
        return out;
    }

    let _ = writeln!(out, "Products, kg/ha:");
    for (label, product) in CHANNEL_LABELS.iter().zip(channel_products(nitrogen)) {
        let _ = writeln!(out, "  {label:<3} {} ({} %)", product.name, product.content_pct);
    }
    let _ = write!(out, "{:>6}", "week");
    for label in CHANNEL_LABELS {
        let _ = write!(out, " {label:>10}");
    }
    out.push('\n');
    for entry in &plan.weekly_plan {
        channels_row(&mut out, &entry.week.to_string(), &entry.amounts());
    }
    rule(&mut out);
    channels_row(&mut out, "total", &plan.totals);
    out
}

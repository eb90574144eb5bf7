mod report;
mod session;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fert_content::{apply_overrides, builtin_content, load_content};
use fert_core::{recommend, ReferenceContent};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "fert_cli", about = "Fertilizer needs and fertigation plan calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute needs and a weekly fertigation plan for one saved session.
    Recommend {
        /// Session JSON: record, amendment, spring_fertilizer, nitrogen_fertilizer, overrides.
        #[arg(long)]
        session: String,
        /// Load reference content from this directory instead of the built-in copy.
        #[arg(long)]
        content_dir: Option<String>,
        /// Print the full recommendation as JSON instead of a text report.
        #[arg(long)]
        json: bool,
    },
    /// List the crops with reference parameters.
    Crops {
        #[arg(long)]
        content_dir: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn resolve_content(content_dir: Option<&str>) -> Result<ReferenceContent> {
    match content_dir {
        Some(dir) => load_content(dir),
        None => builtin_content().cloned(),
    }
}

fn run_recommend(session_path: &Path, content_dir: Option<&str>, json: bool) -> Result<String> {
    let session = session::load_session(session_path)?;
    let mut content = resolve_content(content_dir)?;
    apply_overrides(&mut content.constants, &session.overrides)
        .with_context(|| format!("applying overrides from {}", session_path.display()))?;

    let request = session.request();
    if let Some(id) = &request.amendment {
        if content.amendment(id).is_none() {
            tracing::warn!(amendment = %id, "unknown amendment, liming skipped");
        }
    }

    let Some(recommendation) = recommend(&request, &content) else {
        let mut known: Vec<&str> = content.crops.keys().map(|id| id.0.as_str()).collect();
        known.sort_unstable();
        bail!(
            "crop '{}' has no reference parameters. Known crops: {}",
            request.record.crop.trim(),
            known.join(", ")
        );
    };
    tracing::info!(
        crop = %recommendation.crop,
        weeks = recommendation.plan.weekly_plan.len(),
        schedule_missing = recommendation.plan.schedule_missing,
        "recommendation computed"
    );

    if json {
        serde_json::to_string_pretty(&recommendation).context("serializing recommendation")
    } else {
        Ok(report::render_text(
            &recommendation,
            &content,
            request.nitrogen_fertilizer,
        ))
    }
}

fn run_crops(content_dir: Option<&str>) -> Result<String> {
    let content = resolve_content(content_dir)?;
    let mut crops: Vec<_> = content.crops.values().collect();
    crops.sort_by(|a, b| a.id.0.cmp(&b.id.0));

    let mut out = format!("content version {}\n", content.content_version);
    for crop in crops {
        let schedule = match content.schedule_for(crop) {
            Some(schedule) => format!(
                "weeks {}-{}",
                schedule.weeks.first().copied().unwrap_or_default(),
                schedule.weeks.last().copied().unwrap_or_default()
            ),
            None => "no schedule".to_string(),
        };
        out.push_str(&format!(
            "{:<14} {:<10} {schedule}\n",
            crop.id.0, crop.schedule_key.0
        ));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let output = match cli.command {
        Commands::Recommend {
            session,
            content_dir,
            json,
        } => run_recommend(Path::new(&session), content_dir.as_deref(), json)?,
        Commands::Crops { content_dir } => run_crops(content_dir.as_deref())?,
    };
    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_session(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const TOMATO_RECORD: &str = r#""record": {
        "crop": "Томат", "planned_yield": "80", "nitrate_nitrogen": "10",
        "ph": "6.5", "phosphorus": "25", "potassium": "150",
        "calcium": "1200", "magnesium": "120", "cec": "15"
    }"#;

    #[test]
    fn test_recommend_json_output() {
        let file = write_session(&format!("{{ {TOMATO_RECORD} }}"));
        let output = run_recommend(file.path(), None, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["crop"], "Томат");
        assert!(json["plan"]["weeklyPlan"].as_array().is_some_and(|weeks| !weeks.is_empty()));
    }

    #[test]
    fn test_recommend_applies_overrides() {
        let file = write_session(&format!(
            r#"{{ {TOMATO_RECORD}, "overrides": {{ "basic_magnesium_cec_factor": 8 }} }}"#
        ));
        let output = run_recommend(file.path(), None, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        let magnesium = json["basic_needs"]
            .as_array()
            .unwrap()
            .iter()
            .find(|need| need["element"] == "MgO")
            .and_then(|need| need["norm"].as_f64())
            .unwrap();
        // 8 * 15 - 120
        assert!(magnesium.abs() < 1e-9);
    }

    #[test]
    fn test_recommend_unknown_crop_errors() {
        let file = write_session(r#"{ "record": { "crop": "Ананас" } }"#);
        let err = run_recommend(file.path(), None, false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Ананас"));
        assert!(message.contains("Томат"));
    }

    #[test]
    fn test_recommend_rejects_unknown_override() {
        let file = write_session(&format!(
            r#"{{ {TOMATO_RECORD}, "overrides": {{ "magic": 1 }} }}"#
        ));
        let err = run_recommend(file.path(), None, false).unwrap_err();
        assert!(format!("{err:#}").contains("unknown override key 'magic'"));
    }

    #[test]
    fn test_recommend_text_output() {
        let file = write_session(&format!("{{ {TOMATO_RECORD} }}"));
        let output = run_recommend(file.path(), None, false).unwrap();
        assert!(output.contains("Basic application"));
        assert!(output.contains("Fertigation needs"));
    }

    #[test]
    fn test_demo_session_limes_acidic_soil() {
        let manifest = std::env::var("CARGO_MANIFEST_DIR").unwrap();
        let path = Path::new(&manifest).join("../../demos/tomato_session.json");
        let output = run_recommend(&path, None, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["amendment"], "dolomite_flour");
        assert!(json["plan"]["fertilizerRate"].is_number());
    }

    #[test]
    fn test_crops_lists_builtin_crops() {
        let output = run_crops(None).unwrap();
        assert!(output.starts_with("content version"));
        assert!(output.contains("Томат"));
        assert!(output.contains("tomato"));
    }

    #[test]
    fn test_crops_from_missing_dir_errors() {
        assert!(run_crops(Some("/nonexistent/content")).is_err());
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fert_content::{apply_overrides, builtin_content, constant_values, load_content};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod config;
mod input;
mod output;
mod runner;
mod summary;

#[derive(Parser)]
#[command(
    name = "fert_batch",
    about = "Batch fertilizer recommendations for a CSV of soil analyses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every row of an analyses CSV with one batch config.
    Run {
        /// CSV with a `field_id` column plus the soil/crop record columns.
        #[arg(long)]
        input: String,
        /// Path to the batch config JSON file.
        #[arg(long)]
        config: String,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
}

fn run(input_path: &Path, config_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let config = config::load_config(config_path)?;
    let loaded = input::load_rows(input_path)?;

    tracing::info!(
        batch = %config.name,
        rows = loaded.rows.len(),
        skipped = loaded.skipped,
        "loaded analyses"
    );

    // Load content and apply overrides.
    let mut content = match &config.content_dir {
        Some(dir) => load_content(dir)?,
        None => builtin_content()?.clone(),
    };
    apply_overrides(&mut content.constants, &config.overrides)
        .with_context(|| format!("applying overrides from {}", config_path.display()))?;
    if let Some(id) = &config.amendment {
        if content.amendment(id).is_none() {
            tracing::warn!(amendment = %id, "unknown amendment, liming skipped for every row");
        }
    }

    // Create timestamped output directory.
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = output_dir.join(format!("{}_{}", config.name, timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;

    // Copy config file into output dir.
    std::fs::copy(config_path, run_dir.join("batch.json")).context("copying batch config")?;

    tracing::info!(output = %run_dir.display(), "evaluating rows in parallel");
    let results = runner::run_rows(&loaded.rows, &config, &content);

    output::write_json_atomic(&results, &run_dir.join("results.json"))?;
    let weekly_lines =
        output::write_weekly_plan_csv(&results, &run_dir.join("weekly_plan.csv"))?;

    let stats = summary::compute_summary(&results);
    summary::print_summary(&config.name, &stats);

    let constants: serde_json::Map<String, serde_json::Value> = constant_values(&content.constants)
        .into_iter()
        .map(|(key, value)| (key.to_string(), serde_json::json!(value)))
        .collect();
    let batch_summary = serde_json::json!({
        "batch_schema_version": 1,
        "batch_id": Uuid::new_v4().to_string(),
        "batch_name": config.name,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "content_version": content.content_version,
        "constants": constants,
        "row_count": stats.row_count,
        "skipped_rows": loaded.skipped,
        "status_counts": stats.status_counts,
        "weekly_plan_lines": weekly_lines,
        "aggregated_totals": summary::aggregated_totals(&stats),
    });
    let batch_path = run_dir.join("batch_summary.json");
    output::write_json_atomic(&batch_summary, &batch_path)?;

    tracing::info!(path = %batch_path.display(), "batch summary written");
    Ok(run_dir)
}

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
    match cli.command {
        Commands::Run {
            input,
            config,
            output_dir,
        } => {
            let run_dir = run(Path::new(&input), Path::new(&config), Path::new(&output_dir))?;
            println!("Output: {}", run_dir.display());
        }
    }
    Ok(())
}

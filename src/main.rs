use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use energy_drift::config::{Config, ConfigOverrides};
use energy_drift::dataset::cleaning::{
    clip_target_outliers, missing_value_counts, production_slice, time_split,
};
use energy_drift::dataset::{read_csv, write_csv, DataFrame};
use energy_drift::drift::{
    build_report, compute_feature_drift, compute_model_drift, DriftReport, ModelDriftOutcome,
};
use energy_drift::model::store::{list_artifacts, load_models};
use energy_drift::output::csv::{feature_drift_to_csv, model_drift_to_csv};
use energy_drift::output::html::render_html_report;
use energy_drift::output::json::render_json;
use energy_drift::output::table::{
    render_feature_drift_table, render_model_drift_table, render_models_table,
    render_report_summary,
};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "energy-drift",
    about = "Data and model drift monitor for the energy pipeline"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clean the raw dataset and write the chronological splits.
    Clean {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long = "out-dir")]
        out_dir: Option<PathBuf>,
    },
    /// Compare reference and production data and score registered models.
    Drift {
        #[arg(long)]
        reference: Option<PathBuf>,
        #[arg(long)]
        production: Option<PathBuf>,
        #[arg(long = "models-dir")]
        models_dir: Option<PathBuf>,
        #[arg(long = "feature-threshold")]
        feature_threshold: Option<f64>,
        #[arg(long = "degradation-threshold")]
        degradation_threshold: Option<f64>,
        #[arg(long = "include-target")]
        include_target: bool,
        /// Write the HTML report, optionally to a path other than the
        /// configured one.
        #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
        html: Option<PathBuf>,
        #[arg(long = "csv-out")]
        csv_out: Option<PathBuf>,
    },
    /// List the model artifacts the registry can load.
    Models {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;

    match &cli.command {
        Commands::Config { .. } => handle_config_command(&cli.command, &config, &config_path),
        Commands::Clean { input, out_dir } => {
            run_clean(&config, input.as_deref(), out_dir.as_deref())
        }
        Commands::Drift {
            reference,
            production,
            models_dir,
            feature_threshold,
            degradation_threshold,
            include_target,
            html,
            csv_out,
        } => {
            config.apply_overrides(ConfigOverrides {
                artifact_dir: models_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
                feature_change_threshold_pct: *feature_threshold,
                model_degradation_threshold_pct: *degradation_threshold,
                include_target: include_target.then_some(true),
            });
            run_drift(
                &config,
                reference.as_deref(),
                production.as_deref(),
                html.as_deref(),
                csv_out.as_deref(),
                cli.output,
            )
        }
        Commands::Models { dir } => run_models(&config, dir.as_deref(), cli.output),
    }
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn run_clean(config: &Config, input: Option<&Path>, out_dir: Option<&Path>) -> Result<()> {
    let input = input
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&config.data.raw_path));
    let frame = read_csv(&input, &config.data.timestamp_column)?;
    info!(
        "loaded {} rows and {} columns from {}",
        frame.len(),
        frame.columns().len(),
        input.display()
    );

    for (column, missing) in missing_value_counts(&frame) {
        if missing > 0 {
            warn!("column {column} has {missing} missing values");
        }
    }

    let frame = if frame.time().is_some() {
        frame.sort_by_time()?
    } else {
        warn!(
            "no {} column found, keeping input row order",
            config.data.timestamp_column
        );
        frame
    };

    let (cleaned, removed) = clip_target_outliers(
        &frame,
        &config.data.target_column,
        config.cleaning.iqr_multiplier,
    )?;
    info!(
        "removed {removed} outlier rows ({:.2}%), {} rows remain",
        removed as f64 / frame.len().max(1) as f64 * 100.0,
        cleaned.len()
    );

    let (train, validation, test) = time_split(
        &cleaned,
        config.split.train_fraction,
        config.split.validation_fraction,
    );
    let production = production_slice(&cleaned, config.split.production_fraction);

    let cleaned_dir = out_dir
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&config.data.cleaned_dir));
    let drift_dir = out_dir
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&config.data.drift_dir));

    write_split(&train, &cleaned_dir.join("train.csv"), "training")?;
    write_split(&validation, &cleaned_dir.join("validate.csv"), "validation")?;
    write_split(&test, &cleaned_dir.join("test.csv"), "test")?;
    write_split(
        &production,
        &drift_dir.join("production_data.csv"),
        "production simulation",
    )?;

    log_target_statistics(config, &[("train", &train), ("validate", &validation), ("test", &test)]);
    Ok(())
}

fn write_split(frame: &DataFrame, path: &Path, label: &str) -> Result<()> {
    write_csv(frame, path)?;
    info!("saved {label} data ({} rows) to {}", frame.len(), path.display());
    Ok(())
}

fn log_target_statistics(config: &Config, splits: &[(&str, &DataFrame)]) {
    for (label, frame) in splits {
        let Some(target) = frame.column(&config.data.target_column) else {
            continue;
        };
        if let (Some(mean), Some(std)) = (target.mean(), target.std()) {
            info!(
                "{label} {}: mean {mean:.2}, std {std:.2}",
                config.data.target_column
            );
        }
    }
}

fn run_drift(
    config: &Config,
    reference: Option<&Path>,
    production: Option<&Path>,
    html: Option<&Path>,
    csv_out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let reference_path = reference
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&config.data.cleaned_dir).join("test.csv"));
    let production_path = production
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&config.data.drift_dir).join("production_data.csv"));

    let reference = read_csv(&reference_path, &config.data.timestamp_column)?;
    let production = read_csv(&production_path, &config.data.timestamp_column)?;
    info!(
        "reference: {} rows, production: {} rows",
        reference.len(),
        production.len()
    );

    let thresholds = config.drift_thresholds();
    let mut excluded = config.data.excluded_columns.clone();
    if !config.drift.include_target {
        excluded.push(config.data.target_column.clone());
    }
    let feature_drift = compute_feature_drift(&reference, &production, &excluded, &thresholds)?;

    let model_outcome = score_models(config, &reference, &production)?;
    let report = build_report(feature_drift, model_outcome, thresholds);
    info!(
        "detected drift in {} of {} features",
        report.features_drifted, report.features_analyzed
    );

    if let Some(path) = html {
        let path = if path.as_os_str().is_empty() {
            PathBuf::from(&config.report.html_path)
        } else {
            path.to_path_buf()
        };
        fs::write(&path, render_html_report(&report))
            .with_context(|| format!("failed writing HTML report: {}", path.display()))?;
        info!("HTML report saved to {}", path.display());
    }
    if let Some(path) = csv_out {
        fs::write(path, feature_drift_to_csv(&report.feature_drift)?)
            .with_context(|| format!("failed writing drift CSV: {}", path.display()))?;
        info!("feature drift CSV saved to {}", path.display());
    }

    print_report(&report, format)
}

fn score_models(
    config: &Config,
    reference: &DataFrame,
    production: &DataFrame,
) -> Result<ModelDriftOutcome> {
    let models_dir = PathBuf::from(&config.models.artifact_dir);
    if !models_dir.is_dir() {
        warn!(
            "models directory {} not found, skipping model drift",
            models_dir.display()
        );
        return Ok(ModelDriftOutcome::default());
    }
    let registry = load_models(&models_dir)?;
    if registry.is_empty() {
        info!("no model artifacts in {}", models_dir.display());
        return Ok(ModelDriftOutcome::default());
    }

    let target = &config.data.target_column;
    let y_ref = reference
        .column(target)
        .ok_or_else(|| anyhow!("reference dataset is missing target column: {target}"))?
        .values
        .clone();
    let y_prod = production
        .column(target)
        .ok_or_else(|| anyhow!("production dataset is missing target column: {target}"))?
        .values
        .clone();

    // Models never see the target or the noise columns.
    let mut excluded = config.data.excluded_columns.clone();
    excluded.push(target.clone());
    let x_ref = reference.to_matrix(&excluded);
    let x_prod = production.to_matrix(&excluded);

    Ok(compute_model_drift(
        &registry, &x_ref, &y_ref, &x_prod, &y_prod,
    ))
}

fn print_report(report: &DriftReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_feature_drift_table(&report.feature_drift));
            if !report.model_drift.is_empty() {
                println!("{}", render_model_drift_table(&report.model_drift));
            }
            println!("{}", render_report_summary(report));
        }
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => {
            println!("{}", feature_drift_to_csv(&report.feature_drift)?);
            if !report.model_drift.is_empty() {
                println!("{}", model_drift_to_csv(&report.model_drift)?);
            }
        }
    }
    Ok(())
}

fn run_models(config: &Config, dir: Option<&Path>, format: OutputFormat) -> Result<()> {
    let dir = dir
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&config.models.artifact_dir));
    let artifacts = list_artifacts(&dir)?;
    match format {
        OutputFormat::Table => println!("{}", render_models_table(&artifacts)),
        OutputFormat::Json => println!("{}", render_json(&artifacts)?),
        OutputFormat::Csv => {
            warn!("CSV output for models not implemented, using JSON");
            println!("{}", render_json(&artifacts)?);
        }
    }
    Ok(())
}

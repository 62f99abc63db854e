//! Command handlers behind the binary.
//!
//! Each handler takes resolved settings rather than raw arguments so the
//! flows can be driven directly from tests.

use crate::aggregator::WardMetric;
use crate::catalog::Dataset;
use crate::cli::{Args, Command, LayerAction, RankMetric, Toggle};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::layers::{LayerPreferences, MapLayer};
use crate::loader::{CsvSource, RecordSource};
use crate::output;
use crate::profile::{build_profile, build_profile_with};
use crate::scores::headline_metric;
use crate::types::{DatasetProfile, RankingRow, SummaryStats};
use crate::util::{format_int, format_number, parse_ward_list};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Settings after merging the config file with command-line flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub municipality: String,
    pub wards: Vec<u32>,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub preview_rows: usize,
    pub layers_path: PathBuf,
}

impl Settings {
    pub fn resolve(config: Config, args: &Args) -> Result<Self> {
        let wards = match args.wards.as_deref() {
            Some(list) => parse_ward_list(list)
                .with_context(|| format!("Invalid ward list: {list:?}"))?,
            None => config.municipality.wards,
        };
        Ok(Self {
            municipality: config.municipality.name,
            wards,
            data_dir: args.data_dir.clone().unwrap_or(config.data.dir),
            out_dir: args.out.clone().unwrap_or(config.output.dir),
            preview_rows: config.output.preview_rows,
            layers_path: config.layers.path,
        })
    }
}

pub fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Ok(Config::load(config_path)?);
    }
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {DEFAULT_CONFIG_FILE}");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    let settings = || -> Result<Settings> {
        let settings = Settings::resolve(load_config(&args)?, &args)?;
        debug!(?settings, "resolved settings");
        Ok(settings)
    };

    match &args.command {
        Command::InitConfig => init_config(Path::new(DEFAULT_CONFIG_FILE))?,
        Command::Summarize { dataset } => {
            let settings = settings()?;
            summarize(&CsvSource::new(&settings.data_dir), *dataset, &settings)?;
        }
        Command::Rank {
            dataset,
            metric,
            top,
        } => {
            let settings = settings()?;
            let source = CsvSource::new(&settings.data_dir);
            rank(&source, *dataset, *metric, *top, &settings)?;
        }
        Command::All => {
            let settings = settings()?;
            let stats = summarize_all(&CsvSource::new(&settings.data_dir), &settings)?;
            if !stats.failed_datasets.is_empty() {
                eprintln!(
                    "Warning: {} dataset(s) could not be processed.",
                    stats.failed_datasets.len()
                );
            }
        }
        Command::Layers { action } => layers(action.clone(), &settings()?.layers_path)?,
    }
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists. Remove it first or edit it manually.", path.display());
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {} with default settings.", path.display());
    Ok(())
}

fn ward_metric(dataset: Dataset, metric: RankMetric) -> WardMetric {
    match metric {
        RankMetric::Headline => headline_metric(dataset),
        RankMetric::Total => WardMetric::Total,
        RankMetric::Dominant => WardMetric::DominantShare,
    }
}

/// Load one dataset, print its previews and write its exports.
pub fn summarize(
    source: &dyn RecordSource,
    dataset: Dataset,
    settings: &Settings,
) -> Result<DatasetProfile> {
    let (records, load_report) = source
        .fetch(dataset)
        .with_context(|| format!("Failed to load dataset {dataset}"))?;
    println!(
        "Processing {}... ({} rows read, {} kept)",
        dataset,
        format_int(load_report.total_rows as u64),
        format_int(load_report.loaded_rows as u64)
    );
    if load_report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to missing ward or category.",
            format_int(load_report.skipped_rows as u64)
        );
    }

    let profile = build_profile(dataset, &records, &settings.wards);
    print_profile(&profile, settings.preview_rows);
    export_profile(&profile, &settings.out_dir)?;
    Ok(profile)
}

fn print_profile(profile: &DatasetProfile, preview_rows: usize) {
    println!("\n{} ({})", profile.title_en, profile.title_ne);
    println!(
        "Total: {} {}\n",
        format_number(profile.grand_total, 0),
        profile.unit
    );
    output::preview_table_rows(&profile.category_rows(), preview_rows);
    output::preview_table_rows(&profile.ward_rows(), profile.wards.len());
    if let (Some(best), Some(worst)) = (&profile.best_ward, &profile.worst_ward) {
        println!(
            "Highest {}: ward {} ({}); lowest: ward {} ({})",
            profile.ranking_metric,
            best.ward_number,
            format_number(best.value, 2),
            worst.ward_number,
            format_number(worst.value, 2)
        );
    }
    if let Some(score) = profile.score {
        println!("Composite score: {}", format_number(score, 2));
    }
    if !profile.inactive_wards.is_empty() {
        println!("Wards without records: {:?}", profile.inactive_wards);
    }
    println!();
}

pub fn export_profile(profile: &DatasetProfile, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let stem = profile.dataset.file_stem();

    let categories = out_dir.join(format!("{stem}_categories.csv"));
    output::write_csv(&categories, &profile.category_rows())?;
    let wards = out_dir.join(format!("{stem}_wards.csv"));
    output::write_csv(&wards, &profile.ward_rows())?;
    let json = out_dir.join(format!("{stem}_profile.json"));
    output::write_json(&json, profile)?;

    info!(dataset = %profile.dataset, dir = %out_dir.display(), "exports written");
    Ok(())
}

/// Print the ward ranking and return the rows shown, cut to `top`.
pub fn rank(
    source: &dyn RecordSource,
    dataset: Dataset,
    metric: RankMetric,
    top: Option<usize>,
    settings: &Settings,
) -> Result<Vec<RankingRow>> {
    let (records, _) = source
        .fetch(dataset)
        .with_context(|| format!("Failed to load dataset {dataset}"))?;
    let profile = build_profile_with(
        dataset,
        &records,
        &settings.wards,
        &ward_metric(dataset, metric),
    );
    let mut rows = profile.ranking_rows();
    rows.truncate(top.unwrap_or(rows.len()));
    println!("Ward ranking by {} ({})\n", profile.ranking_metric, dataset);
    output::preview_table_rows(&rows, rows.len());
    Ok(rows)
}

/// Every dataset in turn; a dataset that fails is logged and skipped.
pub fn summarize_all(source: &dyn RecordSource, settings: &Settings) -> Result<SummaryStats> {
    let mut datasets = Vec::new();
    let mut failed_datasets = Vec::new();
    for dataset in Dataset::ALL {
        match summarize(source, dataset, settings) {
            Ok(profile) => datasets.push(profile.headline()),
            Err(e) => {
                error!(dataset = %dataset, "{:#}", e);
                failed_datasets.push(dataset);
            }
        }
    }

    let stats = SummaryStats {
        municipality: settings.municipality.clone(),
        generated_at: Utc::now(),
        wards: settings.wards.clone(),
        datasets,
        failed_datasets,
    };
    std::fs::create_dir_all(&settings.out_dir)
        .with_context(|| format!("Failed to create {}", settings.out_dir.display()))?;
    let path = settings.out_dir.join("summary.json");
    output::write_json(&path, &stats)?;
    println!("Summary written to {}", path.display());
    Ok(stats)
}

pub fn layers(action: LayerAction, path: &Path) -> Result<()> {
    let mut prefs = LayerPreferences::load(path)?;
    match action {
        LayerAction::Show => {}
        LayerAction::Toggle { layer } => {
            let visible = prefs.toggle(layer);
            info!(%layer, visible, "layer toggled");
            prefs.save(path)?;
        }
        LayerAction::Set { layer, state } => {
            prefs.set(layer, state == Toggle::On);
            prefs.save(path)?;
        }
    }
    for layer in MapLayer::ALL {
        let mark = if prefs.is_visible(layer) { "on" } else { "off" };
        println!("{:<18} {mark}", layer.slug());
    }
    Ok(())
}

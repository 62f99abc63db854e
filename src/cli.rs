//! Command-line interface argument parsing.

use crate::catalog::Dataset;
use crate::layers::MapLayer;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// palika-profile - ward statistics for a municipal digital profile
///
/// Summarises per-ward, per-category records into the tables, rankings and
/// JSON documents a profile website renders.
///
/// Examples:
///   palika-profile summarize marital-status
///   palika-profile rank financial-accounts --metric headline --top 3
///   palika-profile all --data-dir ./data --out ./public/data
///   palika-profile layers toggle schools
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Configuration file (defaults to ./palika.toml when present)
    #[arg(short, long, value_name = "FILE", global = true, env = "PALIKA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding one CSV file per dataset
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(long, value_name = "DIR", global = true)]
    pub out: Option<PathBuf>,

    /// Ward set to report over, e.g. "1-9" or "1,2,5"
    #[arg(long, value_name = "LIST", global = true)]
    pub wards: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Summarise one dataset and export its tables
    Summarize {
        /// Dataset slug, e.g. marital-status
        dataset: Dataset,
    },

    /// Rank wards of one dataset
    Rank {
        dataset: Dataset,

        #[arg(long, value_enum, default_value_t = RankMetric::Headline)]
        metric: RankMetric,

        /// Show only the first N wards
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Summarise every dataset and write summary.json
    All,

    /// Show or change map layer visibility
    Layers {
        #[command(subcommand)]
        action: LayerAction,
    },

    /// Write a default palika.toml
    InitConfig,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LayerAction {
    /// Print every layer and whether it is visible
    Show,
    /// Flip one layer
    Toggle { layer: MapLayer },
    /// Set one layer on or off
    Set { layer: MapLayer, state: Toggle },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RankMetric {
    /// Dataset-specific rate (marriage rate, financial inclusion rate, ...)
    #[default]
    Headline,
    /// Ward total
    Total,
    /// Share held by the ward's dominant category
    Dominant,
}

impl Args {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

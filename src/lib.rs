//! Ward and category statistics for a municipal digital profile.
//!
//! Records arrive flat, one row per ward and category, from a
//! [`loader::RecordSource`]. [`aggregator`] turns them into category and ward
//! summaries and rankings, [`profile`] bundles everything a profile page
//! needs, and [`output`] writes the tables and JSON documents.

pub mod aggregator;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod layers;
pub mod loader;
pub mod output;
pub mod profile;
pub mod scores;
pub mod types;
pub mod util;

pub use catalog::{Catalog, Dataset};
pub use cli::Args;
pub use error::ProfileError;
pub use types::{CategorySummary, CategoryWardRecord, DatasetProfile, WardSummary};

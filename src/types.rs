use crate::catalog::{Dataset, MeasureUnit};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use tabled::Tabled;

/// One line of a dataset file as it appears on disk. Every cell is optional
/// text so that malformed rows can be counted instead of aborting the load.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(alias = "wardNumber", alias = "ward")]
    pub ward_number: Option<String>,
    #[serde(alias = "code")]
    pub category: Option<String>,
    #[serde(alias = "population", alias = "households", alias = "count")]
    pub measure: Option<String>,
    pub male: Option<String>,
    pub female: Option<String>,
    pub other: Option<String>,
}

/// Male / female / other split of a measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenderBreakdown {
    pub male: f64,
    pub female: f64,
    pub other: f64,
}

impl AddAssign for GenderBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        self.male += rhs.male;
        self.female += rhs.female;
        self.other += rhs.other;
    }
}

/// A flat fact: `measure` units of `category` in ward `ward_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWardRecord {
    pub ward_number: u32,
    pub category: String,
    pub measure: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<GenderBreakdown>,
}

impl CategoryWardRecord {
    pub fn new(ward_number: u32, category: impl Into<String>, measure: f64) -> Self {
        Self {
            ward_number,
            category: category.into(),
            measure,
            breakdown: None,
        }
    }

    pub fn with_breakdown(mut self, breakdown: GenderBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub display_name: String,
    pub display_name_en: String,
    pub color: String,
    pub total: f64,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<GenderBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardSummary {
    pub ward_number: u32,
    pub total: f64,
    /// Per-category subtotals, descending by amount.
    pub breakdown: Vec<CategoryAmount>,
    pub dominant_category: Option<String>,
    pub dominant_percentage: f64,
}

impl WardSummary {
    pub fn empty(ward_number: u32) -> Self {
        Self {
            ward_number,
            total: 0.0,
            breakdown: Vec::new(),
            dominant_category: None,
            dominant_percentage: 0.0,
        }
    }

    pub fn amount_of(&self, category: &str) -> f64 {
        self.breakdown
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
            .unwrap_or(0.0)
    }

    /// `true` when no records fell into this ward.
    pub fn is_inactive(&self) -> bool {
        self.breakdown.is_empty()
    }
}

/// A ward's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWard {
    pub rank: usize,
    pub ward_number: u32,
    pub value: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub dataset: Dataset,
    pub title_ne: String,
    pub title_en: String,
    pub unit: MeasureUnit,
    pub grand_total: f64,
    pub categories: Vec<CategorySummary>,
    pub wards: Vec<WardSummary>,
    pub ranking_metric: String,
    /// Ranking values are percentages rather than amounts in `unit`.
    pub ranking_in_percent: bool,
    pub ranking: Vec<RankedWard>,
    pub best_ward: Option<RankedWard>,
    pub worst_ward: Option<RankedWard>,
    pub most_common: Option<String>,
    pub least_common: Option<String>,
    pub score: Option<f64>,
    pub inactive_wards: Vec<u32>,
    pub unknown_categories: Vec<String>,
}

// Rendered rows for CSV export and table previews. Numbers are pre-formatted
// strings so both outputs show the same text.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WardRow {
    #[serde(rename = "Ward")]
    #[tabled(rename = "Ward")]
    pub ward_number: u32,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "DominantCategory")]
    #[tabled(rename = "DominantCategory")]
    pub dominant_category: String,
    #[serde(rename = "DominantPct")]
    #[tabled(rename = "DominantPct")]
    pub dominant_percentage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Ward")]
    #[tabled(rename = "Ward")]
    pub ward_number: u32,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
}

/// One entry of `summary.json`.
#[derive(Debug, Serialize)]
pub struct DatasetHeadline {
    pub dataset: Dataset,
    pub grand_total: f64,
    pub most_common: Option<String>,
    pub best_ward: Option<u32>,
    pub worst_ward: Option<u32>,
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub municipality: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub wards: Vec<u32>,
    pub datasets: Vec<DatasetHeadline>,
    pub failed_datasets: Vec<Dataset>,
}

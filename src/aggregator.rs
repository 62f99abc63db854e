//! Category and ward aggregation.
//!
//! Every profile page reduces the same flat `(ward, category, measure)`
//! records two ways: by category across the whole municipality, and by ward
//! across categories. Both views are partitions of the same records, so their
//! totals must agree with the grand total.

use crate::catalog::{Catalog, Dataset};
use crate::types::{
    CategoryAmount, CategorySummary, CategoryWardRecord, GenderBreakdown, RankedWard, WardSummary,
};
use crate::util::{measure_or_zero, percentage};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Absolute tolerance for the conservation check.
pub const TOLERANCE: f64 = 1e-6;

pub fn grand_total(records: &[CategoryWardRecord]) -> f64 {
    records.iter().map(|r| measure_or_zero(r.measure)).sum()
}

/// Descending by amount, ascending by code on ties.
fn by_amount_then_code(a: (&str, f64), b: (&str, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

pub fn summarize_by_category(
    records: &[CategoryWardRecord],
    dataset: Dataset,
    catalog: &Catalog,
) -> Vec<CategorySummary> {
    #[derive(Default)]
    struct Acc {
        total: f64,
        breakdown: Option<GenderBreakdown>,
    }

    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in records {
        let e = map.entry(r.category.as_str()).or_default();
        e.total += measure_or_zero(r.measure);
        if let Some(b) = r.breakdown {
            *e.breakdown.get_or_insert_with(GenderBreakdown::default) += b;
        }
    }

    let grand = grand_total(records);
    let mut rows: Vec<CategorySummary> = map
        .into_iter()
        .map(|(code, acc)| {
            let label = catalog.label(dataset, code);
            CategorySummary {
                category: code.to_string(),
                display_name: label.name_ne,
                display_name_en: label.name_en,
                color: label.color,
                total: acc.total,
                percentage: percentage(acc.total, grand),
                breakdown: acc.breakdown,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        by_amount_then_code((a.category.as_str(), a.total), (b.category.as_str(), b.total))
    });
    rows
}

/// One summary per ward in `ward_numbers`, in that order.
///
/// Wards without records are zero-filled. Records for wards outside the set
/// do not appear in this view. A ward listed twice is reported once, at its
/// first position.
pub fn summarize_by_ward(
    records: &[CategoryWardRecord],
    ward_numbers: &[u32],
) -> Vec<WardSummary> {
    let mut seen: HashSet<u32> = HashSet::new();
    let ward_numbers: Vec<u32> = ward_numbers
        .iter()
        .copied()
        .filter(|w| seen.insert(*w))
        .collect();

    let mut by_ward: HashMap<u32, HashMap<&str, f64>> = HashMap::new();
    for r in records {
        if !seen.contains(&r.ward_number) {
            debug!(
                ward = r.ward_number,
                category = %r.category,
                "record outside the configured ward set"
            );
            continue;
        }
        *by_ward
            .entry(r.ward_number)
            .or_default()
            .entry(r.category.as_str())
            .or_default() += measure_or_zero(r.measure);
    }

    ward_numbers
        .iter()
        .map(|&ward| {
            let Some(cats) = by_ward.remove(&ward) else {
                return WardSummary::empty(ward);
            };
            let mut breakdown: Vec<CategoryAmount> = cats
                .into_iter()
                .map(|(code, total)| CategoryAmount {
                    category: code.to_string(),
                    total,
                })
                .collect();
            breakdown.sort_by(|a, b| {
                by_amount_then_code((a.category.as_str(), a.total), (b.category.as_str(), b.total))
            });

            let total: f64 = breakdown.iter().map(|c| c.total).sum();
            let (dominant_category, dominant_percentage) = if total > 0.0 {
                breakdown
                    .first()
                    .map(|c| (Some(c.category.clone()), percentage(c.total, total)))
                    .unwrap_or((None, 0.0))
            } else {
                (None, 0.0)
            };
            WardSummary {
                ward_number: ward,
                total,
                breakdown,
                dominant_category,
                dominant_percentage,
            }
        })
        .collect()
}

/// Value a ward is ranked by.
#[derive(Debug, Clone, PartialEq)]
pub enum WardMetric {
    /// Ward total measure.
    Total,
    /// Percentage of the ward total held by its dominant category.
    DominantShare,
    /// Percentage of the ward total falling into `codes`.
    CategoryShare { name: String, codes: Vec<String> },
}

impl WardMetric {
    pub fn share(name: impl Into<String>, codes: &[&str]) -> Self {
        WardMetric::CategoryShare {
            name: name.into(),
            codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WardMetric::Total => "total",
            WardMetric::DominantShare => "dominant-share",
            WardMetric::CategoryShare { name, .. } => name,
        }
    }

    /// Shares are percentages of the ward total; `Total` is in the dataset's unit.
    pub fn is_percentage(&self) -> bool {
        !matches!(self, WardMetric::Total)
    }

    pub fn value(&self, ward: &WardSummary) -> f64 {
        match self {
            WardMetric::Total => ward.total,
            WardMetric::DominantShare => ward.dominant_percentage,
            WardMetric::CategoryShare { codes, .. } => {
                let part: f64 = codes.iter().map(|c| ward.amount_of(c)).sum();
                percentage(part, ward.total)
            }
        }
    }
}

/// Wards sorted descending by `metric`; ties go to the lower ward number.
pub fn rank_wards(wards: &[WardSummary], metric: &WardMetric) -> Vec<WardSummary> {
    let mut scored: Vec<(f64, &WardSummary)> =
        wards.iter().map(|w| (metric.value(w), w)).collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.ward_number.cmp(&b.1.ward_number))
    });
    scored.into_iter().map(|(_, w)| w.clone()).collect()
}

/// [`rank_wards`] flattened to numbered rows.
pub fn ranked(wards: &[WardSummary], metric: &WardMetric) -> Vec<RankedWard> {
    rank_wards(wards, metric)
        .iter()
        .enumerate()
        .map(|(idx, w)| RankedWard {
            rank: idx + 1,
            ward_number: w.ward_number,
            value: metric.value(w),
            total: w.total,
        })
        .collect()
}

pub fn best_and_worst<T>(ranking: &[T]) -> Option<(&T, &T)> {
    Some((ranking.first()?, ranking.last()?))
}

/// Most and least common categories of an already sorted summary list.
pub fn most_and_least_common(
    categories: &[CategorySummary],
) -> Option<(&CategorySummary, &CategorySummary)> {
    best_and_worst(categories)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conservation {
    pub record_total: f64,
    pub category_total: f64,
    pub ward_total: f64,
    /// Measure of records whose ward is outside the configured set.
    pub outside_wards: f64,
}

impl Conservation {
    pub fn holds(&self) -> bool {
        (self.category_total - self.record_total).abs() <= TOLERANCE
            && (self.ward_total + self.outside_wards - self.record_total).abs() <= TOLERANCE
    }
}

pub fn check_conservation(
    records: &[CategoryWardRecord],
    categories: &[CategorySummary],
    wards: &[WardSummary],
) -> Conservation {
    let ward_numbers: Vec<u32> = wards.iter().map(|w| w.ward_number).collect();
    let outside_wards = records
        .iter()
        .filter(|r| !ward_numbers.contains(&r.ward_number))
        .map(|r| measure_or_zero(r.measure))
        .sum();
    Conservation {
        record_total: grand_total(records),
        category_total: categories.iter().map(|c| c.total).sum(),
        ward_total: wards.iter().map(|w| w.total).sum(),
        outside_wards,
    }
}

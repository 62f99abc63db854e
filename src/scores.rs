//! Composite indices and the headline ward metric of each dataset.
//!
//! These numbers only feed narrative text and summary cards.

use crate::aggregator::WardMetric;
use crate::catalog::{CategoryKind, Dataset, FinancialAccountType, MaritalStatus, WallMaterial};
use crate::types::CategorySummary;

/// Σ percentage × weight over the categories, clamped to 0..=100.
///
/// Categories the weight function does not know contribute nothing.
pub fn weighted_index<F>(categories: &[CategorySummary], weight: F) -> f64
where
    F: Fn(&str) -> Option<f64>,
{
    let score: f64 = categories
        .iter()
        .filter_map(|c| weight(&c.category).map(|w| c.percentage * w))
        .sum();
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl FinancialAccountType {
    pub fn inclusion_weight(&self) -> f64 {
        match self {
            FinancialAccountType::Bank => 1.0,
            FinancialAccountType::Finance => 0.9,
            FinancialAccountType::MicroFinance => 0.8,
            FinancialAccountType::Cooperative => 0.7,
            FinancialAccountType::NoAccount => 0.0,
        }
    }
}

impl WallMaterial {
    pub fn quality_weight(&self) -> f64 {
        match self {
            WallMaterial::CementBonded => 1.0,
            WallMaterial::Prefab => 0.9,
            WallMaterial::Wood => 0.6,
            WallMaterial::MudBonded => 0.5,
            WallMaterial::Other => 0.4,
            WallMaterial::UnbakedBrick => 0.3,
            WallMaterial::Bamboo => 0.2,
        }
    }
}

pub fn financial_inclusion_index(categories: &[CategorySummary]) -> f64 {
    weighted_index(categories, |code| {
        FinancialAccountType::from_code(code).map(|k| k.inclusion_weight())
    })
}

pub fn housing_quality_index(categories: &[CategorySummary]) -> f64 {
    weighted_index(categories, |code| {
        WallMaterial::from_code(code).map(|k| k.quality_weight())
    })
}

/// Composite score for datasets that define one.
pub fn dataset_score(dataset: Dataset, categories: &[CategorySummary]) -> Option<f64> {
    match dataset {
        Dataset::FinancialAccounts => Some(financial_inclusion_index(categories)),
        Dataset::HouseWallMaterial => Some(housing_quality_index(categories)),
        Dataset::MaritalStatus | Dataset::FarmersGroups | Dataset::Cooperatives => None,
    }
}

fn codes<K: CategoryKind>(keep: impl Fn(&K) -> bool) -> Vec<&'static str> {
    K::ALL.iter().filter(|k| keep(*k)).map(|k| k.code()).collect()
}

/// The rate each profile page ranks its wards by.
pub fn headline_metric(dataset: Dataset) -> WardMetric {
    match dataset {
        Dataset::MaritalStatus => WardMetric::share(
            "marriage-rate",
            &codes::<MaritalStatus>(|k| {
                matches!(
                    k,
                    MaritalStatus::Married | MaritalStatus::MultiMarriage | MaritalStatus::ReMarriage
                )
            }),
        ),
        Dataset::FinancialAccounts => WardMetric::share(
            "financial-inclusion-rate",
            &codes::<FinancialAccountType>(|k| *k != FinancialAccountType::NoAccount),
        ),
        Dataset::HouseWallMaterial => WardMetric::share(
            "durable-housing-rate",
            &codes::<WallMaterial>(|k| {
                matches!(k, WallMaterial::CementBonded | WallMaterial::Prefab)
            }),
        ),
        Dataset::FarmersGroups | Dataset::Cooperatives => WardMetric::Total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{summarize_by_category, summarize_by_ward};
    use crate::catalog::Catalog;
    use crate::types::CategoryWardRecord;

    fn cats(dataset: Dataset, records: &[CategoryWardRecord]) -> Vec<CategorySummary> {
        summarize_by_category(records, dataset, Catalog::global())
    }

    #[test]
    fn financial_inclusion_weights_account_types() {
        let records = vec![
            CategoryWardRecord::new(1, "BANK", 50.0),
            CategoryWardRecord::new(1, "COOPERATIVE", 30.0),
            CategoryWardRecord::new(2, "NONE", 20.0),
        ];
        let score = financial_inclusion_index(&cats(Dataset::FinancialAccounts, &records));
        // 50 * 1.0 + 30 * 0.7 + 20 * 0.0
        assert!((score - 71.0).abs() < 1e-9);
    }

    #[test]
    fn housing_quality_ignores_unknown_materials() {
        let records = vec![
            CategoryWardRecord::new(1, "CEMENT_BONDED", 25.0),
            CategoryWardRecord::new(1, "BAMBOO", 25.0),
            CategoryWardRecord::new(1, "THATCH", 50.0),
        ];
        let score = housing_quality_index(&cats(Dataset::HouseWallMaterial, &records));
        assert!((score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_dataset_scores_zero() {
        assert_eq!(financial_inclusion_index(&[]), 0.0);
        assert_eq!(dataset_score(Dataset::Cooperatives, &[]), None);
    }

    #[test]
    fn headline_metric_for_marital_status_is_marriage_rate() {
        let records = vec![
            CategoryWardRecord::new(1, "MARRIED", 40.0),
            CategoryWardRecord::new(1, "RE_MARRIAGE", 10.0),
            CategoryWardRecord::new(1, "SINGLE", 50.0),
        ];
        let wards = summarize_by_ward(&records, &[1]);
        let metric = headline_metric(Dataset::MaritalStatus);
        assert_eq!(metric.name(), "marriage-rate");
        assert!((metric.value(&wards[0]) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn financial_inclusion_rate_excludes_no_account() {
        let records = vec![
            CategoryWardRecord::new(4, "MICRO_FINANCE", 30.0),
            CategoryWardRecord::new(4, "NONE", 10.0),
        ];
        let wards = summarize_by_ward(&records, &[4]);
        let metric = headline_metric(Dataset::FinancialAccounts);
        assert!((metric.value(&wards[0]) - 75.0).abs() < 1e-9);
        assert_eq!(headline_metric(Dataset::FarmersGroups), WardMetric::Total);
    }
}

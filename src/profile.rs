//! One profile page: every derived number for a dataset, plus the rendered
//! rows the exports and previews use.

use crate::aggregator::{
    best_and_worst, check_conservation, grand_total, most_and_least_common, ranked,
    summarize_by_category, summarize_by_ward, WardMetric,
};
use crate::catalog::{Catalog, Dataset};
use crate::scores::{dataset_score, headline_metric};
use crate::types::{
    CategoryRow, CategoryWardRecord, DatasetHeadline, DatasetProfile, RankingRow, WardRow,
};
use crate::util::format_number;
use tracing::{debug, warn};

/// Build a profile ranked by the dataset's headline metric.
pub fn build_profile(
    dataset: Dataset,
    records: &[CategoryWardRecord],
    wards: &[u32],
) -> DatasetProfile {
    build_profile_with(dataset, records, wards, &headline_metric(dataset))
}

pub fn build_profile_with(
    dataset: Dataset,
    records: &[CategoryWardRecord],
    wards: &[u32],
    metric: &WardMetric,
) -> DatasetProfile {
    let catalog = Catalog::global();
    let categories = summarize_by_category(records, dataset, catalog);
    let ward_summaries = summarize_by_ward(records, wards);

    let conservation = check_conservation(records, &categories, &ward_summaries);
    if !conservation.holds() {
        warn!(
            dataset = %dataset,
            records = conservation.record_total,
            categories = conservation.category_total,
            wards = conservation.ward_total,
            "category and ward totals disagree"
        );
    }
    if conservation.outside_wards > 0.0 {
        warn!(
            dataset = %dataset,
            measure = conservation.outside_wards,
            "records reference wards outside the configured set"
        );
    }

    let ranking = ranked(&ward_summaries, metric);
    let (best_ward, worst_ward) = match best_and_worst(&ranking) {
        Some((b, w)) => (Some(b.clone()), Some(w.clone())),
        None => (None, None),
    };
    let (most_common, least_common) = match most_and_least_common(&categories) {
        Some((m, l)) => (Some(m.category.clone()), Some(l.category.clone())),
        None => (None, None),
    };

    let inactive_wards: Vec<u32> = ward_summaries
        .iter()
        .filter(|w| w.is_inactive())
        .map(|w| w.ward_number)
        .collect();
    let unknown_categories: Vec<String> = categories
        .iter()
        .filter(|c| !catalog.is_known(dataset, &c.category))
        .map(|c| c.category.clone())
        .collect();
    if !unknown_categories.is_empty() {
        debug!(dataset = %dataset, codes = ?unknown_categories, "unknown category codes");
    }

    let score = dataset_score(dataset, &categories);

    DatasetProfile {
        dataset,
        title_ne: dataset.title_ne().to_string(),
        title_en: dataset.title_en().to_string(),
        unit: dataset.unit(),
        grand_total: grand_total(records),
        categories,
        wards: ward_summaries,
        ranking_metric: metric.name().to_string(),
        ranking_in_percent: metric.is_percentage(),
        ranking,
        best_ward,
        worst_ward,
        most_common,
        least_common,
        score,
        inactive_wards,
        unknown_categories,
    }
}

impl DatasetProfile {
    pub fn category_rows(&self) -> Vec<CategoryRow> {
        self.categories
            .iter()
            .map(|c| CategoryRow {
                category: c.category.clone(),
                name: c.display_name.clone(),
                total: format_number(c.total, 0),
                percentage: format_number(c.percentage, 2),
            })
            .collect()
    }

    pub fn ward_rows(&self) -> Vec<WardRow> {
        let catalog = Catalog::global();
        self.wards
            .iter()
            .map(|w| WardRow {
                ward_number: w.ward_number,
                total: format_number(w.total, 0),
                dominant_category: w
                    .dominant_category
                    .as_deref()
                    .map(|code| catalog.label(self.dataset, code).name_ne)
                    .unwrap_or_else(|| "-".to_string()),
                dominant_percentage: format_number(w.dominant_percentage, 2),
            })
            .collect()
    }

    pub fn ranking_rows(&self) -> Vec<RankingRow> {
        let decimals = if self.ranking_in_percent { 2 } else { 0 };
        self.ranking
            .iter()
            .map(|r| RankingRow {
                rank: r.rank,
                ward_number: r.ward_number,
                value: format_number(r.value, decimals),
                total: format_number(r.total, 0),
            })
            .collect()
    }

    pub fn headline(&self) -> DatasetHeadline {
        DatasetHeadline {
            dataset: self.dataset,
            grand_total: self.grand_total,
            most_common: self.most_common.clone(),
            best_ward: self.best_ward.as_ref().map(|w| w.ward_number),
            worst_ward: self.worst_ward.as_ref().map(|w| w.ward_number),
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CategoryWardRecord> {
        vec![
            CategoryWardRecord::new(1, "BANK", 60.0),
            CategoryWardRecord::new(1, "NONE", 40.0),
            CategoryWardRecord::new(2, "COOPERATIVE", 45.0),
            CategoryWardRecord::new(2, "NONE", 5.0),
            CategoryWardRecord::new(2, "POSTAL", 0.0),
        ]
    }

    #[test]
    fn profile_ranks_by_headline_metric() {
        let profile = build_profile(Dataset::FinancialAccounts, &records(), &[1, 2, 3]);
        assert_eq!(profile.grand_total, 150.0);
        assert_eq!(profile.ranking_metric, "financial-inclusion-rate");
        assert_eq!(profile.best_ward.as_ref().unwrap().ward_number, 2);
        assert_eq!(profile.worst_ward.as_ref().unwrap().ward_number, 3);
        assert_eq!(profile.inactive_wards, vec![3]);
        assert_eq!(profile.most_common.as_deref(), Some("BANK"));
        assert_eq!(profile.least_common.as_deref(), Some("POSTAL"));
        assert_eq!(profile.unknown_categories, vec!["POSTAL".to_string()]);
        assert!(profile.score.is_some());
    }

    #[test]
    fn rows_are_formatted_for_display() {
        let profile = build_profile(Dataset::FinancialAccounts, &records(), &[1, 2, 3]);
        let cats = profile.category_rows();
        assert_eq!(cats[0].category, "BANK");
        assert_eq!(cats[0].name, "बैंक");
        assert_eq!(cats[0].percentage, "40.00");

        let wards = profile.ward_rows();
        assert_eq!(wards[2].dominant_category, "-");
        assert_eq!(wards[1].dominant_category, "सहकारी");

        let ranking = profile.ranking_rows();
        assert_eq!(ranking[0].ward_number, 2);
        assert_eq!(ranking[0].value, "90.00");
    }

    #[test]
    fn custom_metric_overrides_headline() {
        let profile = build_profile_with(
            Dataset::FinancialAccounts,
            &records(),
            &[1, 2],
            &WardMetric::Total,
        );
        assert_eq!(profile.ranking_metric, "total");
        assert_eq!(profile.ranking[0].ward_number, 1);
        assert!(!profile.ranking_in_percent);
        assert_eq!(profile.ranking_rows()[0].value, "100");
    }

    #[test]
    fn ranking_decimals_follow_the_metric_kind_not_its_name() {
        let named_total = WardMetric::share("total", &["BANK"]);
        let profile = build_profile_with(Dataset::FinancialAccounts, &records(), &[1, 2], &named_total);
        assert_eq!(profile.ranking_metric, "total");
        assert!(profile.ranking_in_percent);
        assert_eq!(profile.ranking_rows()[0].value, "60.00");

        let dominant = build_profile_with(
            Dataset::FinancialAccounts,
            &records(),
            &[1, 2],
            &WardMetric::DominantShare,
        );
        assert!(dominant.ranking_in_percent);
        assert_eq!(dominant.ranking_rows()[0].value, "90.00");
    }
}

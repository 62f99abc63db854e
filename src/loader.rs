use crate::catalog::Dataset;
use crate::error::{ProfileError, Result};
use crate::types::{CategoryWardRecord, GenderBreakdown, RawRow};
use crate::util::{parse_f64_safe, parse_ward_safe};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows dropped for a missing ward number or category.
    pub skipped_rows: usize,
    /// Rows kept with their measure coerced to 0.
    pub coerced_measures: usize,
}

/// Where profile records come from.
pub trait RecordSource {
    fn fetch(&self, dataset: Dataset) -> Result<(Vec<CategoryWardRecord>, LoadReport)>;
}

/// One CSV file per dataset, `<data_dir>/<file_stem>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSource {
    data_dir: PathBuf,
}

impl CsvSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.data_dir.join(format!("{}.csv", dataset.file_stem()))
    }
}

impl RecordSource for CsvSource {
    fn fetch(&self, dataset: Dataset) -> Result<(Vec<CategoryWardRecord>, LoadReport)> {
        let path = self.path_for(dataset);
        info!(dataset = %dataset, path = %path.display(), "loading records");
        let (records, report) = load_records(&path)?;
        if report.skipped_rows > 0 || report.coerced_measures > 0 {
            warn!(
                dataset = %dataset,
                skipped = report.skipped_rows,
                coerced = report.coerced_measures,
                "some rows needed cleaning"
            );
        }
        Ok((records, report))
    }
}

/// Records held in memory, keyed by dataset.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: HashMap<Dataset, Vec<CategoryWardRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dataset: Dataset, records: Vec<CategoryWardRecord>) -> Self {
        self.data.insert(dataset, records);
        self
    }
}

impl RecordSource for MemorySource {
    fn fetch(&self, dataset: Dataset) -> Result<(Vec<CategoryWardRecord>, LoadReport)> {
        let records = self
            .data
            .get(&dataset)
            .cloned()
            .ok_or_else(|| ProfileError::MissingDataset(dataset.to_string()))?;
        let report = LoadReport {
            total_rows: records.len(),
            loaded_rows: records.len(),
            ..LoadReport::default()
        };
        Ok((records, report))
    }
}

pub fn load_records(path: &Path) -> Result<(Vec<CategoryWardRecord>, LoadReport)> {
    let file = std::fs::File::open(path).map_err(|e| ProfileError::read(path, e))?;
    read_records(file).map_err(|source| ProfileError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse records from any CSV reader.
///
/// Header problems fail the whole read; row problems are counted in the
/// returned [`LoadReport`].
pub fn read_records<R: std::io::Read>(
    reader: R,
) -> std::result::Result<(Vec<CategoryWardRecord>, LoadReport), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.headers()?;

    let mut report = LoadReport::default();
    let mut records: Vec<CategoryWardRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = report.total_rows, error = %e, "unreadable row");
                report.skipped_rows += 1;
                continue;
            }
        };

        let Some(ward_number) = parse_ward_safe(row.ward_number.as_deref()) else {
            report.skipped_rows += 1;
            continue;
        };
        let category = match row.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };

        let measure = match parse_f64_safe(row.measure.as_deref()) {
            Some(v) => v,
            None => {
                report.coerced_measures += 1;
                0.0
            }
        };

        let male = parse_f64_safe(row.male.as_deref());
        let female = parse_f64_safe(row.female.as_deref());
        let other = parse_f64_safe(row.other.as_deref());
        let breakdown = if male.is_some() || female.is_some() || other.is_some() {
            Some(GenderBreakdown {
                male: male.unwrap_or(0.0),
                female: female.unwrap_or(0.0),
                other: other.unwrap_or(0.0),
            })
        } else {
            None
        };

        records.push(CategoryWardRecord {
            ward_number,
            category,
            measure,
            breakdown,
        });
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_counts_problems() {
        let csv = "\
ward_number,category,measure,male,female,other
1,MARRIED,50,20,30,
1,SINGLE,\"1,200\",,,
2,MARRIED,n/a,,,
,SINGLE,5,,,
3,,5,,,
";
        let (records, report) = read_records(csv.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.loaded_rows, 3);
        assert_eq!(report.skipped_rows, 2);
        assert_eq!(report.coerced_measures, 1);

        assert_eq!(records[0].ward_number, 1);
        assert_eq!(
            records[0].breakdown,
            Some(GenderBreakdown {
                male: 20.0,
                female: 30.0,
                other: 0.0
            })
        );
        assert_eq!(records[1].measure, 1200.0);
        assert!(records[1].breakdown.is_none());
        assert_eq!(records[2].measure, 0.0);
    }

    #[test]
    fn accepts_camel_case_and_population_headers() {
        let csv = "wardNumber,category,population\n4,WIDOWED,12\n";
        let (records, _) = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records, vec![CategoryWardRecord::new(4, "WIDOWED", 12.0)]);
    }

    #[test]
    fn memory_source_reports_missing_dataset() {
        let source = MemorySource::new().with(
            Dataset::Cooperatives,
            vec![CategoryWardRecord::new(1, "DAIRY", 2.0)],
        );
        let (records, report) = source.fetch(Dataset::Cooperatives).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.loaded_rows, 1);
        assert!(matches!(
            source.fetch(Dataset::MaritalStatus),
            Err(ProfileError::MissingDataset(_))
        ));
    }
}

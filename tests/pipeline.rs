use anyhow::Result;
use clap::Parser;
use palika_profile::app::{self, Settings};
use palika_profile::cli::{Args, RankMetric};
use palika_profile::loader::{CsvSource, MemorySource, RecordSource};
use palika_profile::{CategoryWardRecord, Dataset};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_data_file(dir: &Path, dataset: Dataset, content: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(format!("{}.csv", dataset.file_stem())), content)?;
    Ok(())
}

fn write_config(root: &TempDir) -> Result<std::path::PathBuf> {
    let path = root.path().join("palika.toml");
    fs::write(
        &path,
        r#"
[municipality]
name = "Config Palika"
wards = [1, 2, 3, 4]

[data]
dir = "cfg-data"

[output]
dir = "cfg-out"
preview_rows = 7
"#,
    )?;
    Ok(path)
}

fn settings(root: &TempDir, wards: Vec<u32>) -> Settings {
    Settings {
        municipality: "Test Rural Municipality".to_string(),
        wards,
        data_dir: root.path().join("data"),
        out_dir: root.path().join("out"),
        preview_rows: 3,
        layers_path: root.path().join("layers.json"),
    }
}

#[test]
fn summarize_writes_category_ward_and_profile_exports() -> Result<()> {
    let root = TempDir::new()?;
    let settings = settings(&root, vec![1, 2, 3]);
    write_data_file(
        &settings.data_dir,
        Dataset::MaritalStatus,
        "ward_number,category,measure\n1,MARRIED,50\n1,SINGLE,30\n2,MARRIED,20\n",
    )?;

    let source = CsvSource::new(&settings.data_dir);
    let profile = app::summarize(&source, Dataset::MaritalStatus, &settings)?;
    assert_eq!(profile.grand_total, 100.0);
    assert_eq!(profile.inactive_wards, vec![3]);

    let categories = fs::read_to_string(settings.out_dir.join("marital_status_categories.csv"))?;
    let mut lines = categories.lines();
    assert_eq!(lines.next(), Some("Category,Name,Total,Percentage"));
    assert_eq!(lines.next(), Some("MARRIED,विवाहित,70,70.00"));
    assert_eq!(lines.next(), Some("SINGLE,अविवाहित,30,30.00"));

    let wards = fs::read_to_string(settings.out_dir.join("marital_status_wards.csv"))?;
    assert_eq!(wards.lines().count(), 4);
    assert!(wards.contains("3,0,-,0.00"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(
        settings.out_dir.join("marital_status_profile.json"),
    )?)?;
    assert_eq!(json["dataset"], "marital-status");
    assert_eq!(json["ranking_metric"], "marriage-rate");
    assert_eq!(json["wards"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn summarize_all_keeps_going_when_a_dataset_is_missing() -> Result<()> {
    let root = TempDir::new()?;
    let settings = settings(&root, (1..=9).collect());
    write_data_file(
        &settings.data_dir,
        Dataset::FinancialAccounts,
        "ward_number,category,households\n1,BANK,120\n1,NONE,30\n5,COOPERATIVE,40\n",
    )?;
    write_data_file(
        &settings.data_dir,
        Dataset::HouseWallMaterial,
        "ward_number,category,households\n2,CEMENT_BONDED,10\n2,MUD_BONDED,10\n",
    )?;

    let source = CsvSource::new(&settings.data_dir);
    let stats = app::summarize_all(&source, &settings)?;
    assert_eq!(stats.datasets.len(), 2);
    assert_eq!(
        stats.failed_datasets,
        vec![
            Dataset::MaritalStatus,
            Dataset::FarmersGroups,
            Dataset::Cooperatives
        ]
    );

    let finance = stats
        .datasets
        .iter()
        .find(|d| d.dataset == Dataset::FinancialAccounts)
        .expect("financial accounts headline");
    assert_eq!(finance.grand_total, 190.0);
    assert_eq!(finance.most_common.as_deref(), Some("BANK"));
    assert_eq!(finance.best_ward, Some(5));
    assert_eq!(finance.worst_ward, Some(9));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(settings.out_dir.join("summary.json"))?)?;
    assert_eq!(summary["municipality"], "Test Rural Municipality");
    assert_eq!(summary["datasets"].as_array().map(Vec::len), Some(2));
    assert!(summary["generated_at"].is_string());
    Ok(())
}

#[test]
fn memory_source_drives_the_same_flow() -> Result<()> {
    let root = TempDir::new()?;
    let settings = settings(&root, vec![1, 2]);
    let source = MemorySource::new().with(
        Dataset::Cooperatives,
        vec![
            CategoryWardRecord::new(1, "DAIRY", 2.0),
            CategoryWardRecord::new(2, "SAVINGS_CREDIT", 5.0),
            CategoryWardRecord::new(2, "DAIRY", 1.0),
        ],
    );
    let (records, _) = source.fetch(Dataset::Cooperatives)?;
    assert_eq!(records.len(), 3);

    let profile = app::summarize(&source, Dataset::Cooperatives, &settings)?;
    assert_eq!(profile.ranking_metric, "total");
    assert_eq!(profile.best_ward.as_ref().map(|w| w.ward_number), Some(2));
    assert_eq!(profile.score, None);
    Ok(())
}

#[test]
fn layer_preferences_persist_between_invocations() -> Result<()> {
    use palika_profile::cli::{LayerAction, Toggle};
    use palika_profile::layers::{LayerPreferences, MapLayer};

    let root = TempDir::new()?;
    let path = root.path().join("layers.json");
    app::layers(
        LayerAction::Toggle {
            layer: MapLayer::Schools,
        },
        &path,
    )?;
    app::layers(
        LayerAction::Set {
            layer: MapLayer::Roads,
            state: Toggle::Off,
        },
        &path,
    )?;

    let prefs = LayerPreferences::load(&path)?;
    assert_eq!(
        prefs.visible_layers(),
        vec![MapLayer::WardBoundaries, MapLayer::Schools]
    );
    Ok(())
}

#[test]
fn init_config_refuses_to_overwrite() -> Result<()> {
    let root = TempDir::new()?;
    let path = root.path().join("palika.toml");
    app::init_config(&path)?;
    assert!(fs::read_to_string(&path)?.contains("[municipality]"));
    assert!(app::init_config(&path).is_err());
    Ok(())
}

#[test]
fn command_line_flags_override_the_config_file() -> Result<()> {
    let root = TempDir::new()?;
    let config = write_config(&root)?.display().to_string();
    let data_dir = root.path().join("flag-data");
    let out_dir = root.path().join("flag-out");
    let (data_flag, out_flag) = (data_dir.display().to_string(), out_dir.display().to_string());

    let args = Args::try_parse_from([
        "palika-profile",
        "--config",
        config.as_str(),
        "--wards",
        "2-3",
        "--data-dir",
        data_flag.as_str(),
        "--out",
        out_flag.as_str(),
        "all",
    ])?;
    let settings = Settings::resolve(app::load_config(&args)?, &args)?;
    assert_eq!(settings.wards, vec![2, 3]);
    assert_eq!(settings.data_dir, data_dir);
    assert_eq!(settings.out_dir, out_dir);
    assert_eq!(settings.municipality, "Config Palika");
    assert_eq!(settings.preview_rows, 7);
    Ok(())
}

#[test]
fn config_file_applies_when_no_flags_are_given() -> Result<()> {
    let root = TempDir::new()?;
    let config = write_config(&root)?.display().to_string();
    let args = Args::try_parse_from(["palika-profile", "--config", config.as_str(), "all"])?;
    let settings = Settings::resolve(app::load_config(&args)?, &args)?;
    assert_eq!(settings.wards, vec![1, 2, 3, 4]);
    assert_eq!(settings.data_dir, Path::new("cfg-data"));
    assert_eq!(settings.out_dir, Path::new("cfg-out"));
    Ok(())
}

#[test]
fn malformed_ward_flag_is_rejected() -> Result<()> {
    let root = TempDir::new()?;
    let config = write_config(&root)?.display().to_string();
    for bad in ["9-1", "0", "1-60000", "two"] {
        let args = Args::try_parse_from([
            "palika-profile",
            "--config",
            config.as_str(),
            "--wards",
            bad,
            "all",
        ])?;
        let err = Settings::resolve(app::load_config(&args)?, &args)
            .expect_err("ward list should be rejected");
        assert!(err.to_string().contains("Invalid ward list"), "{bad}: {err}");
    }
    Ok(())
}

#[test]
fn rank_honours_metric_and_top() -> Result<()> {
    let root = TempDir::new()?;
    let settings = settings(&root, vec![1, 2, 3]);
    write_data_file(
        &settings.data_dir,
        Dataset::MaritalStatus,
        "ward_number,category,measure\n1,MARRIED,10\n2,MARRIED,20\n2,SINGLE,10\n3,SINGLE,20\n",
    )?;
    let source = CsvSource::new(&settings.data_dir);

    let rows = app::rank(&source, Dataset::MaritalStatus, RankMetric::Total, Some(2), &settings)?;
    let wards: Vec<(usize, u32, &str)> = rows
        .iter()
        .map(|r| (r.rank, r.ward_number, r.value.as_str()))
        .collect();
    assert_eq!(wards, vec![(1, 2, "30"), (2, 3, "20")]);

    let rows = app::rank(&source, Dataset::MaritalStatus, RankMetric::Headline, None, &settings)?;
    let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["100.00", "66.67", "0.00"]);
    assert_eq!(rows[0].ward_number, 1);
    Ok(())
}

//! Configuration file handling.
//!
//! Settings come from a `palika.toml` file; command-line flags override them.

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "palika.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub municipality: MunicipalityConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub layers: LayersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MunicipalityConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// The fixed ward set every ward view is reported over.
    #[serde(default = "default_wards")]
    pub wards: Vec<u32>,
}

impl Default for MunicipalityConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            wards: default_wards(),
        }
    }
}

fn default_name() -> String {
    "Municipality".to_string()
}

fn default_wards() -> Vec<u32> {
    (1..=9).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one CSV per dataset.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Rows shown in console previews.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_preview_rows() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayersConfig {
    /// Where map layer preferences are persisted.
    #[serde(default = "default_layers_path")]
    pub path: PathBuf,
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            path: default_layers_path(),
        }
    }
}

fn default_layers_path() -> PathBuf {
    PathBuf::from("map_layers.json")
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProfileError::read(path, e))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(content).map_err(|source| ProfileError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalize();
        Ok(config)
    }

    /// Load `palika.toml` from the working directory if it exists.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Drop ward 0 and duplicates; an empty list falls back to the default set.
    fn normalize(&mut self) {
        let mut wards: Vec<u32> = Vec::with_capacity(self.municipality.wards.len());
        for w in &self.municipality.wards {
            if *w > 0 && !wards.contains(w) {
                wards.push(*w);
            }
        }
        if wards.is_empty() {
            wards = default_wards();
        }
        self.municipality.wards = wards;
    }

    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.municipality.wards, (1..=9).collect::<Vec<u32>>());
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(config.output.preview_rows, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[municipality]
name = "Khajura Rural Municipality"
wards = [1, 2, 3, 3, 0, 8]

[output]
dir = "public/data"
"#;
        let config = Config::parse(toml_content, Path::new("palika.toml")).unwrap();
        assert_eq!(config.municipality.name, "Khajura Rural Municipality");
        assert_eq!(config.municipality.wards, vec![1, 2, 3, 8]);
        assert_eq!(config.output.dir, PathBuf::from("public/data"));
        assert_eq!(config.output.preview_rows, 5);
        assert_eq!(config.layers.path, PathBuf::from("map_layers.json"));
    }

    #[test]
    fn test_empty_ward_list_uses_default() {
        let config = Config::parse("[municipality]\nwards = []\n", Path::new("x.toml")).unwrap();
        assert_eq!(config.municipality.wards.len(), 9);
    }

    #[test]
    fn test_bad_config_is_reported() {
        let err = Config::parse("[municipality\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[municipality]"));
        assert!(toml_str.contains("[output]"));
        let round: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(round.output.preview_rows, 5);
    }
}

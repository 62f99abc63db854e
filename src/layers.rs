//! Map layer visibility preferences.
//!
//! The preferences are a plain value owned by whoever drives the map. They are
//! read from disk with [`LayerPreferences::load`] and written back with
//! [`LayerPreferences::save`]; nothing here touches the filesystem on its own.

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapLayer {
    WardBoundaries,
    Roads,
    Settlements,
    HealthFacilities,
    Schools,
    WaterSources,
}

impl MapLayer {
    pub const ALL: [MapLayer; 6] = [
        MapLayer::WardBoundaries,
        MapLayer::Roads,
        MapLayer::Settlements,
        MapLayer::HealthFacilities,
        MapLayer::Schools,
        MapLayer::WaterSources,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            MapLayer::WardBoundaries => "ward-boundaries",
            MapLayer::Roads => "roads",
            MapLayer::Settlements => "settlements",
            MapLayer::HealthFacilities => "health-facilities",
            MapLayer::Schools => "schools",
            MapLayer::WaterSources => "water-sources",
        }
    }
}

impl fmt::Display for MapLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for MapLayer {
    type Err = ProfileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        MapLayer::ALL
            .into_iter()
            .find(|l| l.slug() == wanted)
            .ok_or_else(|| ProfileError::UnknownLayer(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerPreferences {
    pub ward_boundaries: bool,
    pub roads: bool,
    pub settlements: bool,
    pub health_facilities: bool,
    pub schools: bool,
    pub water_sources: bool,
}

impl Default for LayerPreferences {
    fn default() -> Self {
        Self {
            ward_boundaries: true,
            roads: true,
            settlements: false,
            health_facilities: false,
            schools: false,
            water_sources: false,
        }
    }
}

impl LayerPreferences {
    fn slot(&mut self, layer: MapLayer) -> &mut bool {
        match layer {
            MapLayer::WardBoundaries => &mut self.ward_boundaries,
            MapLayer::Roads => &mut self.roads,
            MapLayer::Settlements => &mut self.settlements,
            MapLayer::HealthFacilities => &mut self.health_facilities,
            MapLayer::Schools => &mut self.schools,
            MapLayer::WaterSources => &mut self.water_sources,
        }
    }

    pub fn is_visible(&self, layer: MapLayer) -> bool {
        match layer {
            MapLayer::WardBoundaries => self.ward_boundaries,
            MapLayer::Roads => self.roads,
            MapLayer::Settlements => self.settlements,
            MapLayer::HealthFacilities => self.health_facilities,
            MapLayer::Schools => self.schools,
            MapLayer::WaterSources => self.water_sources,
        }
    }

    pub fn set(&mut self, layer: MapLayer, visible: bool) {
        *self.slot(layer) = visible;
    }

    /// Flip a layer and return its new visibility.
    pub fn toggle(&mut self, layer: MapLayer) -> bool {
        let slot = self.slot(layer);
        *slot = !*slot;
        *slot
    }

    pub fn visible_layers(&self) -> Vec<MapLayer> {
        MapLayer::ALL
            .into_iter()
            .filter(|l| self.is_visible(*l))
            .collect()
    }

    /// Read preferences; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no saved layer preferences");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ProfileError::read(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProfileError::write(parent, e))?;
        }
        let s = serde_json::to_string_pretty(self)?;
        std::fs::write(path, s).map_err(|e| ProfileError::write(path, e))
    }
}

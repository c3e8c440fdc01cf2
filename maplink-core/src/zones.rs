use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::Result;

/// One zone as listed by the host's zone metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub zone_id: u32,
    pub place_name: String,
    pub map_id: u32,
}

/// Placement of a map's visible coordinate grid relative to raw positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGeometry {
    pub offset_x: i16,
    pub offset_y: i16,
    pub size_factor: u16,
}

/// Read access to the host's static zone metadata.
pub trait ZoneDirectory {
    /// Every known zone, in the host's own order.
    fn zones(&self) -> Vec<ZoneInfo>;

    /// Geometry of a bare map id (no instance bits).
    fn map_geometry(&self, map_id: u32) -> Option<MapGeometry>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapRecord {
    map_id: u32,
    #[serde(flatten)]
    geometry: MapGeometry,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    zones: Vec<ZoneInfo>,
    #[serde(default)]
    maps: Vec<MapRecord>,
}

/// In-memory zone directory, typically loaded from a JSON export of the
/// host's zone and map sheets:
///
/// ```json
/// { "zones": [ { "zone_id": 1, "place_name": "Eastern Fields", "map_id": 1 } ],
///   "maps":  [ { "map_id": 1, "offset_x": 0, "offset_y": 0, "size_factor": 100 } ] }
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticZoneDirectory {
    zones: Vec<ZoneInfo>,
    maps: HashMap<u32, MapGeometry>,
}

impl StaticZoneDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, zone_id: u32, place_name: &str, map_id: u32) -> Self {
        self.zones.push(ZoneInfo {
            zone_id,
            place_name: place_name.to_string(),
            map_id,
        });
        self
    }

    pub fn with_map(mut self, map_id: u32, offset_x: i16, offset_y: i16, size_factor: u16) -> Self {
        self.maps.insert(
            map_id,
            MapGeometry {
                offset_x,
                offset_y,
                size_factor,
            },
        );
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: DirectoryFile = serde_json::from_str(text)?;
        let maps = file
            .maps
            .into_iter()
            .map(|record| (record.map_id, record.geometry))
            .collect();
        Ok(Self {
            zones: file.zones,
            maps,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl ZoneDirectory for StaticZoneDirectory {
    fn zones(&self) -> Vec<ZoneInfo> {
        self.zones.clone()
    }

    fn map_geometry(&self, map_id: u32) -> Option<MapGeometry> {
        self.maps.get(&map_id).copied()
    }
}

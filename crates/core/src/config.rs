//! Configuration management for Vigil.
//!
//! The config carries everything fixed at process start: the equipment
//! inventory seed, the rescue-team roster seed, dispatch parameters, and the
//! queue store location.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub queue: QueueConfig,
    pub dispatch: DispatchConfig,
    pub inventory: Vec<InventoryItemConfig>,
    pub teams: Vec<TeamConfig>,
}

/// Priority-queue durability settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Path to the SQLite snapshot database
    pub db_path: String,
}

/// Dispatch and routing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Average response speed in km/h
    pub avg_speed_kmh: f64,
    /// Traffic multiplier applied to travel time
    pub traffic_multiplier: f64,
    /// Round-robin pool for auto-assigned team names
    pub team_pool: Vec<String>,
}

/// One equipment item seeded into the ledger at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemConfig {
    pub name: String,
    pub total: u32,
    pub threshold: u32,
}

/// One rescue team seeded into the roster at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    pub id: String,
    pub name: String,
    pub personnel: u32,
    pub vehicle: String,
    pub lat: f64,
    pub lng: f64,
    pub equipment: Vec<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        let item = |name: &str, total: u32, threshold: u32| InventoryItemConfig {
            name: name.to_string(),
            total,
            threshold,
        };

        let team = |id: &str,
                    name: &str,
                    personnel: u32,
                    vehicle: &str,
                    lat: f64,
                    lng: f64,
                    equipment: &[&str]| TeamConfig {
            id: id.to_string(),
            name: name.to_string(),
            personnel,
            vehicle: vehicle.to_string(),
            lat,
            lng,
            equipment: equipment.iter().map(|e| e.to_string()).collect(),
        };

        Self {
            queue: QueueConfig {
                db_path: "vigil_queue.db".to_string(),
            },
            dispatch: DispatchConfig {
                avg_speed_kmh: 40.0,
                traffic_multiplier: 1.2,
                team_pool: vec![
                    "T-Alpha".to_string(),
                    "T-Bravo".to_string(),
                    "T-Charlie".to_string(),
                    "T-Delta".to_string(),
                    "T-Echo".to_string(),
                    "T-Foxtrot".to_string(),
                ],
            },
            inventory: vec![
                item("stretcher", 15, 5),
                item("first_aid_kit", 30, 10),
                item("defibrillator", 5, 2),
                item("oxygen_tank", 10, 3),
                item("splints", 20, 5),
                item("pediatric_kit", 5, 2),
                item("wheelchair_stretcher", 3, 1),
                item("hydraulic_cutter", 4, 2),
                item("concrete_saw", 3, 1),
                item("airbag_lifter", 2, 1),
                item("flashlight", 50, 15),
                item("radio", 30, 10),
                item("rope", 20, 5),
                item("ladder", 8, 3),
                item("fire_extinguisher", 25, 8),
                item("breathing_apparatus", 12, 4),
                item("thermal_camera", 3, 1),
                item("life_jacket", 40, 15),
                item("inflatable_boat", 4, 2),
                item("water_pump", 6, 2),
            ],
            teams: vec![
                team(
                    "T-Alpha",
                    "Alpha Response Unit",
                    6,
                    "Heavy Rescue Truck",
                    13.7400,
                    100.5200,
                    &["hydraulic_cutter", "airbag_lifter", "stretcher", "first_aid_kit"],
                ),
                team(
                    "T-Bravo",
                    "Bravo Medical Team",
                    4,
                    "Ambulance Unit",
                    13.7350,
                    100.5150,
                    &["defibrillator", "oxygen_tank", "stretcher", "first_aid_kit", "iv_kit"],
                ),
                team(
                    "T-Charlie",
                    "Charlie SAR Team",
                    8,
                    "Rescue Boat + Truck",
                    13.7450,
                    100.5250,
                    &["life_vest", "rescue_boat", "rope", "thermal_blanket", "first_aid_kit"],
                ),
                team(
                    "T-Delta",
                    "Delta Fire Response",
                    5,
                    "Fire Engine",
                    13.7500,
                    100.5100,
                    &["fire_extinguisher", "breathing_apparatus", "thermal_camera", "hose"],
                ),
            ],
        }
    }
}

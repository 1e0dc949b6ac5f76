//! Geographic coordinates and travel-time estimation.
//!
//! Distances are great-circle (haversine); travel times assume an average
//! response speed adjusted by a traffic multiplier for hazard conditions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for coordinate construction
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate outside the valid range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Geographic location in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Location {
    /// Create a new location.
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lng` - Longitude in degrees (-180 to 180)
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidCoordinate(format!(
                "Latitude must be between -90 and 90, got {}",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::InvalidCoordinate(format!(
                "Longitude must be between -180 and 180, got {}",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Great-circle distance to another location in kilometers.
    ///
    /// Uses the haversine formula with a mean Earth radius of 6371 km.
    pub fn distance_km(&self, other: &Location) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// Travel-time model for dispatched teams.
///
/// ETA = distance / average speed, scaled by the traffic multiplier,
/// rounded up, never less than one minute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EtaModel {
    /// Average response speed in km/h
    pub avg_speed_kmh: f64,
    /// Multiplier applied for traffic and obstacles (1.0 = free flow)
    pub traffic_multiplier: f64,
}

impl EtaModel {
    /// Urban emergency baseline: 40 km/h with a 1.2x traffic allowance.
    pub fn urban_default() -> Self {
        Self {
            avg_speed_kmh: 40.0,
            traffic_multiplier: 1.2,
        }
    }

    /// Estimate arrival time in minutes for a distance in kilometers.
    pub fn eta_minutes(&self, distance_km: f64) -> u32 {
        let base_minutes = (distance_km / self.avg_speed_kmh) * 60.0;
        let adjusted = base_minutes * self.traffic_multiplier;
        (adjusted.ceil() as u32).max(1)
    }
}

impl Default for EtaModel {
    fn default() -> Self {
        Self::urban_default()
    }
}

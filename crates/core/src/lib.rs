//! Core functionality for the Vigil emergency dispatch system.
//!
//! This crate provides the fundamental types and utilities used across the
//! Vigil ecosystem: geographic coordinates and travel-time estimation,
//! configuration loading, structured logging, and timestamp helpers.

pub mod clock;
pub mod config;
pub mod geo;
pub mod logging;

pub use clock::now_ms;
pub use config::{Config, DispatchConfig, InventoryItemConfig, QueueConfig, TeamConfig};
pub use geo::{EtaModel, GeoError, Location};

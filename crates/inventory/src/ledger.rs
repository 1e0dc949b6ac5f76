//! Inventory Ledger - authoritative equipment counter store
//!
//! Tracks per-item total/reserved counts with reserve/release/status
//! operations. The read-check-write in `reserve` is a single critical
//! section: two concurrent reserves against the same item can never jointly
//! oversubscribe it.
//!
//! # Guarantees
//!
//! - For every item, `0 <= reserved <= total` at all times
//! - `available = total - reserved` never goes negative
//! - Reserve requesting more than available fails, it does not clamp
//! - Release requesting more than reserved clamps to what was reserved

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};
use vigil_core::config::InventoryItemConfig;
use vigil_core::now_ms;

/// Errors that can occur in ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The requested item does not exist in the inventory
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// An exact reserve request exceeded the available quantity
    #[error("Insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Equipment name
        item: String,
        /// Quantity requested
        requested: u32,
        /// Quantity currently available
        available: u32,
    },
}

/// Derived stock level, a pure function of available quantity and threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Stock above threshold
    Ok,
    /// Available at or below threshold
    Low,
    /// Available at or below half the threshold
    Critical,
    /// No stock available
    Out,
}

impl StockLevel {
    /// Compute the stock level for an available quantity and threshold.
    pub fn for_quantities(available: u32, threshold: u32) -> Self {
        if available == 0 {
            StockLevel::Out
        } else if available <= threshold / 2 {
            StockLevel::Critical
        } else if available <= threshold {
            StockLevel::Low
        } else {
            StockLevel::Ok
        }
    }

    /// True if the level warrants an operator alert.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, StockLevel::Ok)
    }
}

/// Point-in-time status of a single equipment item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatus {
    pub available: u32,
    pub total: u32,
    pub reserved: u32,
    pub threshold: u32,
    pub status: StockLevel,
}

/// Snapshot of the whole inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryStatus {
    /// Snapshot timestamp (Unix epoch milliseconds)
    pub checked_at: u64,
    /// Per-item status keyed by equipment name
    pub items: BTreeMap<String, ItemStatus>,
}

/// Successful reservation receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub reserved_qty: u32,
    pub available_after: u32,
}

/// Release receipt; `released_qty` may be less than requested (clamped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub released_qty: u32,
    pub available_after: u32,
}

/// Alert raised when a reserve drops an item into a degraded level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlert {
    pub item: String,
    pub level: StockLevel,
    pub message: String,
    pub raised_at: u64,
}

#[derive(Debug, Clone)]
struct ItemRecord {
    total: u32,
    reserved: u32,
    threshold: u32,
}

impl ItemRecord {
    fn available(&self) -> u32 {
        self.total - self.reserved
    }

    fn level(&self) -> StockLevel {
        StockLevel::for_quantities(self.available(), self.threshold)
    }

    fn status(&self) -> ItemStatus {
        ItemStatus {
            available: self.available(),
            total: self.total,
            reserved: self.reserved,
            threshold: self.threshold,
            status: self.level(),
        }
    }
}

/// Authoritative counter store for equipment quantities.
///
/// The item set is fixed at construction; only the reserved counts change.
pub struct Ledger {
    items: RwLock<HashMap<String, ItemRecord>>,
    alerts: Mutex<Vec<StockAlert>>,
}

impl Ledger {
    /// Build a ledger from config seed entries. Item names are normalized
    /// to lowercase; duplicate names keep the last entry.
    pub fn from_config(seed: &[InventoryItemConfig]) -> Self {
        let items = seed
            .iter()
            .map(|item| {
                (
                    item.name.to_lowercase(),
                    ItemRecord {
                        total: item.total,
                        reserved: 0,
                        threshold: item.threshold,
                    },
                )
            })
            .collect();

        info!(item_count = seed.len(), "Inventory ledger initialized");

        Self {
            items: RwLock::new(items),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Build a ledger with the standard 20-item emergency equipment seed.
    pub fn with_default_inventory() -> Self {
        Self::from_config(&vigil_core::Config::default_config().inventory)
    }

    /// Reserve `qty` units of `item`, failing if fewer are available.
    ///
    /// The availability check and the counter update happen under one write
    /// lock, so concurrent reserves are serialized per ledger.
    pub fn reserve(&self, item: &str, qty: u32) -> Result<Reservation, LedgerError> {
        let name = item.to_lowercase();
        let mut items = self.items.write().expect("ledger lock poisoned");

        let record = items
            .get_mut(&name)
            .ok_or_else(|| LedgerError::ItemNotFound(name.clone()))?;

        let available = record.available();
        if qty > available {
            return Err(LedgerError::InsufficientStock {
                item: name,
                requested: qty,
                available,
            });
        }

        let level_before = record.level();
        record.reserved += qty;
        let available_after = record.available();
        let level_after = record.level();
        drop(items);

        debug!(item = %name, qty, available_after, "Reserved equipment");

        if level_after != level_before && level_after.is_degraded() {
            self.raise_alert(&name, level_after, available_after);
        }

        Ok(Reservation {
            reserved_qty: qty,
            available_after,
        })
    }

    /// Release up to `qty` units of `item` back to the pool.
    ///
    /// Releasing more than is reserved clamps to the reserved count; the
    /// clamp is logged so caller bugs stay visible.
    pub fn release(&self, item: &str, qty: u32) -> Result<Release, LedgerError> {
        let name = item.to_lowercase();
        let mut items = self.items.write().expect("ledger lock poisoned");

        let record = items
            .get_mut(&name)
            .ok_or_else(|| LedgerError::ItemNotFound(name.clone()))?;

        let released_qty = qty.min(record.reserved);
        if released_qty < qty {
            warn!(
                item = %name,
                requested = qty,
                reserved = record.reserved,
                "Release clamped to reserved count"
            );
        }

        record.reserved -= released_qty;
        let available_after = record.available();
        drop(items);

        debug!(item = %name, released_qty, available_after, "Released equipment");

        Ok(Release {
            released_qty,
            available_after,
        })
    }

    /// Status of a single item. Pure read.
    pub fn status(&self, item: &str) -> Result<ItemStatus, LedgerError> {
        let name = item.to_lowercase();
        let items = self.items.read().expect("ledger lock poisoned");
        items
            .get(&name)
            .map(ItemRecord::status)
            .ok_or(LedgerError::ItemNotFound(name))
    }

    /// Snapshot of every item. Pure read.
    pub fn status_all(&self) -> InventoryStatus {
        let items = self.items.read().expect("ledger lock poisoned");
        InventoryStatus {
            checked_at: now_ms(),
            items: items
                .iter()
                .map(|(name, record)| (name.clone(), record.status()))
                .collect(),
        }
    }

    /// Drain alerts raised since the last call.
    pub fn take_alerts(&self) -> Vec<StockAlert> {
        let mut alerts = self.alerts.lock().expect("alert lock poisoned");
        std::mem::take(&mut *alerts)
    }

    fn raise_alert(&self, item: &str, level: StockLevel, available: u32) {
        let alert = StockAlert {
            item: item.to_string(),
            level,
            message: format!("{} stock degraded to {:?} ({} left)", item, level, available),
            raised_at: now_ms(),
        };

        warn!(item, ?level, available, "Stock alert raised");
        self.alerts.lock().expect("alert lock poisoned").push(alert);
    }
}

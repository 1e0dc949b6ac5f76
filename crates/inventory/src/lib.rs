//! Equipment inventory for the Vigil dispatch core.
//!
//! The [`Ledger`] is the authoritative counter store for equipment
//! total/reserved quantities; the [`Allocator`] turns a requested equipment
//! list into a reservation outcome with partial-fulfillment semantics and
//! reverses it when a mission completes.

pub mod allocator;
pub mod ledger;

pub use allocator::{
    AllocationError, AllocationOutcome, AllocationRecord, Allocator, AssignedItem,
    EquipmentRequest, ReleaseOutcome, ShortfallItem, ShortfallReason,
};
pub use ledger::{
    InventoryStatus, ItemStatus, Ledger, LedgerError, Release, Reservation, StockAlert, StockLevel,
};

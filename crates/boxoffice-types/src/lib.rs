//! Shared type definitions for the box office.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: identifiers, the event read model, the persisted registry
//! layout, and payment ledger entries. Types flow to `TypeScript` via
//! `ts-rs` for API clients.
//!
//! # Modules
//!
//! - [`ids`] -- Account and ledger-entry UUID wrappers, the name-derived
//!   [`EventKey`]
//! - [`enums`] -- Ledger entry types
//! - [`structs`] -- Event info, persisted snapshot rows, ledger entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::LedgerEntryType;
pub use ids::{AccountId, EVENT_KEY_LEN, EventKey, LedgerEntryId};
pub use structs::{EventInfo, EventRow, LedgerEntry, RegistrySnapshot};

#[cfg(test)]
mod tests {
    //! Binding generation for API clients.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AccountId::export_all();
        let _ = crate::ids::LedgerEntryId::export_all();

        let _ = crate::enums::LedgerEntryType::export_all();

        let _ = crate::structs::EventInfo::export_all();
        let _ = crate::structs::EventRow::export_all();
        let _ = crate::structs::RegistrySnapshot::export_all();
        let _ = crate::structs::LedgerEntry::export_all();
    }
}

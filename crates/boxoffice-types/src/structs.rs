//! Core structs: event snapshots, persisted registry rows, ledger entries.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::LedgerEntryType;
use crate::ids::{AccountId, EventKey, LedgerEntryId};

// ---------------------------------------------------------------------------
// Event info (read model)
// ---------------------------------------------------------------------------

/// Point-in-time view of a single event, as returned by `getEventInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventInfo {
    /// Content-derived event key (64 hex characters).
    #[ts(type = "string")]
    pub key: EventKey,
    /// Event name.
    pub name: String,
    /// Event date as a Unix timestamp in seconds.
    pub date: i64,
    /// Ticket price in the smallest currency unit.
    pub price: u64,
    /// Ticket capacity.
    pub max_tickets: u64,
    /// Remaining capacity: `max_tickets - holders`.
    pub tickets_left: u64,
}

// ---------------------------------------------------------------------------
// Persisted registry layout
// ---------------------------------------------------------------------------

/// One row of the persisted event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRow {
    /// Event name. Its derived key must match the row's table key.
    pub name: String,
    /// Event date as a Unix timestamp in seconds.
    pub date: i64,
    /// Ticket price in the smallest currency unit.
    pub price: u64,
    /// Ticket capacity.
    pub max_tickets: u64,
    /// Current ticket holders, sorted.
    pub holders: BTreeSet<AccountId>,
}

/// Full persisted state of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegistrySnapshot {
    /// The privileged owner identity.
    pub owner: AccountId,
    /// Accumulated balance not yet withdrawn.
    pub balance: u64,
    /// Event keys in creation order.
    #[ts(type = "Array<string>")]
    pub order: Vec<EventKey>,
    /// Event table keyed by event key.
    #[ts(type = "Record<string, EventRow>")]
    pub events: BTreeMap<EventKey, EventRow>,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ledger entry
// ---------------------------------------------------------------------------

/// A single value movement recorded by the payment ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// The category of movement.
    pub entry_type: LedgerEntryType,
    /// The external account on the other side of the treasury
    /// (`None` for an opening balance).
    pub account: Option<AccountId>,
    /// Amount moved, always positive, in the smallest currency unit.
    pub amount: u64,
    /// The event a purchase paid for.
    #[ts(type = "string | null")]
    pub event_key: Option<EventKey>,
    /// Real-world timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_event_table_uses_hex_keys() {
        let key = EventKey::derive("Concert");
        let mut events = BTreeMap::new();
        events.insert(
            key,
            EventRow {
                name: String::from("Concert"),
                date: 1000,
                price: 20,
                max_tickets: 2,
                holders: BTreeSet::new(),
            },
        );
        let snapshot = RegistrySnapshot {
            owner: AccountId::new(),
            balance: 0,
            order: vec![key],
            events,
            saved_at: Utc::now(),
        };

        let value = serde_json::to_value(&snapshot).unwrap_or_default();
        assert_eq!(value["events"][key.to_hex()]["name"], "Concert");
        assert_eq!(value["order"][0], key.to_hex());

        let back: Result<RegistrySnapshot, _> = serde_json::from_value(value);
        assert_eq!(back.ok(), Some(snapshot));
    }
}

//! Enumeration types shared across the box office crates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Ledger entry type
// ---------------------------------------------------------------------------

/// The category of a value movement in the payment ledger.
///
/// | Type | From | To |
/// |------|------|----|
/// | Opening | (carried forward) | Treasury |
/// | Purchase | Buyer | Treasury |
/// | Withdrawal | Treasury | Owner |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LedgerEntryType {
    /// Balance carried forward from a restored snapshot.
    Opening,
    /// Ticket payment collected from a buyer.
    Purchase,
    /// Accumulated balance paid out to the registry owner.
    Withdrawal,
}

impl LedgerEntryType {
    /// Whether the entry moves value into the treasury.
    pub const fn is_inflow(self) -> bool {
        matches!(self, Self::Opening | Self::Purchase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflow_classification() {
        assert!(LedgerEntryType::Opening.is_inflow());
        assert!(LedgerEntryType::Purchase.is_inflow());
        assert!(!LedgerEntryType::Withdrawal.is_inflow());
    }

    #[test]
    fn entry_type_serializes_as_variant_name() {
        let json = serde_json::to_string(&LedgerEntryType::Purchase).unwrap_or_default();
        assert_eq!(json, "\"Purchase\"");
    }
}

//! Conservation check for the payment ledger.
//!
//! Value enters the treasury through `Opening` and `Purchase` entries and
//! leaves it through `Withdrawal` entries. The registry keeps its own
//! balance counter; the check is:
//!
//! ```text
//! sum(inflow entries) - sum(outflow entries) == held balance
//! ```
//!
//! The registry and gateway are updated under the same lock, so this holds
//! by construction. It exists to catch corrupted restores and gateway bugs.

use boxoffice_types::LedgerEntry;

use crate::LedgerAnomaly;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The log matches the held balance.
    Balanced,
    /// The log and the held balance disagree.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Sum inflow and outflow totals over `entries`.
///
/// Accumulates in `u128` so that no sequence of `u64` amounts can overflow
/// in practice; saturates rather than wrapping if it ever did.
pub fn flow_totals(entries: &[LedgerEntry]) -> (u128, u128) {
    let mut inflow: u128 = 0;
    let mut outflow: u128 = 0;

    for entry in entries {
        let amount = u128::from(entry.amount);
        if entry.entry_type.is_inflow() {
            inflow = inflow.saturating_add(amount);
        } else {
            outflow = outflow.saturating_add(amount);
        }
    }

    (inflow, outflow)
}

/// Verify that `entries` account for exactly `held`.
pub fn verify_conservation(entries: &[LedgerEntry], held: u64) -> ConservationResult {
    let (inflow, outflow) = flow_totals(entries);

    let balanced = inflow
        .checked_sub(outflow)
        .is_some_and(|net| net == u128::from(held));

    if balanced {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            inflow,
            outflow,
            held,
            message: format!(
                "LEDGER_ANOMALY: inflow {inflow} - outflow {outflow} does not equal held balance {held}"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionBuilder;
    use boxoffice_types::{AccountId, EventKey, LedgerEntryType};

    fn purchase(amount: u64) -> Option<LedgerEntry> {
        TransactionBuilder::new(LedgerEntryType::Purchase)
            .account(AccountId::new())
            .amount(amount)
            .event_key(EventKey::derive("Concert"))
            .build()
            .ok()
    }

    fn withdrawal(amount: u64) -> Option<LedgerEntry> {
        TransactionBuilder::new(LedgerEntryType::Withdrawal)
            .account(AccountId::new())
            .amount(amount)
            .build()
            .ok()
    }

    #[test]
    fn empty_log_balances_zero() {
        assert_eq!(verify_conservation(&[], 0), ConservationResult::Balanced);
    }

    #[test]
    fn empty_log_with_held_balance_is_anomaly() {
        let result = verify_conservation(&[], 10);
        assert!(!result.is_balanced());
    }

    #[test]
    fn purchases_minus_withdrawals_balance() {
        let entries: Vec<LedgerEntry> = [purchase(20), purchase(30), withdrawal(50), purchase(7)]
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(entries.len(), 4);
        assert_eq!(flow_totals(&entries), (57, 50));
        assert_eq!(verify_conservation(&entries, 7), ConservationResult::Balanced);
    }

    #[test]
    fn overdrawn_log_is_anomaly() {
        let entries: Vec<LedgerEntry> = [purchase(5), withdrawal(9)].into_iter().flatten().collect();
        match verify_conservation(&entries, 0) {
            ConservationResult::Anomaly(anomaly) => {
                assert_eq!(anomaly.inflow, 5);
                assert_eq!(anomaly.outflow, 9);
                assert!(anomaly.message.contains("LEDGER_ANOMALY"));
            }
            ConservationResult::Balanced => panic!("expected anomaly"),
        }
    }
}

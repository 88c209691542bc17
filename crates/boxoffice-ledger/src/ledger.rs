//! The payment ledger: an append-only log of treasury movements.
//!
//! The [`Ledger`] struct is the in-memory [`PaymentGateway`] used by the box
//! office. It holds every [`LedgerEntry`] and provides recording methods,
//! per-account queries, and the conservation check.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Integer amounts**: all amounts are `u64` in the smallest currency unit.
//! - **Zero moves nothing**: zero-amount collections and disbursements
//!   succeed without recording an entry.

use boxoffice_types::{AccountId, EventKey, LedgerEntry, LedgerEntryType};

use crate::conservation::{ConservationResult, flow_totals, verify_conservation};
use crate::{LedgerError, PaymentError, PaymentGateway, TransactionBuilder};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The in-memory payment ledger.
///
/// Every collected ticket payment and every withdrawal produces one
/// [`LedgerEntry`] appended to this ledger.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate and append an entry, returning a reference to it.
    fn push(&mut self, builder: TransactionBuilder) -> Result<&LedgerEntry, LedgerError> {
        let entry = builder.build()?;
        self.entries.push(entry);

        self.entries.last().ok_or(LedgerError::InternalError(
            "failed to retrieve entry after append",
        ))
    }

    /// Record a ticket payment from `payer` for the event `event_key`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_purchase(
        &mut self,
        payer: AccountId,
        amount: u64,
        event_key: EventKey,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.push(
            TransactionBuilder::new(LedgerEntryType::Purchase)
                .account(payer)
                .amount(amount)
                .event_key(event_key),
        )
    }

    /// Record a payout of the treasury to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_withdrawal(
        &mut self,
        recipient: AccountId,
        amount: u64,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.push(
            TransactionBuilder::new(LedgerEntryType::Withdrawal)
                .account(recipient)
                .amount(amount),
        )
    }

    /// Record a balance carried forward from persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_opening(&mut self, amount: u64) -> Result<&LedgerEntry, LedgerError> {
        self.push(TransactionBuilder::new(LedgerEntryType::Opening).amount(amount))
    }

    /// Return all entries in insertion order.
    pub fn all_entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Return all entries naming `account`.
    pub fn entries_for_account(&self, account: AccountId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.account == Some(account))
            .collect()
    }

    /// Total an account has paid into the treasury.
    pub fn total_paid_by(&self, account: AccountId) -> u128 {
        self.entries
            .iter()
            .filter(|e| e.entry_type == LedgerEntryType::Purchase && e.account == Some(account))
            .fold(0_u128, |acc, e| acc.saturating_add(u128::from(e.amount)))
    }

    /// Net treasury balance according to the log, or `None` if the log
    /// records more outflow than inflow.
    pub fn net_balance(&self) -> Option<u128> {
        let (inflow, outflow) = flow_totals(&self.entries);
        inflow.checked_sub(outflow)
    }
}

impl PaymentGateway for Ledger {
    fn collect(
        &mut self,
        payer: AccountId,
        amount: u64,
        event_key: EventKey,
    ) -> Result<(), PaymentError> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.record_purchase(payer, amount, event_key)?;
        tracing::debug!(entry_id = %entry.id, %payer, amount, "payment collected");
        Ok(())
    }

    fn disburse(&mut self, recipient: AccountId, amount: u64) -> Result<(), PaymentError> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.record_withdrawal(recipient, amount)?;
        tracing::debug!(entry_id = %entry.id, %recipient, amount, "funds disbursed");
        Ok(())
    }

    fn open_balance(&mut self, amount: u64) -> Result<(), PaymentError> {
        if amount == 0 {
            return Ok(());
        }
        self.record_opening(amount)?;
        Ok(())
    }

    fn verify_conservation(&self, held: u64) -> ConservationResult {
        verify_conservation(&self.entries, held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concert() -> EventKey {
        EventKey::derive("Concert")
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.net_balance(), Some(0));
    }

    #[test]
    fn record_purchase_appends_entry() {
        let mut ledger = Ledger::new();
        let buyer = AccountId::new();

        let result = ledger.record_purchase(buyer, 20, concert());

        assert!(result.is_ok());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_paid_by(buyer), 20);
    }

    #[test]
    fn collect_zero_records_nothing() {
        let mut ledger = Ledger::new();
        assert!(ledger.collect(AccountId::new(), 0, concert()).is_ok());
        assert!(ledger.disburse(AccountId::new(), 0).is_ok());
        assert!(ledger.open_balance(0).is_ok());
        assert!(ledger.is_empty());
    }

    #[test]
    fn collect_then_disburse_balances() {
        let mut ledger = Ledger::new();
        let buyer_a = AccountId::new();
        let buyer_b = AccountId::new();
        let owner = AccountId::new();

        assert!(ledger.collect(buyer_a, 20, concert()).is_ok());
        assert!(ledger.collect(buyer_b, 35, concert()).is_ok());
        assert_eq!(ledger.verify_conservation(55), ConservationResult::Balanced);
        assert_eq!(ledger.net_balance(), Some(55));

        assert!(ledger.disburse(owner, 55).is_ok());
        assert_eq!(ledger.verify_conservation(0), ConservationResult::Balanced);
        assert_eq!(ledger.entries_for_account(owner).len(), 1);
    }

    #[test]
    fn opening_balance_counts_as_inflow() {
        let mut ledger = Ledger::new();
        assert!(ledger.open_balance(40).is_ok());
        assert_eq!(ledger.verify_conservation(40), ConservationResult::Balanced);
        assert!(!ledger.verify_conservation(0).is_balanced());
    }

    #[test]
    fn total_paid_ignores_withdrawals() {
        let mut ledger = Ledger::new();
        let account = AccountId::new();
        let _ = ledger.record_purchase(account, 10, concert());
        let _ = ledger.record_withdrawal(account, 10);
        assert_eq!(ledger.total_paid_by(account), 10);
        assert_eq!(ledger.entries_for_account(account).len(), 2);
    }
}

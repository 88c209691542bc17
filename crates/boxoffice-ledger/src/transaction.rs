//! Transaction builders and validation for the payment ledger.
//!
//! Provides a [`TransactionBuilder`] that enforces the shape of each entry
//! type before producing a [`LedgerEntry`].

use chrono::Utc;

use boxoffice_types::{AccountId, EventKey, LedgerEntry, LedgerEntryId, LedgerEntryType};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// Enforces a non-zero amount and the per-type shape:
///
/// | Type | Account | Event key |
/// |------|---------|-----------|
/// | Opening | none | none |
/// | Purchase | payer | required |
/// | Withdrawal | recipient | none |
///
/// # Examples
///
/// ```
/// use boxoffice_ledger::TransactionBuilder;
/// use boxoffice_types::{AccountId, EventKey, LedgerEntryType};
///
/// let entry = TransactionBuilder::new(LedgerEntryType::Purchase)
///     .account(AccountId::new())
///     .amount(20)
///     .event_key(EventKey::derive("Concert"))
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    entry_type: LedgerEntryType,
    account: Option<AccountId>,
    amount: Option<u64>,
    event_key: Option<EventKey>,
}

impl TransactionBuilder {
    /// Start building a ledger entry of the given type.
    pub const fn new(entry_type: LedgerEntryType) -> Self {
        Self {
            entry_type,
            account: None,
            amount: None,
            event_key: None,
        }
    }

    /// Set the external account on the other side of the treasury.
    #[must_use]
    pub const fn account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    /// Set the amount moved.
    #[must_use]
    pub const fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the event a purchase pays for.
    #[must_use]
    pub const fn event_key(mut self, key: EventKey) -> Self {
        self.event_key = Some(key);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if the amount, a required
    /// account, or a purchase's event key is not set.
    /// Returns [`LedgerError::ZeroAmount`] if the amount is zero.
    /// Returns [`LedgerError::UnexpectedAccount`] or
    /// [`LedgerError::UnexpectedEventKey`] if a field is set that the entry
    /// type does not allow.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        match self.entry_type {
            LedgerEntryType::Opening => {
                if self.account.is_some() {
                    return Err(LedgerError::UnexpectedAccount {
                        entry_type: self.entry_type,
                    });
                }
            }
            LedgerEntryType::Purchase | LedgerEntryType::Withdrawal => {
                if self.account.is_none() {
                    return Err(LedgerError::MissingField("account"));
                }
            }
        }

        match (self.entry_type, self.event_key) {
            (LedgerEntryType::Purchase, None) => {
                return Err(LedgerError::MissingField("event_key"));
            }
            (LedgerEntryType::Opening | LedgerEntryType::Withdrawal, Some(_)) => {
                return Err(LedgerError::UnexpectedEventKey {
                    entry_type: self.entry_type,
                });
            }
            _ => {}
        }

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            entry_type: self.entry_type,
            account: self.account,
            amount,
            event_key: self.event_key,
            created_at: Utc::now(),
        })
    }
}

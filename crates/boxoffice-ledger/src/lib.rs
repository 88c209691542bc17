//! Payment ledger for the box office.
//!
//! The registry never moves money itself. Every value-bearing operation goes
//! through a [`PaymentGateway`]: ticket payments are collected into the
//! treasury, and withdrawals disburse the accumulated balance to the owner.
//! The default gateway is the in-memory [`Ledger`], an append-only log of
//! [`LedgerEntry`] records.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only log with recording methods.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated entry construction.
//! - [`conservation`] -- Conservation check between the log and the
//!   balance the registry claims to hold.
//!
//! # Conservation Law
//!
//! At every observation point:
//!
//! ```text
//! sum(Opening) + sum(Purchase) - sum(Withdrawal) == registry balance
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! # Usage
//!
//! ```
//! use boxoffice_ledger::{ConservationResult, Ledger, PaymentGateway};
//! use boxoffice_types::{AccountId, EventKey};
//!
//! let mut ledger = Ledger::new();
//! let buyer = AccountId::new();
//! let owner = AccountId::new();
//!
//! ledger.collect(buyer, 20, EventKey::derive("Concert")).ok();
//! assert_eq!(ledger.verify_conservation(20), ConservationResult::Balanced);
//!
//! ledger.disburse(owner, 20).ok();
//! assert_eq!(ledger.verify_conservation(0), ConservationResult::Balanced);
//! ```
//!
//! [`LedgerEntry`]: boxoffice_types::LedgerEntry

pub mod conservation;
pub mod ledger;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::Ledger;
pub use transaction::TransactionBuilder;

use boxoffice_types::{AccountId, EventKey, LedgerEntryType};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("ledger entry amount must be non-zero")]
    ZeroAmount,

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An opening balance names no external account.
    #[error("{entry_type:?} entries must not name an account")]
    UnexpectedAccount {
        /// The entry type being validated.
        entry_type: LedgerEntryType,
    },

    /// Only purchases reference an event.
    #[error("{entry_type:?} entries must not reference an event")]
    UnexpectedEventKey {
        /// The entry type being validated.
        entry_type: LedgerEntryType,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

/// Errors surfaced by a [`PaymentGateway`].
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The counterparty refused the transfer.
    #[error("payment of {amount} to or from {account} was declined")]
    Declined {
        /// The account on the other side of the treasury.
        account: AccountId,
        /// The amount that failed to move.
        amount: u64,
    },

    /// The movement could not be recorded.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation violation: the log and the held balance disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Total value recorded into the treasury (opening + purchases).
    pub inflow: u128,
    /// Total value recorded out of the treasury (withdrawals).
    pub outflow: u128,
    /// The balance the registry claims to hold.
    pub held: u64,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ---------------------------------------------------------------------------
// Gateway seam
// ---------------------------------------------------------------------------

/// The payment collaborator the registry delegates value movement to.
///
/// Implementations must be all-or-nothing per call: an `Err` means no value
/// moved and nothing was recorded.
pub trait PaymentGateway: Send {
    /// Collect a ticket payment from `payer` into the treasury.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the charge is refused or cannot be
    /// recorded.
    fn collect(
        &mut self,
        payer: AccountId,
        amount: u64,
        event_key: EventKey,
    ) -> Result<(), PaymentError>;

    /// Pay `amount` out of the treasury to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Declined`] if the recipient refuses the
    /// funds.
    fn disburse(&mut self, recipient: AccountId, amount: u64) -> Result<(), PaymentError>;

    /// Record a balance carried forward from persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the entry cannot be recorded.
    fn open_balance(&mut self, amount: u64) -> Result<(), PaymentError>;

    /// Check the gateway's books against the balance the registry holds.
    fn verify_conservation(&self, held: u64) -> ConservationResult;
}

//! The serialization boundary around the registry and its payment gateway.
//!
//! [`BoxOffice`] owns the [`Registry`] and the [`PaymentGateway`] behind a
//! single [`tokio::sync::Mutex`]. Every operation, reads included, takes the
//! lock once and runs to completion without awaiting anything else, so no
//! two operations ever interleave.
//!
//! # Value-bearing operations
//!
//! - **Purchase**: confirm eligibility, collect the payment, then commit the
//!   registry mutation. If collection fails the registry is never touched.
//! - **Withdrawal**: confirm the caller is the owner, disburse the balance,
//!   then zero it. If disbursement fails the balance is left as it was.

use std::sync::Arc;

use boxoffice_ledger::{ConservationResult, Ledger, PaymentError, PaymentGateway};
use boxoffice_types::{AccountId, EventInfo, EventKey, RegistrySnapshot};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::registry::{NewEvent, Registry, RegistryError};
use crate::snapshot::{self, SnapshotError};

/// Errors returned by [`BoxOffice`] operations.
#[derive(Debug, thiserror::Error)]
pub enum OfficeError {
    /// A registry precondition was violated.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The payment gateway refused or failed to move funds.
    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    /// A snapshot could not be restored.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Registry and gateway, always locked together.
struct OfficeState {
    registry: Registry,
    gateway: Box<dyn PaymentGateway>,
}

/// Thread-safe front door to the registry.
///
/// Cheap to share: wrap in an [`Arc`] and hand clones to request handlers.
pub struct BoxOffice {
    state: Mutex<OfficeState>,
}

impl core::fmt::Debug for BoxOffice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxOffice").finish_non_exhaustive()
    }
}

impl BoxOffice {
    /// Create a box office with an empty registry and an in-memory
    /// [`Ledger`] as the payment gateway.
    pub fn new(owner: AccountId) -> Self {
        Self::with_gateway(Registry::new(owner), Box::new(Ledger::new()))
    }

    /// Create a box office around an existing registry and gateway.
    pub fn with_gateway(registry: Registry, gateway: Box<dyn PaymentGateway>) -> Self {
        Self {
            state: Mutex::new(OfficeState { registry, gateway }),
        }
    }

    /// Restore a box office from a persisted snapshot.
    ///
    /// The snapshot's balance is recorded as an opening entry in `gateway`
    /// so the conservation check keeps holding.
    ///
    /// # Errors
    ///
    /// Returns [`OfficeError::Snapshot`] if the snapshot is inconsistent or
    /// belongs to a different owner, or [`OfficeError::Payment`] if the
    /// opening balance cannot be recorded.
    pub fn restore(
        owner: AccountId,
        snapshot: RegistrySnapshot,
        mut gateway: Box<dyn PaymentGateway>,
    ) -> Result<Self, OfficeError> {
        let registry = snapshot::restore(owner, snapshot)?;
        gateway.open_balance(registry.balance())?;
        Ok(Self::with_gateway(registry, gateway))
    }

    /// Wrap in an [`Arc`] for sharing across tasks.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    // -----------------------------------------------------------------------
    // Privileged operations
    // -----------------------------------------------------------------------

    /// Register a new event. Owner only.
    ///
    /// Returns the new event as it stood when created.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotOwner`] or [`RegistryError::ExistingEvent`].
    pub async fn create_event(
        &self,
        caller: AccountId,
        event: NewEvent,
    ) -> Result<EventInfo, OfficeError> {
        let mut state = self.state.lock().await;
        let name = event.name.clone();
        state.registry.create_event(caller, event).map_err(|e| {
            debug!(%caller, error = %e, "create_event rejected");
            OfficeError::from(e)
        })?;
        Ok(state.registry.event_info(&name)?)
    }

    /// Pay the whole accumulated balance out to the owner, returning the
    /// amount withdrawn.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotOwner`] if `caller` is not the owner, or
    /// [`OfficeError::Payment`] if the gateway fails to disburse; in that
    /// case the balance is unchanged.
    pub async fn withdraw_funds(&self, caller: AccountId) -> Result<u64, OfficeError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let amount = state.registry.withdrawable(caller).map_err(|e| {
            debug!(%caller, error = %e, "withdraw_funds rejected");
            OfficeError::from(e)
        })?;

        if let Err(e) = state.gateway.disburse(caller, amount) {
            warn!(%caller, amount, error = %e, "withdrawal aborted, balance retained");
            return Err(e.into());
        }

        Ok(state.registry.withdraw_funds(caller)?)
    }

    // -----------------------------------------------------------------------
    // Read-only operations
    // -----------------------------------------------------------------------

    /// Event names in creation order.
    pub async fn list_events(&self) -> Vec<String> {
        self.state.lock().await.registry.list_events()
    }

    /// Snapshot of a single event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if no such event exists.
    pub async fn event_info(&self, name: &str) -> Result<EventInfo, OfficeError> {
        Ok(self.state.lock().await.registry.event_info(name)?)
    }

    /// Whether `caller` holds a ticket for the named event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if no such event exists.
    pub async fn is_ticket_holder(&self, name: &str, caller: AccountId) -> Result<bool, OfficeError> {
        Ok(self.state.lock().await.registry.is_ticket_holder(name, caller)?)
    }

    /// Names of every event `caller` holds a ticket for, in creation order.
    pub async fn held_events(&self, caller: AccountId) -> Vec<String> {
        self.state.lock().await.registry.held_events(caller)
    }

    /// Accumulated balance not yet withdrawn.
    pub async fn balance(&self) -> u64 {
        self.state.lock().await.registry.balance()
    }

    /// Number of registered events.
    pub async fn event_count(&self) -> usize {
        self.state.lock().await.registry.event_count()
    }

    /// The registry owner.
    pub async fn owner(&self) -> AccountId {
        self.state.lock().await.registry.owner()
    }

    /// Check the gateway's books against the registry balance.
    pub async fn audit(&self) -> ConservationResult {
        let state = self.state.lock().await;
        let result = state.gateway.verify_conservation(state.registry.balance());
        if let ConservationResult::Anomaly(anomaly) = &result {
            error!(
                inflow = %anomaly.inflow,
                outflow = %anomaly.outflow,
                held = anomaly.held,
                "{anomaly}"
            );
        }
        result
    }

    /// Capture the registry in its persisted layout.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        snapshot::capture(&self.state.lock().await.registry)
    }

    // -----------------------------------------------------------------------
    // Purchase and resale
    // -----------------------------------------------------------------------

    /// Buy a ticket for `caller`, collecting `payment` through the gateway.
    ///
    /// The full payment is retained even when it exceeds the price.
    ///
    /// # Errors
    ///
    /// Returns the first violated purchase precondition (see
    /// [`Registry::check_purchase`]) or [`OfficeError::Payment`] if the
    /// gateway refuses the charge. Either way the caller is not added.
    pub async fn buy_ticket(
        &self,
        name: &str,
        caller: AccountId,
        payment: u64,
    ) -> Result<EventKey, OfficeError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let key = state
            .registry
            .check_purchase(name, caller, payment)
            .map_err(|e| {
                debug!(event = %name, %caller, payment, error = %e, "buy_ticket rejected");
                OfficeError::from(e)
            })?;

        if let Err(e) = state.gateway.collect(caller, payment, key) {
            warn!(event = %name, %caller, payment, error = %e, "payment collection failed");
            return Err(e.into());
        }

        Ok(state.registry.buy_ticket(name, caller, payment)?)
    }

    /// Transfer the caller's ticket to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`], [`RegistryError::NotOwner`]
    /// (caller holds no ticket), or [`RegistryError::AlreadyOwner`]
    /// (recipient already holds one).
    pub async fn resell_ticket(
        &self,
        name: &str,
        caller: AccountId,
        recipient: AccountId,
    ) -> Result<(), OfficeError> {
        let mut state = self.state.lock().await;
        state
            .registry
            .resell_ticket(name, caller, recipient)
            .map_err(|e| {
                debug!(event = %name, %caller, %recipient, error = %e, "resell_ticket rejected");
                e.into()
            })
    }
}

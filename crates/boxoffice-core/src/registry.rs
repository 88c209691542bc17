//! The event registry: catalog, holder sets, and the accumulated balance.
//!
//! [`Registry`] is a plain state machine with no interior locking. Every
//! method either fully applies its mutation or returns a [`RegistryError`]
//! with the registry untouched; callers that share a registry between tasks
//! must serialize access themselves (see [`crate::office::BoxOffice`]).
//!
//! Events are addressed by their name-derived [`EventKey`], so duplicate
//! detection and lookup are a single map probe. Creation order is kept in a
//! separate key list and is authoritative for every enumeration.

use std::collections::{BTreeMap, BTreeSet};

use boxoffice_types::{AccountId, EventInfo, EventKey};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Precondition violations reported by registry operations.
///
/// None of these are transient: every one reflects a caller-side error and
/// retrying the same request yields the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Creation attempted for a name already registered.
    #[error("event already exists: {0}")]
    ExistingEvent(String),

    /// The named event does not exist.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// The identity already holds a ticket for the event.
    #[error("{0} already holds a ticket for this event")]
    AlreadyOwner(AccountId),

    /// The event is at capacity.
    #[error("all {0} tickets are sold")]
    AllTicketsSold(u64),

    /// The payment does not cover the ticket price.
    #[error("payment does not cover ticket price of {0}")]
    TicketPriceNotCovered(u64),

    /// The identity is not the registry owner (privileged operations) or
    /// does not hold a ticket (resale).
    #[error("{0} is not the owner")]
    NotOwner(AccountId),

    /// Accepting the payment would overflow the accumulated balance.
    #[error("accumulated balance would overflow")]
    BalanceOverflow,
}

// ---------------------------------------------------------------------------
// Event record
// ---------------------------------------------------------------------------

/// A single event and its current ticket holders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event name; its derived key is the record's map key.
    pub name: String,
    /// Event date as a Unix timestamp in seconds.
    pub date: i64,
    /// Ticket price in the smallest currency unit.
    pub price: u64,
    /// Ticket capacity.
    pub max_tickets: u64,
    /// Current ticket holders.
    pub holders: BTreeSet<AccountId>,
}

impl EventRecord {
    /// Number of tickets currently held.
    pub fn sold(&self) -> u64 {
        u64::try_from(self.holders.len()).unwrap_or(u64::MAX)
    }

    /// Remaining capacity.
    pub fn tickets_left(&self) -> u64 {
        self.max_tickets.saturating_sub(self.sold())
    }

    /// Whether no further tickets can be sold.
    pub fn is_sold_out(&self) -> bool {
        self.sold() >= self.max_tickets
    }

    /// Build the public read model for this record.
    pub fn info(&self, key: EventKey) -> EventInfo {
        EventInfo {
            key,
            name: self.name.clone(),
            date: self.date,
            price: self.price,
            max_tickets: self.max_tickets,
            tickets_left: self.tickets_left(),
        }
    }
}

/// Arguments to [`Registry::create_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// Event date as a Unix timestamp in seconds.
    pub date: i64,
    /// Ticket price in the smallest currency unit.
    pub price: u64,
    /// Ticket capacity.
    pub max_tickets: u64,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The event registry.
///
/// Invariants, held after every method returns:
/// 1. Every key in `order` is present in `events` exactly once, and vice
///    versa.
/// 2. For every event, `holders.len() <= max_tickets`.
/// 3. `owner` never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    owner: AccountId,
    events: BTreeMap<EventKey, EventRecord>,
    order: Vec<EventKey>,
    balance: u64,
}

impl Registry {
    /// Create an empty registry owned by `owner`.
    pub const fn new(owner: AccountId) -> Self {
        Self {
            owner,
            events: BTreeMap::new(),
            order: Vec::new(),
            balance: 0,
        }
    }

    /// Reassemble a registry from already-validated parts.
    ///
    /// Used by snapshot restore, which checks the invariants first.
    pub(crate) const fn from_parts(
        owner: AccountId,
        events: BTreeMap<EventKey, EventRecord>,
        order: Vec<EventKey>,
        balance: u64,
    ) -> Self {
        Self {
            owner,
            events,
            order,
            balance,
        }
    }

    /// The privileged owner identity.
    pub const fn owner(&self) -> AccountId {
        self.owner
    }

    /// Accumulated balance not yet withdrawn.
    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Number of registered events.
    pub const fn event_count(&self) -> usize {
        self.order.len()
    }

    /// Iterate `(key, record)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (EventKey, &EventRecord)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.events.get(key).map(|record| (*key, record)))
    }

    /// Look up an event record by name.
    pub fn get(&self, name: &str) -> Option<&EventRecord> {
        self.events.get(&EventKey::derive(name))
    }

    fn require_owner(&self, caller: AccountId) -> Result<(), RegistryError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(RegistryError::NotOwner(caller))
        }
    }

    fn lookup(&self, name: &str) -> Result<(EventKey, &EventRecord), RegistryError> {
        let key = EventKey::derive(name);
        self.events
            .get(&key)
            .map(|record| (key, record))
            .ok_or_else(|| RegistryError::EventNotFound(name.to_owned()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut EventRecord, RegistryError> {
        self.events
            .get_mut(&EventKey::derive(name))
            .ok_or_else(|| RegistryError::EventNotFound(name.to_owned()))
    }

    // -----------------------------------------------------------------------
    // Privileged operations
    // -----------------------------------------------------------------------

    /// Register a new event with an empty holder set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotOwner`] if `caller` is not the owner, or
    /// [`RegistryError::ExistingEvent`] if the name is already registered.
    pub fn create_event(&mut self, caller: AccountId, event: NewEvent) -> Result<EventKey, RegistryError> {
        self.require_owner(caller)?;

        let key = EventKey::derive(&event.name);
        if self.events.contains_key(&key) {
            debug!(name = %event.name, "duplicate event rejected");
            return Err(RegistryError::ExistingEvent(event.name));
        }

        info!(
            name = %event.name,
            %key,
            date = event.date,
            price = event.price,
            max_tickets = event.max_tickets,
            "event created"
        );

        self.events.insert(
            key,
            EventRecord {
                name: event.name,
                date: event.date,
                price: event.price,
                max_tickets: event.max_tickets,
                holders: BTreeSet::new(),
            },
        );
        self.order.push(key);

        Ok(key)
    }

    /// Check that `caller` may withdraw, returning the amount that would be
    /// paid out.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotOwner`] if `caller` is not the owner.
    pub fn withdrawable(&self, caller: AccountId) -> Result<u64, RegistryError> {
        self.require_owner(caller)?;
        Ok(self.balance)
    }

    /// Zero the accumulated balance, returning the amount withdrawn.
    ///
    /// The caller is responsible for actually moving the funds; see
    /// [`crate::office::BoxOffice::withdraw_funds`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotOwner`] if `caller` is not the owner.
    pub fn withdraw_funds(&mut self, caller: AccountId) -> Result<u64, RegistryError> {
        let amount = self.withdrawable(caller)?;
        self.balance = 0;
        info!(owner = %caller, amount, "funds withdrawn");
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Read-only operations
    // -----------------------------------------------------------------------

    /// Event names in creation order.
    pub fn list_events(&self) -> Vec<String> {
        self.iter().map(|(_, record)| record.name.clone()).collect()
    }

    /// Snapshot of a single event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if no such event exists.
    pub fn event_info(&self, name: &str) -> Result<EventInfo, RegistryError> {
        let (key, record) = self.lookup(name)?;
        Ok(record.info(key))
    }

    /// Whether `caller` currently holds a ticket for the named event.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if no such event exists.
    pub fn is_ticket_holder(&self, name: &str, caller: AccountId) -> Result<bool, RegistryError> {
        let (_, record) = self.lookup(name)?;
        Ok(record.holders.contains(&caller))
    }

    /// Names, in creation order, of every event `caller` holds a ticket for.
    pub fn held_events(&self, caller: AccountId) -> Vec<String> {
        self.iter()
            .filter(|(_, record)| record.holders.contains(&caller))
            .map(|(_, record)| record.name.clone())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Purchase and resale
    // -----------------------------------------------------------------------

    /// Check every purchase precondition without mutating anything.
    ///
    /// Failures are reported in a fixed order: unknown event, caller already
    /// holding, sold out, insufficient payment, balance overflow.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition as a [`RegistryError`].
    pub fn check_purchase(
        &self,
        name: &str,
        caller: AccountId,
        payment: u64,
    ) -> Result<EventKey, RegistryError> {
        let (key, record) = self.lookup(name)?;

        if record.holders.contains(&caller) {
            return Err(RegistryError::AlreadyOwner(caller));
        }
        if record.is_sold_out() {
            return Err(RegistryError::AllTicketsSold(record.max_tickets));
        }
        if payment < record.price {
            return Err(RegistryError::TicketPriceNotCovered(record.price));
        }
        if self.balance.checked_add(payment).is_none() {
            return Err(RegistryError::BalanceOverflow);
        }

        Ok(key)
    }

    /// Sell a ticket to `caller`, retaining the full `payment`.
    ///
    /// Overpayment is kept; no change is given.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition; see [`Self::check_purchase`].
    pub fn buy_ticket(
        &mut self,
        name: &str,
        caller: AccountId,
        payment: u64,
    ) -> Result<EventKey, RegistryError> {
        let key = self.check_purchase(name, caller, payment)?;
        let balance = self
            .balance
            .checked_add(payment)
            .ok_or(RegistryError::BalanceOverflow)?;
        let record = self.lookup_mut(name)?;

        record.holders.insert(caller);
        let tickets_left = record.tickets_left();
        self.balance = balance;

        info!(event = %name, buyer = %caller, payment, tickets_left, "ticket sold");
        Ok(key)
    }

    /// Hand the caller's ticket to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EventNotFound`] if no such event exists,
    /// [`RegistryError::NotOwner`] if `caller` holds no ticket, or
    /// [`RegistryError::AlreadyOwner`] if `recipient` already holds one.
    pub fn resell_ticket(
        &mut self,
        name: &str,
        caller: AccountId,
        recipient: AccountId,
    ) -> Result<(), RegistryError> {
        let record = self.lookup_mut(name)?;

        if !record.holders.contains(&caller) {
            return Err(RegistryError::NotOwner(caller));
        }
        if record.holders.contains(&recipient) {
            return Err(RegistryError::AlreadyOwner(recipient));
        }

        record.holders.remove(&caller);
        record.holders.insert(recipient);

        info!(event = %name, from = %caller, to = %recipient, "ticket resold");
        Ok(())
    }
}

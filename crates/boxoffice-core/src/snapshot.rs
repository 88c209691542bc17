//! Registry persistence.
//!
//! The registry is captured as a [`RegistrySnapshot`] and written to disk as
//! pretty-printed JSON. Writes go to a sibling temp file, which is synced
//! to disk before being renamed over the target, so a crash or power loss
//! mid-write leaves the previous snapshot intact.
//!
//! Restoring re-checks every registry invariant; a snapshot that fails any
//! check is rejected as a whole.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use boxoffice_types::{AccountId, EventKey, EventRow, RegistrySnapshot};
use chrono::Utc;
use tracing::info;

use crate::registry::{EventRecord, Registry};

/// Errors from saving, loading, or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read or write the snapshot file.
    #[error("failed to access snapshot file: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file is not valid JSON for a [`RegistrySnapshot`].
    #[error("failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was taken for a different owner.
    #[error("snapshot owner {found} does not match configured owner {expected}")]
    OwnerMismatch {
        /// The configured owner.
        expected: AccountId,
        /// The owner recorded in the snapshot.
        found: AccountId,
    },

    /// A table key is not the key derived from its row's name.
    #[error("event {name:?} is stored under key {key}, expected {derived}")]
    KeyMismatch {
        /// The row's event name.
        name: String,
        /// The key the row was stored under.
        key: EventKey,
        /// The key derived from `name`.
        derived: EventKey,
    },

    /// The creation order names a key with no table row.
    #[error("ordered event {0} has no table entry")]
    MissingEvent(EventKey),

    /// The creation order lists a key more than once.
    #[error("event {0} appears more than once in the creation order")]
    DuplicateOrder(EventKey),

    /// A table row is absent from the creation order.
    #[error("event {0} is missing from the creation order")]
    Unordered(EventKey),

    /// An event has more holders than its capacity.
    #[error("event {name:?} has {holders} holders but only {max_tickets} tickets")]
    OverCapacity {
        /// The event name.
        name: String,
        /// Number of recorded holders.
        holders: usize,
        /// Ticket capacity.
        max_tickets: u64,
    },
}

/// Capture the registry in its persisted layout.
pub fn capture(registry: &Registry) -> RegistrySnapshot {
    let mut order = Vec::with_capacity(registry.event_count());
    let mut events = BTreeMap::new();
    for (key, record) in registry.iter() {
        order.push(key);
        events.insert(
            key,
            EventRow {
                name: record.name.clone(),
                date: record.date,
                price: record.price,
                max_tickets: record.max_tickets,
                holders: record.holders.clone(),
            },
        );
    }

    RegistrySnapshot {
        owner: registry.owner(),
        balance: registry.balance(),
        order,
        events,
        saved_at: Utc::now(),
    }
}

/// Rebuild a registry from a snapshot, checking every invariant.
///
/// # Errors
///
/// Returns [`SnapshotError`] naming the first inconsistency found.
pub fn restore(owner: AccountId, snapshot: RegistrySnapshot) -> Result<Registry, SnapshotError> {
    if snapshot.owner != owner {
        return Err(SnapshotError::OwnerMismatch {
            expected: owner,
            found: snapshot.owner,
        });
    }

    let mut seen = BTreeSet::new();
    for key in &snapshot.order {
        if !snapshot.events.contains_key(key) {
            return Err(SnapshotError::MissingEvent(*key));
        }
        if !seen.insert(*key) {
            return Err(SnapshotError::DuplicateOrder(*key));
        }
    }

    let mut events = BTreeMap::new();
    for (key, row) in snapshot.events {
        if !seen.contains(&key) {
            return Err(SnapshotError::Unordered(key));
        }
        let derived = EventKey::derive(&row.name);
        if derived != key {
            return Err(SnapshotError::KeyMismatch {
                name: row.name,
                key,
                derived,
            });
        }
        let record = EventRecord {
            name: row.name,
            date: row.date,
            price: row.price,
            max_tickets: row.max_tickets,
            holders: row.holders,
        };
        if record.sold() > record.max_tickets {
            return Err(SnapshotError::OverCapacity {
                name: record.name,
                holders: record.holders.len(),
                max_tickets: record.max_tickets,
            });
        }
        events.insert(key, record);
    }

    Ok(Registry::from_parts(
        owner,
        events,
        snapshot.order,
        snapshot.balance,
    ))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a snapshot to `path` atomically.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] or [`SnapshotError::Json`] if the
/// snapshot cannot be written.
pub fn save(path: &Path, snapshot: &RegistrySnapshot) -> Result<(), SnapshotError> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    let tmp = temp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(&json)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(&tmp, path)?;
    info!(
        path = %path.display(),
        events = snapshot.order.len(),
        balance = snapshot.balance,
        "registry snapshot saved"
    );
    Ok(())
}

/// Read a snapshot from `path`, or `None` if the file does not exist.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] for any read failure other than a missing
/// file, or [`SnapshotError::Json`] if the contents do not parse.
pub fn load(path: &Path) -> Result<Option<RegistrySnapshot>, SnapshotError> {
    let contents = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&contents)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NewEvent;

    fn populated() -> (Registry, AccountId, AccountId) {
        let owner = AccountId::new();
        let buyer = AccountId::new();
        let mut registry = Registry::new(owner);
        for (name, max) in [("Concert", 2), ("Opera", 1)] {
            registry
                .create_event(
                    owner,
                    NewEvent {
                        name: name.to_owned(),
                        date: 1000,
                        price: 20,
                        max_tickets: max,
                    },
                )
                .unwrap();
        }
        registry.buy_ticket("Opera", buyer, 25).unwrap();
        (registry, owner, buyer)
    }

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("boxoffice-{label}-{}", AccountId::new()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn capture_then_restore_preserves_registry() {
        let (registry, owner, buyer) = populated();
        let restored = restore(owner, capture(&registry)).unwrap();

        assert_eq!(restored, registry);
        assert_eq!(restored.list_events(), vec!["Concert", "Opera"]);
        assert!(restored.is_ticket_holder("Opera", buyer).unwrap());
        assert_eq!(restored.balance(), 25);
    }

    #[test]
    fn restore_rejects_wrong_owner() {
        let (registry, _, _) = populated();
        let err = restore(AccountId::new(), capture(&registry)).unwrap_err();
        assert!(matches!(err, SnapshotError::OwnerMismatch { .. }));
    }

    #[test]
    fn restore_rejects_renamed_row() {
        let (registry, owner, _) = populated();
        let mut snapshot = capture(&registry);
        let key = EventKey::derive("Concert");
        snapshot.events.get_mut(&key).unwrap().name = "Concert 2".to_owned();

        let err = restore(owner, snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::KeyMismatch { key: k, .. } if k == key));
    }

    #[test]
    fn restore_rejects_inconsistent_order() {
        let (registry, owner, _) = populated();
        let concert = EventKey::derive("Concert");

        let mut duplicated = capture(&registry);
        duplicated.order.push(concert);
        assert!(matches!(
            restore(owner, duplicated).unwrap_err(),
            SnapshotError::DuplicateOrder(k) if k == concert
        ));

        let mut dangling = capture(&registry);
        let ghost = EventKey::derive("Ghost");
        dangling.order.push(ghost);
        assert!(matches!(
            restore(owner, dangling).unwrap_err(),
            SnapshotError::MissingEvent(k) if k == ghost
        ));

        let mut unordered = capture(&registry);
        unordered.order.retain(|k| *k != concert);
        assert!(matches!(
            restore(owner, unordered).unwrap_err(),
            SnapshotError::Unordered(k) if k == concert
        ));
    }

    #[test]
    fn restore_rejects_over_capacity() {
        let (registry, owner, _) = populated();
        let mut snapshot = capture(&registry);
        let opera = snapshot.events.get_mut(&EventKey::derive("Opera")).unwrap();
        opera.holders.insert(AccountId::new());

        let err = restore(owner, snapshot).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::OverCapacity { holders: 2, max_tickets: 1, .. }
        ));
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let (registry, owner, _) = populated();
        let dir = scratch_dir("save");
        let path = dir.join("registry.json");

        let snapshot = capture(&registry);
        save(&path, &snapshot).unwrap();
        assert!(!temp_path(&path).exists());

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(restore(owner, loaded).unwrap(), registry);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let (mut registry, owner, buyer) = populated();
        let dir = scratch_dir("replace");
        let path = dir.join("registry.json");

        save(&path, &capture(&registry)).unwrap();
        registry.buy_ticket("Concert", buyer, 20).unwrap();
        save(&path, &capture(&registry)).unwrap();

        assert!(!temp_path(&path).exists());
        let restored = restore(owner, load(&path).unwrap().unwrap()).unwrap();
        assert!(restored.is_ticket_holder("Concert", buyer).unwrap());
        assert_eq!(restored.balance(), 45);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = scratch_dir("missing");
        assert!(load(&dir.join("absent.json")).unwrap().is_none());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_garbage_is_json_error() {
        let dir = scratch_dir("garbage");
        let path = dir.join("registry.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(load(&path), Err(SnapshotError::Json(_))));
        std::fs::remove_dir_all(dir).unwrap();
    }
}

//! Type-safe identifiers.
//!
//! Accounts and ledger entries carry UUID v7 newtypes so they can never be
//! mixed up at compile time. Events are addressed by an [`EventKey`]
//! derived from the event name instead of an allocated ID: the same name
//! always yields the same key, which is what makes duplicate detection a
//! plain map lookup.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identity of a caller: the registry owner, a ticket buyer, or a
    /// resale recipient.
    AccountId
}

define_id! {
    /// Unique identifier for a payment ledger entry.
    LedgerEntryId
}

/// Length of an [`EventKey`] in bytes.
pub const EVENT_KEY_LEN: usize = 32;

/// Content-derived identifier of an event.
///
/// ```text
/// key = blake3(utf8(name))
/// ```
///
/// Rendered and serialized as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey([u8; EVENT_KEY_LEN]);

impl EventKey {
    /// Derive the key for an event name.
    pub fn derive(name: &str) -> Self {
        Self(*blake3::hash(name.as_bytes()).as_bytes())
    }

    /// Return the raw key bytes.
    pub const fn as_bytes(&self) -> &[u8; EVENT_KEY_LEN] {
        &self.0
    }

    /// Parse a key from its 64-character hex form.
    ///
    /// # Errors
    ///
    /// Returns [`blake3::HexError`] if the input is not exactly 64 hex
    /// characters.
    pub fn from_hex(hex: &str) -> Result<Self, blake3::HexError> {
        blake3::Hash::from_hex(hex).map(|h| Self(*h.as_bytes()))
    }

    /// Return the 64-character lowercase hex form.
    pub fn to_hex(self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl core::fmt::Display for EventKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for EventKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EventKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

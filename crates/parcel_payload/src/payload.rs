use alloc::collections::BTreeMap;
use alloc::string::String;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Context, LaunchFlags, PayloadError};

// -----------------------------------------------------------------------------
// Extra

/// One typed value stored in a [`Payload`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Extra {
    Int(i32),
    Long(i64),
    String(String),
    /// A serialized object as RON text, decoded on read into the caller's
    /// type. RON keeps non-finite floats and non-string map keys.
    Serializable(String),
}

impl Extra {
    /// A short name of the stored kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Extra::Int(_) => "Int",
            Extra::Long(_) => "Long",
            Extra::String(_) => "String",
            Extra::Serializable(_) => "Serializable",
        }
    }
}

// -----------------------------------------------------------------------------
// Payload

/// A keyed container moving typed values from one host to another.
///
/// Reads are forgiving: a missing key or a value of another kind yields the
/// caller's default (or `None`) and a mismatch is logged as a warning.
///
/// # Examples
///
/// ```
/// use parcel_payload::{Context, Payload};
///
/// let mut payload = Payload::new(&Context::new("main"), "screens::Ticket");
/// payload.put_long("id", 42).put_string("label", "gold");
///
/// assert_eq!(payload.get_long("id", -1), 42);
/// assert_eq!(payload.get_string("label").as_deref(), Some("gold"));
/// assert_eq!(payload.get_int("id", -1), -1); // stored as Long
/// assert_eq!(payload.get_string("missing"), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    origin: String,
    target: String,
    flags: LaunchFlags,
    extras: BTreeMap<String, Extra>,
}

impl Payload {
    /// Create an empty payload sent from `context`, addressed at `target`.
    pub fn new(context: &Context, target: impl Into<String>) -> Self {
        Self {
            origin: String::from(context.origin()),
            target: target.into(),
            flags: LaunchFlags::empty(),
            extras: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    // -------------------------------------------------------------------------
    // Flags

    /// Accumulate `flag` into the launch flags.
    #[inline]
    pub fn add_flag(&mut self, flag: LaunchFlags) -> &mut Self {
        self.flags.insert(flag);
        self
    }

    #[inline]
    pub fn flags(&self) -> LaunchFlags {
        self.flags
    }

    // -------------------------------------------------------------------------
    // Writes

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.extras.insert(key.into(), Extra::Int(value));
        self
    }

    pub fn put_long(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.extras.insert(key.into(), Extra::Long(value));
        self
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.extras.insert(key.into(), Extra::String(value.into()));
        self
    }

    /// Store `value` as a serialized object.
    ///
    /// Fails if the `Serialize` implementation of `value` reports an error.
    pub fn put_serializable<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, PayloadError> {
        let key = key.into();
        match ron::to_string(value) {
            Ok(encoded) => {
                self.extras.insert(key, Extra::Serializable(encoded));
                Ok(self)
            }
            Err(source) => Err(PayloadError::Encode { key, source }),
        }
    }

    // -------------------------------------------------------------------------
    // Reads

    /// The stored `Int` for `key`, or `default`.
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.extras.get(key) {
            Some(Extra::Int(value)) => *value,
            Some(other) => {
                mismatch(key, "Int", other);
                default
            }
            None => default,
        }
    }

    /// The stored `Long` for `key`, or `default`.
    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.extras.get(key) {
            Some(Extra::Long(value)) => *value,
            Some(other) => {
                mismatch(key, "Long", other);
                default
            }
            None => default,
        }
    }

    /// The stored `String` for `key`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_str(key).map(String::from)
    }

    /// Borrowing variant of [`Payload::get_string`].
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.extras.get(key) {
            Some(Extra::String(value)) => Some(value),
            Some(other) => {
                mismatch(key, "String", other);
                None
            }
            None => None,
        }
    }

    /// Decode the serialized object stored for `key` as `T`.
    ///
    /// Returns `None` if the key is absent, holds another kind, or does not
    /// decode as `T`.
    pub fn get_serializable<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.extras.get(key) {
            Some(Extra::Serializable(text)) => match ron::from_str::<T>(text) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    log::warn!(
                        "Extra `{key}` could not be decoded as `{}`: {err}",
                        core::any::type_name::<T>()
                    );
                    None
                }
            },
            Some(other) => {
                mismatch(key, "Serializable", other);
                None
            }
            None => None,
        }
    }

    // -------------------------------------------------------------------------
    // Inspection

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Extra> {
        self.extras.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<Extra> {
        self.extras.remove(key)
    }

    /// Stored keys in ascending order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.extras.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.extras.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.extras.is_empty()
    }
}

fn mismatch(key: &str, expected: &str, found: &Extra) {
    log::warn!(
        "Extra `{key}` expected {expected} but value was {}, the default value was returned.",
        found.kind()
    );
}

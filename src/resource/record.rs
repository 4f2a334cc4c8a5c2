//! # Record Traits
//!
//! What a resource type must provide to be served by the generic handler.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::ResourceResult;
use super::fields::FieldSet;

/// Primary key of a record
pub trait RecordKey:
    Clone + Ord + Debug + Display + FromStr + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Whether this value marks a record the store has not keyed yet
    fn is_unassigned(&self) -> bool;

    /// Key for the n-th surrogate allocation (`None` for natural keys)
    fn from_sequence(n: u64) -> Option<Self>;

    /// Sequence position of a stored key, used to resume allocation
    fn sequence_position(&self) -> Option<u64>;
}

/// Surrogate numeric key, assigned by the store starting at 1
impl RecordKey for i64 {
    fn is_unassigned(&self) -> bool {
        *self <= 0
    }

    fn from_sequence(n: u64) -> Option<Self> {
        i64::try_from(n).ok().filter(|k| *k > 0)
    }

    fn sequence_position(&self) -> Option<u64> {
        u64::try_from(*self).ok()
    }
}

/// Natural key supplied by the caller
impl RecordKey for String {
    fn is_unassigned(&self) -> bool {
        self.is_empty()
    }

    fn from_sequence(_n: u64) -> Option<Self> {
        None
    }

    fn sequence_position(&self) -> Option<u64> {
        None
    }
}

/// A persisted resource type
pub trait Record:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Key: RecordKey;

    /// Name used in messages, e.g. `HelpRequest`
    const TYPE_NAME: &'static str;

    /// Path segment under `/api` and snapshot file stem
    const COLLECTION: &'static str;

    /// Query parameter carrying the key
    const KEY_PARAM: &'static str;

    fn key(&self) -> &Self::Key;

    fn set_key(&mut self, key: Self::Key);

    /// Build a new record from individually named inputs
    ///
    /// Surrogate-keyed records come back unassigned; the store keys them.
    fn from_fields(fields: &FieldSet) -> ResourceResult<Self>;
}

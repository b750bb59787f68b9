// src/ssn/value.rs

//! The parsed representation of a `synchronous_standby_names` value.

use crate::ci::CiSet;

/// The synchronous replication mode encoded in a parsed SSN value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncType {
    Off,
    Priority,
    Quorum,
}

/// A fully parsed `synchronous_standby_names` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsnValue {
    pub sync_type: SyncType,
    pub has_star: bool,
    pub num: u32,
    pub members: CiSet,
}

impl SsnValue {
    /// The canonical empty value: `(off, false, 0, ∅)`.
    ///
    /// Constructed fresh on each call rather than cloned from a shared
    /// sentinel, so callers never alias another owner's member set.
    pub fn empty() -> Self {
        Self {
            sync_type: SyncType::Off,
            has_star: false,
            num: 0,
            members: CiSet::new(),
        }
    }
}

impl Default for SsnValue {
    fn default() -> Self {
        Self::empty()
    }
}

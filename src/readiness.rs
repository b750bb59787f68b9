// src/readiness.rs

//! Tracks which members have provably caught up to `primary_flush_lsn`
//! since the synchronous set was last (re)configured.

use crate::ci::CiMap;
use crate::collaborators::{ClusterSnapshot, Lsn};
use crate::replica::Replica;
use crate::ssn::SsnValue;

/// Maps a ready member name to the walsender `pid` that was connected when
/// it crossed the catch-up gate. A later `pid` change (reconnect) does not
/// by itself revoke readiness.
#[derive(Debug, Clone, Default)]
pub struct ReadinessTracker {
    ready: CiMap<i32>,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every tracked name absent from `members`, preserving invariant
    /// I1. Called whenever the SSN value changes.
    pub fn prune(&mut self, members: &crate::ci::CiSet) {
        self.ready.retain(|name, _| members.contains(name));
    }

    /// Evaluates the catch-up gate for every replica in `view` against the
    /// current `parsed_ssn.members` and `primary_flush_lsn`, recording newly
    /// ready members.
    ///
    /// A member passes the gate the first time either holds: the DCS
    /// `/sync` key already lists it (a previously-persisted pass), or it
    /// currently reports `sync_state = sync` with `lsn >= primary_flush_lsn`.
    pub fn update(
        &mut self,
        cluster: &impl ClusterSnapshot,
        replicas: &[Replica],
        parsed_ssn: &SsnValue,
        primary_flush_lsn: Lsn,
    ) {
        for replica in replicas {
            if self.ready.contains_key(&replica.application_name) {
                continue;
            }
            if !parsed_ssn.members.contains(&replica.application_name) {
                continue;
            }
            let dcs_confirmed = cluster.sync_matches(&replica.application_name);
            let caught_up = replica.sync_state == "sync" && replica.lsn >= primary_flush_lsn;
            if dcs_confirmed || caught_up {
                self.ready.insert(replica.application_name.clone(), replica.pid);
            }
        }
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.ready.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}

// src/replica.rs

//! Joins live replication stats with DCS membership and ranks the result.

use crate::collaborators::{
    ClusterSnapshot, Lsn, Member, ReplicationRow, SynchronousCommit, index_members_by_name,
};

/// A replica eligible to be considered synchronous: the join of a
/// `pg_stat_replication` row with its corresponding DCS `Member`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replica {
    pub pid: i32,
    pub application_name: String,
    pub sync_state: String,
    pub lsn: Lsn,
    pub nofailover: bool,
}

/// The ranked view of eligible replicas plus the `max_lsn` reference point
/// used for lag filtering.
#[derive(Debug, Clone, Default)]
pub struct ReplicaView {
    pub replicas: Vec<Replica>,
    pub max_lsn: Lsn,
}

/// Picks the `pg_stat_replication` LSN column to use, based on the
/// effective `synchronous_commit` setting.
fn select_lsn(row: &ReplicationRow, commit: SynchronousCommit) -> Option<Lsn> {
    match commit {
        SynchronousCommit::RemoteApply => row.replay_lsn,
        SynchronousCommit::RemoteWrite => row.write_lsn,
        SynchronousCommit::On | SynchronousCommit::Local | SynchronousCommit::Off => row.flush_lsn,
    }
}

/// Orders `sync_state` the way the four known labels are meant to compare:
/// `sync > quorum > potential > async`. Matched on the literal lowercase
/// labels rather than relying on whatever order a given string type's
/// native comparison happens to produce, since that ordering is incidental
/// in the source data, not intentional.
fn sync_state_rank(sync_state: &str) -> u8 {
    match sync_state {
        "sync" => 3,
        "quorum" => 2,
        "potential" => 1,
        _ => 0, // "async" and anything unrecognized sort last.
    }
}

/// Builds the replica view for the current tick: filters `stats` down to
/// rows that map to a running, non-`nosync` DCS member with a non-null
/// selected LSN, then ranks them by `(sync_state, lsn)` descending.
pub fn build_replica_view(
    cluster: &impl ClusterSnapshot,
    stats: &[ReplicationRow],
    synchronous_commit: SynchronousCommit,
    primary_last_operation: Lsn,
) -> ReplicaView {
    let members_by_name = index_members_by_name(cluster.members());

    let mut replicas: Vec<Replica> = stats
        .iter()
        .filter_map(|row| {
            let lsn = select_lsn(row, synchronous_commit)?;
            let member: &Member = members_by_name.get(&row.application_name.to_lowercase())?;
            if !member.is_running || member.nosync {
                return None;
            }
            Some(Replica {
                pid: row.pid,
                application_name: row.application_name.clone(),
                sync_state: row.sync_state.clone(),
                lsn,
                nofailover: member.nofailover,
            })
        })
        .collect();

    replicas.sort_by_key(|r| std::cmp::Reverse((sync_state_rank(&r.sync_state), r.lsn)));

    let max_lsn = if replicas.len() >= 2 {
        replicas.iter().map(|r| r.lsn).max().unwrap_or(0)
    } else {
        primary_last_operation
    };

    ReplicaView { replicas, max_lsn }
}

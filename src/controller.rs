// src/controller.rs

//! The top-level sync controller state machine and emitter.

use tracing::{debug, info, warn};

use crate::ci::CiSet;
use crate::collaborators::{ClusterSnapshot, DatabaseClient, Lsn};
use crate::error::SyncCtlError;
use crate::readiness::ReadinessTracker;
use crate::replica::{ReplicaView, build_replica_view};
use crate::ssn::{self, SsnValue};

/// Local nudge query executed under `synchronous_commit = off` so that idle
/// primaries still produce WAL for pending replicas to catch up against.
/// Not a workaround: without it, catch-up can stall indefinitely on an
/// otherwise-idle cluster.
const IDLE_WAL_NUDGE_SQL: &str = r#"DO $$
BEGIN
    SET local synchronous_commit = 'off';
    PERFORM * FROM pg_catalog.txid_current();
END;$$"#;

/// Process-wide state of the sync controller.
/// One instance per primary; the caller (the orchestration loop) guarantees
/// it is never invoked re-entrantly.
pub struct SyncController {
    last_ssn_string: String,
    parsed_ssn: SsnValue,
    primary_flush_lsn: Lsn,
    ready: ReadinessTracker,
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncController {
    pub fn new() -> Self {
        Self {
            last_ssn_string: String::new(),
            parsed_ssn: SsnValue::empty(),
            primary_flush_lsn: 0,
            ready: ReadinessTracker::new(),
        }
    }

    /// Re-initializes all controller state, as if freshly constructed.
    /// Discards readiness entirely regardless of the SSN membership.
    pub fn reinitialize(&mut self) {
        *self = Self::new();
    }

    /// Detects and handles a change in `synchronous_standby_names`.
    ///
    /// Parse failures are logged and treated as the empty SSN: the database
    /// may independently reject the value, and this controller is
    /// deliberately permissive about what it tolerates locally.
    async fn handle_ssn_change<D: DatabaseClient>(&mut self, db: &D) -> Result<(), SyncCtlError<D::Error>> {
        let current = db
            .synchronous_standby_names()
            .await
            .map_err(SyncCtlError::Database)?;
        if current == self.last_ssn_string {
            return Ok(());
        }

        self.last_ssn_string = current.clone();
        self.parsed_ssn = match ssn::parse(&current) {
            Ok(value) => value,
            Err(e) => {
                warn!(ssn = %current, error = %e, "failed to parse synchronous_standby_names, treating as empty");
                SsnValue::empty()
            }
        };
        info!(ssn = %current, sync_type = ?self.parsed_ssn.sync_type, "synchronous_standby_names changed");

        self.ready.prune(&self.parsed_ssn.members);

        self.primary_flush_lsn = db.last_operation().await.map_err(SyncCtlError::Database)?;
        db.query(IDLE_WAL_NUDGE_SQL).await.map_err(SyncCtlError::Database)?;
        db.reset_cluster_info_state();

        Ok(())
    }

    /// Finds the best candidates for synchronous standbys and the subset of
    /// those already proven synchronous.
    pub async fn current_state<D: DatabaseClient>(
        &mut self,
        cluster: &impl ClusterSnapshot,
        db: &D,
    ) -> Result<(CiSet, CiSet), SyncCtlError<D::Error>> {
        self.handle_ssn_change(db).await?;

        let commit = db.synchronous_commit().await.map_err(SyncCtlError::Database)?;
        let stats = db.pg_stat_replication().await.map_err(SyncCtlError::Database)?;
        let primary_last_op = db.last_operation().await.map_err(SyncCtlError::Database)?;
        let view: ReplicaView = build_replica_view(cluster, &stats, commit, primary_last_op);

        self.ready
            .update(cluster, &view.replicas, &self.parsed_ssn, self.primary_flush_lsn);

        let global_config = db.global_config();
        let sync_node_count = if db.supports_multiple_sync() {
            global_config.synchronous_node_count
        } else {
            1
        };
        let max_lag = global_config.maximum_lag_on_syncnode;

        let mut ranked = view.replicas.clone();
        // Stable sort: preserves the (sync_state, lsn) descending order
        // computed above as the secondary key while preferring
        // failover-eligible members. Must not be swapped for an unstable sort.
        ranked.sort_by_key(|r| r.nofailover);

        let mut candidates = CiSet::new();
        let mut sync_nodes = CiSet::new();

        for replica in &ranked {
            if max_lag > 0 && (view.max_lsn as i64 - replica.lsn as i64) > max_lag {
                continue;
            }
            candidates.insert(replica.application_name.clone());
            if replica.sync_state == "sync" && self.ready.is_ready(&replica.application_name) {
                sync_nodes.insert(replica.application_name.clone());
            }
            if candidates.len() as u32 >= sync_node_count {
                break;
            }
        }

        debug!(
            candidates = candidates.len(),
            sync_nodes = sync_nodes.len(),
            "computed synchronous standby candidates"
        );

        Ok((candidates, sync_nodes))
    }

    /// Formats and applies a new `synchronous_standby_names` value.
    pub async fn set_synchronous_standby_names<D: DatabaseClient>(
        &mut self,
        db: &D,
        sync_set: &CiSet,
    ) -> Result<(), SyncCtlError<D::Error>> {
        let has_star = sync_set.contains("*");

        let value = if has_star {
            Some("*".to_string())
        } else {
            let mut names: Vec<&str> = sync_set.iter().collect();
            names.sort_unstable();
            let quoted: Vec<String> = names.iter().map(|n| ssn::quote_ident(n)).collect();
            let formatted = ssn::format_ssn(&quoted, names.len() as u32, db.supports_multiple_sync());
            if formatted.is_empty() {
                None
            } else {
                Some(formatted)
            }
        };

        let changed = db
            .set_synchronous_standby_names(value.as_deref())
            .await
            .map_err(SyncCtlError::Database)?;

        if !changed || !db.is_running() || !db.is_leader().await.map_err(SyncCtlError::Database)? || has_star {
            return Ok(());
        }

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        db.reset_cluster_info_state();

        if db.get_primary_timeline().await.map_err(SyncCtlError::Database)? > 0 {
            self.handle_ssn_change(db).await?;
        }

        Ok(())
    }
}

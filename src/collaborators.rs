// src/collaborators.rs

//! External interfaces this crate consumes, plus in-memory reference
//! implementations used by tests and the demo binary.
//!
//! The real database-client and DCS-client collaborators — a `tokio-postgres`
//! backed connection, an etcd/Consul/ZooKeeper backed cluster view — live
//! outside this crate's scope; only their trait contracts are owned here.

use std::collections::HashMap;
use std::future::Future;

use crate::ci::CiMap;

/// An opaque, monotonically non-decreasing log position. Zero means
/// "unknown/none".
pub type Lsn = u64;

/// The synchronous_commit setting that determines which LSN column is
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynchronousCommit {
    On,
    Off,
    Local,
    RemoteWrite,
    RemoteApply,
}

impl SynchronousCommit {
    pub fn parse(value: &str) -> Self {
        match value {
            "remote_apply" => SynchronousCommit::RemoteApply,
            "remote_write" => SynchronousCommit::RemoteWrite,
            "off" => SynchronousCommit::Off,
            "local" => SynchronousCommit::Local,
            _ => SynchronousCommit::On,
        }
    }
}

/// A single row of `pg_stat_replication`.
#[derive(Debug, Clone)]
pub struct ReplicationRow {
    pub pid: i32,
    pub application_name: String,
    pub sync_state: String,
    pub write_lsn: Option<Lsn>,
    pub flush_lsn: Option<Lsn>,
    pub replay_lsn: Option<Lsn>,
}

/// A member of the cluster as seen in the DCS.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub is_running: bool,
    pub nosync: bool,
    pub nofailover: bool,
}

/// Global configuration values that come from the cluster's effective
/// configuration rather than from the DCS topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalSyncConfig {
    pub synchronous_node_count: u32,
    pub maximum_lag_on_syncnode: i64,
}

impl Default for GlobalSyncConfig {
    fn default() -> Self {
        Self {
            synchronous_node_count: 1,
            maximum_lag_on_syncnode: 0,
        }
    }
}

/// The database client collaborator, consumed by the controller.
///
/// Implementations talk to a single local PostgreSQL instance. All methods
/// are `async` so a real implementation can run SQL queries over the wire
/// without blocking the orchestrator's executor; the controller itself
/// never holds one of these across an await point for longer than a single
/// call.
pub trait DatabaseClient {
    type Error: std::error::Error + 'static;

    fn synchronous_commit(&self) -> impl Future<Output = Result<SynchronousCommit, Self::Error>>;
    fn synchronous_standby_names(&self) -> impl Future<Output = Result<String, Self::Error>>;
    fn pg_stat_replication(&self) -> impl Future<Output = Result<Vec<ReplicationRow>, Self::Error>>;
    fn last_operation(&self) -> impl Future<Output = Result<Lsn, Self::Error>>;
    fn get_primary_timeline(&self) -> impl Future<Output = Result<u64, Self::Error>>;
    fn query(&self, sql: &str) -> impl Future<Output = Result<(), Self::Error>>;
    fn reset_cluster_info_state(&self);
    fn supports_multiple_sync(&self) -> bool;
    fn is_running(&self) -> bool;
    fn is_leader(&self) -> impl Future<Output = Result<bool, Self::Error>>;
    fn set_synchronous_standby_names(
        &self,
        value: Option<&str>,
    ) -> impl Future<Output = Result<bool, Self::Error>>;
    fn global_config(&self) -> GlobalSyncConfig;
}

/// The DCS cluster snapshot collaborator, consumed by the controller.
pub trait ClusterSnapshot {
    fn members(&self) -> &[Member];
    fn sync_matches(&self, name: &str) -> bool;
}

/// An in-memory [`ClusterSnapshot`] used by tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct FakeCluster {
    pub members: Vec<Member>,
    pub sync_members: CiMap<()>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_sync_confirmed(mut self, name: &str) -> Self {
        self.sync_members.insert(name, ());
        self
    }
}

impl ClusterSnapshot for FakeCluster {
    fn members(&self) -> &[Member] {
        &self.members
    }

    fn sync_matches(&self, name: &str) -> bool {
        self.sync_members.contains_key(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("fake database client error: {0}")]
pub struct FakeDbError(pub String);

/// An in-memory [`DatabaseClient`] used by tests and the demo binary. All
/// state lives behind `std::cell::RefCell` because the controller only ever
/// drives it from a single task, never re-entrantly.
pub struct FakeDatabaseClient {
    pub synchronous_commit: std::cell::RefCell<SynchronousCommit>,
    pub ssn: std::cell::RefCell<String>,
    pub stats: std::cell::RefCell<Vec<ReplicationRow>>,
    pub last_operation: std::cell::RefCell<Lsn>,
    pub primary_timeline: std::cell::RefCell<u64>,
    pub supports_multiple_sync: bool,
    pub running: bool,
    pub leader: bool,
    pub config: std::cell::RefCell<GlobalSyncConfig>,
    pub queries_run: std::cell::RefCell<Vec<String>>,
    pub reset_count: std::cell::RefCell<u32>,
}

impl Default for FakeDatabaseClient {
    fn default() -> Self {
        Self {
            synchronous_commit: std::cell::RefCell::new(SynchronousCommit::On),
            ssn: std::cell::RefCell::new(String::new()),
            stats: std::cell::RefCell::new(Vec::new()),
            last_operation: std::cell::RefCell::new(0),
            primary_timeline: std::cell::RefCell::new(1),
            supports_multiple_sync: true,
            running: true,
            leader: true,
            config: std::cell::RefCell::new(GlobalSyncConfig::default()),
            queries_run: std::cell::RefCell::new(Vec::new()),
            reset_count: std::cell::RefCell::new(0),
        }
    }
}

impl FakeDatabaseClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ssn_string(&self, value: impl Into<String>) {
        *self.ssn.borrow_mut() = value.into();
    }

    pub fn set_stats(&self, rows: Vec<ReplicationRow>) {
        *self.stats.borrow_mut() = rows;
    }

    pub fn set_last_operation(&self, lsn: Lsn) {
        *self.last_operation.borrow_mut() = lsn;
    }
}

impl DatabaseClient for FakeDatabaseClient {
    type Error = FakeDbError;

    async fn synchronous_commit(&self) -> Result<SynchronousCommit, Self::Error> {
        Ok(*self.synchronous_commit.borrow())
    }

    async fn synchronous_standby_names(&self) -> Result<String, Self::Error> {
        Ok(self.ssn.borrow().clone())
    }

    async fn pg_stat_replication(&self) -> Result<Vec<ReplicationRow>, Self::Error> {
        Ok(self.stats.borrow().clone())
    }

    async fn last_operation(&self) -> Result<Lsn, Self::Error> {
        Ok(*self.last_operation.borrow())
    }

    async fn get_primary_timeline(&self) -> Result<u64, Self::Error> {
        Ok(*self.primary_timeline.borrow())
    }

    async fn query(&self, sql: &str) -> Result<(), Self::Error> {
        self.queries_run.borrow_mut().push(sql.to_string());
        Ok(())
    }

    fn reset_cluster_info_state(&self) {
        *self.reset_count.borrow_mut() += 1;
    }

    fn supports_multiple_sync(&self) -> bool {
        self.supports_multiple_sync
    }

    fn is_running(&self) -> bool {
        self.running
    }

    async fn is_leader(&self) -> Result<bool, Self::Error> {
        Ok(self.leader)
    }

    async fn set_synchronous_standby_names(&self, value: Option<&str>) -> Result<bool, Self::Error> {
        let new_value = value.unwrap_or("").to_string();
        let changed = *self.ssn.borrow() != new_value;
        *self.ssn.borrow_mut() = new_value;
        Ok(changed)
    }

    fn global_config(&self) -> GlobalSyncConfig {
        *self.config.borrow()
    }
}

/// Builds a [`HashMap`] keyed by lowercase member name for quick membership
/// lookup; a thin convenience over [`ClusterSnapshot::members`].
pub(crate) fn index_members_by_name(members: &[Member]) -> HashMap<String, &Member> {
    members
        .iter()
        .map(|m| (m.name.to_lowercase(), m))
        .collect()
}

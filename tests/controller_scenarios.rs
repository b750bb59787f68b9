//! End-to-end scenarios for the sync controller state machine, mirroring
//! the walkthroughs in the component design: bootstrap with no SSN
//! configured, an SSN change gating readiness, a lag-triggered swap, a
//! quorum configuration bypassing the gate via DCS confirmation, and the
//! nofailover preference.
//!
//! Every scenario here uses `synchronous_commit = on`, so `flush_lsn` is the
//! selected column throughout.

use syncstandby::collaborators::{FakeCluster, FakeDatabaseClient, Member, ReplicationRow};
use syncstandby::SyncController;

fn member(name: &str) -> Member {
    Member {
        name: name.to_string(),
        is_running: true,
        nosync: false,
        nofailover: false,
    }
}

fn row(name: &str, sync_state: &str, flush_lsn: u64) -> ReplicationRow {
    ReplicationRow {
        pid: 1,
        application_name: name.to_string(),
        sync_state: sync_state.to_string(),
        write_lsn: Some(flush_lsn),
        flush_lsn: Some(flush_lsn),
        replay_lsn: Some(flush_lsn),
    }
}

#[tokio::test]
async fn bootstrap_with_no_ssn_configured_yields_no_candidates() {
    let cluster = FakeCluster::new().with_member(member("a")).with_member(member("b"));
    let db = FakeDatabaseClient::new();
    db.set_stats(vec![row("a", "async", 100), row("b", "async", 100)]);

    let mut controller = SyncController::new();
    let (candidates, sync_nodes) = controller.current_state(&cluster, &db).await.unwrap();

    assert!(candidates.is_empty());
    assert!(sync_nodes.is_empty());
}

#[tokio::test]
async fn ssn_change_gates_readiness_on_catch_up() {
    let cluster = FakeCluster::new().with_member(member("a")).with_member(member("b"));
    let db = FakeDatabaseClient::new();
    db.set_stats(vec![row("a", "async", 100), row("b", "async", 100)]);

    let mut controller = SyncController::new();
    controller.current_state(&cluster, &db).await.unwrap();

    db.set_ssn_string("a,b");
    db.set_last_operation(150);
    db.set_stats(vec![row("a", "sync", 200), row("b", "potential", 180)]);

    let (candidates, sync_nodes) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert!(candidates.contains("a"));
    assert_eq!(sync_nodes.len(), 1);
    assert!(sync_nodes.contains("a"));
}

#[tokio::test]
async fn lag_swap_excludes_the_far_behind_replica() {
    let cluster = FakeCluster::new().with_member(member("a")).with_member(member("b"));
    let db = FakeDatabaseClient::new();
    db.config.borrow_mut().synchronous_node_count = 1;
    db.config.borrow_mut().maximum_lag_on_syncnode = 1_000_000;
    db.set_ssn_string("a,b");
    db.set_last_operation(0);

    db.set_stats(vec![row("a", "async", 0), row("b", "async", 0)]);
    let mut controller = SyncController::new();
    controller.current_state(&cluster, &db).await.unwrap();

    db.set_stats(vec![row("a", "sync", 1_000_000), row("b", "potential", 2_500_000)]);
    let (candidates, sync_nodes) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert!(candidates.contains("b"));
    assert!(sync_nodes.is_empty());
}

#[tokio::test]
async fn quorum_configuration_with_dcs_confirmed_members_bypasses_the_gate() {
    let cluster = FakeCluster::new()
        .with_member(member("a"))
        .with_member(member("b"))
        .with_member(member("c"))
        .with_sync_confirmed("a")
        .with_sync_confirmed("b")
        .with_sync_confirmed("c");
    let db = FakeDatabaseClient::new();
    db.config.borrow_mut().synchronous_node_count = 2;
    db.set_ssn_string("ANY 2 (a,b,c)");
    db.set_last_operation(0);
    db.set_stats(vec![
        row("a", "quorum", 100),
        row("b", "quorum", 100),
        row("c", "quorum", 100),
    ]);

    let mut controller = SyncController::new();
    let (candidates, sync_nodes) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 2);
    // None are reported as `sync` in stats, so none is counted synchronous
    // yet even though the DCS confirms all three as caught up.
    assert!(sync_nodes.is_empty());
}

#[tokio::test]
async fn nofailover_tagged_replica_is_ranked_after_its_failover_eligible_tie() {
    let mut a = member("a");
    a.nofailover = true;
    let b = member("b");
    let cluster = FakeCluster::new().with_member(a).with_member(b);

    let db = FakeDatabaseClient::new();
    db.config.borrow_mut().synchronous_node_count = 1;
    db.set_ssn_string("a,b");
    db.set_last_operation(0);
    // Tied sync_state and lsn: without the nofailover preference, stable
    // sort would keep replication-stats order; nofailover must still push
    // `a` behind `b`.
    db.set_stats(vec![row("a", "potential", 100), row("b", "potential", 100)]);

    let mut controller = SyncController::new();
    let (candidates, _) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert!(candidates.contains("b"));
}

#[tokio::test]
async fn star_emits_exactly_star_and_skips_rebasing_primary_flush_lsn() {
    let cluster = FakeCluster::new().with_member(member("a"));
    let db = FakeDatabaseClient::new();
    db.set_ssn_string("a");
    db.set_last_operation(0);

    let mut controller = SyncController::new();
    // Establish baseline controller state against the initial SSN.
    controller.current_state(&cluster, &db).await.unwrap();

    let reset_count_before = *db.reset_count.borrow();

    let mut sync_set = syncstandby::CiSet::new();
    sync_set.insert("x");
    sync_set.insert("*");
    controller.set_synchronous_standby_names(&db, &sync_set).await.unwrap();

    assert_eq!(db.synchronous_standby_names().await.unwrap(), "*");
    // No post-write SSN re-read happened: reset_cluster_info_state was not
    // called again beyond whatever set_synchronous_standby_names itself may
    // have triggered before bailing out on has_star.
    assert_eq!(*db.reset_count.borrow(), reset_count_before);
}

#[tokio::test]
async fn exceeding_synchronous_node_count_returns_fewer_candidates_not_an_error() {
    let cluster = FakeCluster::new().with_member(member("a"));
    let db = FakeDatabaseClient::new();
    db.config.borrow_mut().synchronous_node_count = 5;
    db.set_ssn_string("a");
    db.set_last_operation(0);
    db.set_stats(vec![row("a", "async", 100)]);

    let mut controller = SyncController::new();
    let (candidates, _) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn multi_sync_unsupported_clamps_candidate_count_to_one() {
    let cluster = FakeCluster::new().with_member(member("a")).with_member(member("b"));
    let mut db = FakeDatabaseClient::new();
    db.supports_multiple_sync = false;
    db.config.borrow_mut().synchronous_node_count = 2;
    db.set_ssn_string("a,b");
    db.set_last_operation(0);
    db.set_stats(vec![row("a", "async", 100), row("b", "async", 100)]);

    let mut controller = SyncController::new();
    let (candidates, _) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn nosync_tagged_member_never_appears_as_candidate_or_sync_node() {
    let mut a = member("a");
    a.nosync = true;
    let cluster = FakeCluster::new().with_member(a);
    let db = FakeDatabaseClient::new();
    db.set_ssn_string("a");
    db.set_last_operation(0);
    db.set_stats(vec![row("a", "sync", 100)]);

    let mut controller = SyncController::new();
    let (candidates, sync_nodes) = controller.current_state(&cluster, &db).await.unwrap();

    assert!(candidates.is_empty());
    assert!(sync_nodes.is_empty());
}

#[tokio::test]
async fn zero_or_negative_max_lag_disables_the_lag_filter() {
    let cluster = FakeCluster::new().with_member(member("a")).with_member(member("b"));
    let db = FakeDatabaseClient::new();
    db.config.borrow_mut().synchronous_node_count = 2;
    db.config.borrow_mut().maximum_lag_on_syncnode = 0;
    db.set_ssn_string("a,b");
    db.set_last_operation(0);
    db.set_stats(vec![row("a", "sync", 100), row("b", "potential", 100_000_000)]);

    let mut controller = SyncController::new();
    let (candidates, _) = controller.current_state(&cluster, &db).await.unwrap();

    assert_eq!(candidates.len(), 2);
}

// src/bin/demo.rs

//! A small demonstration orchestration loop.
//!
//! Drives [`SyncController`] against the crate's in-memory reference
//! collaborators on a fixed tick, scripting a bit of replica churn so the
//! controller's candidate/sync-node decisions can be observed end to end
//! without a live PostgreSQL instance or DCS. Not a production orchestrator:
//! the real database-client and DCS-client backends are out of this crate's
//! scope.

use std::env;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, prelude::*};

use syncstandby::collaborators::{FakeCluster, FakeDatabaseClient, Member, ReplicationRow};
use syncstandby::config::DemoConfig;
use syncstandby::SyncController;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config = match config_path {
        Some(path) => DemoConfig::from_file(path)?,
        None => DemoConfig::default(),
    };

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer().compact().with_ansi(true))
        .init();

    info!(tick_interval_ms = config.tick_interval_ms, "starting sync controller demo loop");

    let cluster = FakeCluster::new()
        .with_member(Member {
            name: "a".to_string(),
            is_running: true,
            nosync: false,
            nofailover: false,
        })
        .with_member(Member {
            name: "b".to_string(),
            is_running: true,
            nosync: false,
            nofailover: false,
        });

    let db = FakeDatabaseClient::new();
    *db.config.borrow_mut() = (&config.sync).into();
    db.set_last_operation(100);

    let mut controller = SyncController::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));

    for tick in 0..5u32 {
        tick_interval.tick().await;

        // Script a bit of churn so each tick shows a different decision:
        // tick 0 runs with no SSN configured, tick 1 onward simulates the
        // operator (or a separate collaborator) having written "a,b".
        if tick == 1 {
            db.set_ssn_string("a,b");
            db.set_last_operation(150);
        }
        if tick >= 1 {
            db.set_stats(vec![
                ReplicationRow {
                    pid: 100,
                    application_name: "a".to_string(),
                    sync_state: "sync".to_string(),
                    write_lsn: Some(200 + tick as u64 * 10),
                    flush_lsn: Some(200 + tick as u64 * 10),
                    replay_lsn: Some(200 + tick as u64 * 10),
                },
                ReplicationRow {
                    pid: 101,
                    application_name: "b".to_string(),
                    sync_state: "potential".to_string(),
                    write_lsn: Some(180),
                    flush_lsn: Some(180),
                    replay_lsn: Some(180),
                },
            ]);
        }

        match controller.current_state(&cluster, &db).await {
            Ok((candidates, sync_nodes)) => {
                info!(
                    tick,
                    candidates = ?candidates.iter().collect::<Vec<_>>(),
                    sync_nodes = ?sync_nodes.iter().collect::<Vec<_>>(),
                    "tick complete"
                );
                if let Err(e) = controller.set_synchronous_standby_names(&db, &candidates).await {
                    error!(tick, error = %e, "failed to apply synchronous_standby_names");
                }
            }
            Err(e) => {
                error!(tick, error = %e, "failed to compute sync controller state, retrying next tick");
            }
        }
    }

    Ok(())
}

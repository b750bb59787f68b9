// src/lib.rs

//! A synchronous replication controller for a PostgreSQL high-availability
//! orchestrator.
//!
//! This crate owns the component that, while running on the cluster
//! primary, decides which replicas should be designated as synchronous
//! standbys and keeps the database's `synchronous_standby_names` setting in
//! sync with that decision. It does not perform failover, promote or demote
//! nodes, or talk to a real DCS/database — those are abstract collaborators
//! (see [`collaborators`]) that a surrounding orchestrator supplies.

pub mod ci;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod error;
pub mod readiness;
pub mod replica;
pub mod ssn;

pub use ci::{CiMap, CiSet};
pub use controller::SyncController;
pub use error::{SsnParseError, SyncCtlError};
pub use replica::{Replica, ReplicaView};

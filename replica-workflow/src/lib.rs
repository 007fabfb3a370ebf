//! # replica-workflow
//!
//! [`ReplicationWorkflow`] drives one run against a [`PlatformAdapter`]:
//! resolve the origin, create and import the destination, then materialize
//! the generated settings and CSV artifacts.
//!
//! [`ReplicationWorkflow::plan`] stops before the first remote mutation and
//! backs `--dry-run`; [`ReplicationWorkflow::list`] is the read-only
//! discovery mode.
//!
//! [`PlatformAdapter`]: replica_remote::PlatformAdapter

pub mod error;
pub mod plan;
pub mod workflow;

pub use error::WorkflowError;
pub use plan::Plan;
pub use workflow::{ReplicationWorkflow, RunReport, Stage, WriteRecord};

//! Builds a process tree from a flat snapshot of `(ppid, pid, command)` records
//! and renders it with branch-drawing connectors.

pub mod error;
pub mod hierarchy;
pub mod record;
pub mod render;

pub use error::HierarchyError;
pub use hierarchy::{
    BuildIssue, BuildOutcome, DuplicatePolicy, HierarchyBuilder, ProcessNode, ProcessRegistry,
};
pub use record::{ProcessRecord, RawProcessRecord};
pub use render::{ConnectorStyle, NameProbe, NoProbe, TreeRenderer};

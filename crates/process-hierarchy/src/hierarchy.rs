use crate::error::HierarchyError;
use crate::record::{ProcessRecord, RawProcessRecord};
use libc::pid_t;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when the same pid is recorded more than once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Every occurrence appends the pid to its parent's children
    #[default]
    Append,
    /// A pid is listed at most once, under the parent from its last record
    Unique,
}

/// A process in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessNode {
    pub pid: pid_t,
    pub command: String,
    /// `None` while the node is only known as someone's parent
    pub parent_pid: Option<pid_t>,
    /// Child pids in the order their records were first seen
    pub children: Vec<pid_t>,
}

impl ProcessNode {
    fn placeholder(pid: pid_t) -> Self {
        Self {
            pid,
            command: String::new(),
            parent_pid: None,
            children: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.parent_pid.is_none()
    }
}

/// All processes of one snapshot, keyed by pid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRegistry {
    nodes: HashMap<pid_t, ProcessNode>,
}

impl ProcessRegistry {
    pub fn get(&self, pid: pid_t) -> Option<&ProcessNode> {
        self.nodes.get(&pid)
    }

    pub fn contains(&self, pid: pid_t) -> bool {
        self.nodes.contains_key(&pid)
    }

    /// Children of `pid` in stored order, empty if the pid is unknown
    pub fn children_of(&self, pid: pid_t) -> &[pid_t] {
        self.nodes
            .get(&pid)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A data-quality problem found while building, never fatal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildIssue {
    #[error("skipped {0}")]
    Malformed(HierarchyError),

    #[error("pid {pid} recorded more than once, replacing command {previous_command:?}")]
    Duplicate {
        pid: pid_t,
        previous_command: String,
    },
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub registry: ProcessRegistry,
    pub issues: Vec<BuildIssue>,
}

/// Builds a ProcessRegistry from process records, in a single pass
pub struct HierarchyBuilder {
    registry: ProcessRegistry,
    policy: DuplicatePolicy,
    issues: Vec<BuildIssue>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl HierarchyBuilder {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            registry: ProcessRegistry::default(),
            policy,
            issues: Vec::new(),
        }
    }

    /// Build a registry from typed records with the default duplicate policy
    pub fn build(records: impl IntoIterator<Item = ProcessRecord>) -> ProcessRegistry {
        let mut builder = Self::default();
        for record in records {
            builder.push(record);
        }
        builder.into_outcome().registry
    }

    /// Build a registry from raw rows, skipping the ones that do not parse
    pub fn build_raw<'a>(
        rows: impl IntoIterator<Item = &'a RawProcessRecord>,
        policy: DuplicatePolicy,
    ) -> BuildOutcome {
        let mut builder = Self::new(policy);
        for row in rows {
            builder.push_raw(row);
        }
        builder.into_outcome()
    }

    pub fn push_raw(&mut self, row: &RawProcessRecord) {
        match row.parse() {
            Ok(record) => self.push(record),
            Err(err) => {
                warn!("Skipping process record: {err}");
                self.issues.push(BuildIssue::Malformed(err));
            }
        }
    }

    /// Insert or update the node for `record.pid` and link it to its parent
    pub fn push(&mut self, record: ProcessRecord) {
        let ProcessRecord {
            parent_pid,
            pid,
            command,
        } = record;

        let previous = self
            .registry
            .nodes
            .get(&pid)
            .filter(|node| !node.is_placeholder())
            .map(|node| (node.command.clone(), node.parent_pid));

        let mut link = true;
        if let Some((previous_command, previous_parent)) = previous {
            debug!("Duplicate record for pid {pid}: {previous_command:?} -> {command:?}");
            self.issues.push(BuildIssue::Duplicate {
                pid,
                previous_command,
            });

            if self.policy == DuplicatePolicy::Unique {
                match previous_parent {
                    Some(previous_parent) if previous_parent == parent_pid => link = false,
                    Some(previous_parent) => self.unlink(previous_parent, pid),
                    None => {}
                }
            }
        }

        let node = self
            .registry
            .nodes
            .entry(pid)
            .or_insert_with(|| ProcessNode::placeholder(pid));
        node.command = command;
        node.parent_pid = Some(parent_pid);

        if link {
            self.register_parent_child(parent_pid, pid);
        }
    }

    /// Register a parent-child relationship, creating the parent if needed
    fn register_parent_child(&mut self, parent_pid: pid_t, child_pid: pid_t) {
        self.registry
            .nodes
            .entry(parent_pid)
            .or_insert_with(|| ProcessNode::placeholder(parent_pid))
            .children
            .push(child_pid);
    }

    fn unlink(&mut self, parent_pid: pid_t, child_pid: pid_t) {
        if let Some(parent) = self.registry.nodes.get_mut(&parent_pid) {
            parent.children.retain(|&pid| pid != child_pid);
        }
    }

    /// Get the completed registry along with everything worth reporting
    pub fn into_outcome(self) -> BuildOutcome {
        BuildOutcome {
            registry: self.registry,
            issues: self.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord::new(0, 1, "/sbin/init"),
            ProcessRecord::new(1, 2, "/usr/bin/bash"),
            ProcessRecord::new(1, 3, "/usr/bin/sshd"),
            ProcessRecord::new(3, 4, "/usr/bin/zsh"),
        ]
    }

    fn raw(line: &str) -> RawProcessRecord {
        RawProcessRecord::from_columns(line)
    }

    #[test]
    fn test_build_links_children() {
        let registry = HierarchyBuilder::build(sample_records());

        // 0 is a placeholder parent for init
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.children_of(0), &[1]);
        assert_eq!(registry.children_of(1), &[2, 3]);
        assert_eq!(registry.children_of(3), &[4]);
        assert!(registry.children_of(4).is_empty());

        let init = registry.get(1).unwrap();
        assert_eq!(init.command, "/sbin/init");
        assert_eq!(init.parent_pid, Some(0));
        assert!(registry.get(0).unwrap().is_placeholder());
    }

    #[test]
    fn test_children_keep_first_seen_order() {
        let registry = HierarchyBuilder::build([
            ProcessRecord::new(1, 30, "c"),
            ProcessRecord::new(1, 10, "a"),
            ProcessRecord::new(1, 20, "b"),
        ]);
        assert_eq!(registry.children_of(1), &[30, 10, 20]);
    }

    #[test]
    fn test_child_before_parent_populates_placeholder() {
        let registry = HierarchyBuilder::build([
            ProcessRecord::new(7, 8, "child"),
            ProcessRecord::new(1, 7, "parent"),
        ]);

        let parent = registry.get(7).unwrap();
        assert!(!parent.is_placeholder());
        assert_eq!(parent.command, "parent");
        assert_eq!(parent.children, vec![8]);
        assert_eq!(registry.children_of(1), &[7]);
    }

    #[test]
    fn test_unknown_pid_has_no_children() {
        let registry = HierarchyBuilder::build(sample_records());
        assert!(!registry.contains(99));
        assert!(registry.children_of(99).is_empty());
    }

    #[test]
    fn test_duplicate_append_policy() {
        let mut records = sample_records();
        records.push(ProcessRecord::new(1, 2, "/usr/bin/fish"));

        let rows: Vec<RawProcessRecord> = records.into_iter().map(Into::into).collect();
        let outcome = HierarchyBuilder::build_raw(&rows, DuplicatePolicy::Append);

        assert_eq!(outcome.registry.get(2).unwrap().command, "/usr/bin/fish");
        assert_eq!(outcome.registry.children_of(1), &[2, 3, 2]);
        assert_eq!(
            outcome.issues,
            vec![BuildIssue::Duplicate {
                pid: 2,
                previous_command: "/usr/bin/bash".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicate_unique_policy_keeps_first_position() {
        let mut builder = HierarchyBuilder::new(DuplicatePolicy::Unique);
        for record in sample_records() {
            builder.push(record);
        }
        builder.push(ProcessRecord::new(1, 2, "/usr/bin/fish"));

        let outcome = builder.into_outcome();
        assert_eq!(outcome.registry.children_of(1), &[2, 3]);
        assert_eq!(outcome.registry.get(2).unwrap().command, "/usr/bin/fish");
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn test_duplicate_unique_policy_moves_to_new_parent() {
        let mut builder = HierarchyBuilder::new(DuplicatePolicy::Unique);
        for record in sample_records() {
            builder.push(record);
        }
        builder.push(ProcessRecord::new(3, 2, "/usr/bin/bash"));

        let registry = builder.into_outcome().registry;
        assert_eq!(registry.children_of(1), &[3]);
        assert_eq!(registry.children_of(3), &[4, 2]);
        assert_eq!(registry.get(2).unwrap().parent_pid, Some(3));
    }

    #[test_log::test]
    fn test_build_raw_skips_malformed_rows() {
        let rows = vec![
            raw("0 1 /sbin/init"),
            raw("1 x bash"),
            raw("1 3 sshd"),
            raw("1"),
        ];
        let outcome = HierarchyBuilder::build_raw(&rows, DuplicatePolicy::default());

        assert_eq!(outcome.registry.children_of(1), &[3]);
        assert_eq!(outcome.issues.len(), 2);
        assert!(
            outcome
                .issues
                .iter()
                .all(|issue| matches!(issue, BuildIssue::Malformed(_)))
        );
    }

    #[test]
    fn test_self_parented_record() {
        let registry = HierarchyBuilder::build([ProcessRecord::new(5, 5, "loop")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.children_of(5), &[5]);
    }
}

use crate::{prelude::*, probe::FilesystemProbe};
use itertools::{Either, Itertools};
use libc::pid_t;
use process_hierarchy::{BuildIssue, HierarchyBuilder, TreeRenderer};

use super::TreeSettings;

/// Take a snapshot, build the registry and render it from `root_pid`
///
/// Nothing is returned unless the whole tree could be rendered.
pub(super) fn render_tree(settings: &TreeSettings, root_pid: pid_t) -> Result<Vec<String>> {
    let rows = settings.source.snapshot()?;
    let outcome = HierarchyBuilder::build_raw(&rows, settings.duplicates);
    report_issues(&outcome.issues);
    debug!("Registry holds {} processes", outcome.registry.len());

    let lines = TreeRenderer::new(&outcome.registry, &FilesystemProbe)
        .with_style(settings.style)
        .render(root_pid)
        .with_context(|| format!("Cannot print the process tree of pid {root_pid}"))?;

    Ok(lines)
}

fn report_issues(issues: &[BuildIssue]) {
    let (malformed, duplicates): (Vec<_>, Vec<_>) =
        issues.iter().partition_map(|issue| match issue {
            BuildIssue::Malformed(err) => Either::Left(err),
            BuildIssue::Duplicate { pid, .. } => Either::Right(*pid),
        });

    if !malformed.is_empty() {
        info!(
            "{} process records were left out of the tree",
            malformed.len()
        );
    }
    if !duplicates.is_empty() {
        debug!(
            "Pids recorded more than once: {}",
            duplicates.iter().unique().join(", ")
        );
    }
}

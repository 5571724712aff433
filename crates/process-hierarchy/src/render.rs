use crate::error::HierarchyError;
use crate::hierarchy::{ProcessNode, ProcessRegistry};
use libc::pid_t;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Name shown for a pid that is only known as the parent of other processes
pub const PLACEHOLDER_NAME: &str = "?";

/// Resolves a command to a file name when it points at an existing file
pub trait NameProbe {
    /// Returns the final path segment of `command` if it is an existing file
    fn existing_file_name(&self, command: &str) -> Option<String>;
}

/// A probe that never finds anything, so commands are shown verbatim
pub struct NoProbe;

impl NameProbe for NoProbe {
    fn existing_file_name(&self, _command: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Ascii,
    Unicode,
}

struct Glyphs {
    branch: &'static str,
    last: &'static str,
    continuation: &'static str,
    blank: &'static str,
}

const ASCII_GLYPHS: Glyphs = Glyphs {
    branch: " |- ",
    last: " `- ",
    continuation: " |  ",
    blank: "    ",
};

const UNICODE_GLYPHS: Glyphs = Glyphs {
    branch: " ├─ ",
    last: " └─ ",
    continuation: " │  ",
    blank: "    ",
};

impl ConnectorStyle {
    fn glyphs(self) -> &'static Glyphs {
        match self {
            ConnectorStyle::Ascii => &ASCII_GLYPHS,
            ConnectorStyle::Unicode => &UNICODE_GLYPHS,
        }
    }
}

/// Depth-first renderer of a [`ProcessRegistry`]
///
/// Each line is `<indent><name>(<pid>)`. The indent holds one four-column
/// segment per depth below the root: the last one is the node's own connector,
/// the others show whether the ancestor at that depth still has siblings to come.
pub struct TreeRenderer<'a, P: NameProbe + ?Sized> {
    registry: &'a ProcessRegistry,
    probe: &'a P,
    style: ConnectorStyle,
}

impl<'a, P: NameProbe + ?Sized> TreeRenderer<'a, P> {
    pub fn new(registry: &'a ProcessRegistry, probe: &'a P) -> Self {
        Self {
            registry,
            probe,
            style: ConnectorStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ConnectorStyle) -> Self {
        self.style = style;
        self
    }

    /// Render the tree rooted at `root_pid`, one line per process
    ///
    /// Each pid is rendered at most once: repeated or cyclic children entries
    /// are ignored after their first occurrence in traversal order.
    pub fn render(&self, root_pid: pid_t) -> Result<Vec<String>, HierarchyError> {
        let mut lines = Vec::new();
        self.for_each_line(root_pid, |line| lines.push(line))?;
        Ok(lines)
    }

    /// Same traversal as [`TreeRenderer::render`], handing each line to `emit`
    ///
    /// Fails before emitting anything when `root_pid` is unknown.
    pub fn for_each_line(
        &self,
        root_pid: pid_t,
        mut emit: impl FnMut(String),
    ) -> Result<(), HierarchyError> {
        let Some(root) = self.registry.get(root_pid) else {
            return Err(HierarchyError::MissingRoot { pid: root_pid });
        };

        let mut claimed = HashSet::from([root_pid]);
        let mut last_flags = Vec::new();
        emit(self.format_line(root, &last_flags));

        // One frame per expanded node on the current path: its claimed
        // children and the index of the next one to render
        let mut stack = vec![(self.claim_children(root, &mut claimed), 0)];
        while let Some((children, next)) = stack.last_mut() {
            if *next == children.len() {
                stack.pop();
                last_flags.pop();
                continue;
            }

            let child = children[*next];
            *next += 1;
            last_flags.push(*next == children.len());

            emit(self.format_line(child, &last_flags));
            let grandchildren = self.claim_children(child, &mut claimed);
            stack.push((grandchildren, 0));
        }

        Ok(())
    }

    /// Children of `node` not yet rendered elsewhere, claimed in stored order
    fn claim_children(
        &self,
        node: &ProcessNode,
        claimed: &mut HashSet<pid_t>,
    ) -> Vec<&'a ProcessNode> {
        node.children
            .iter()
            .filter_map(|&child| self.registry.get(child))
            .filter(|child| claimed.insert(child.pid))
            .collect()
    }

    fn format_line(&self, node: &ProcessNode, last_flags: &[bool]) -> String {
        format!(
            "{}{}({})",
            self.indent(last_flags),
            self.display_name(node),
            node.pid
        )
    }

    /// `last_flags[d]` tells whether the node at depth `d + 1` on the current
    /// path is the last child of its parent. The root has no flag.
    fn indent(&self, last_flags: &[bool]) -> String {
        let glyphs = self.style.glyphs();
        let Some((&is_last, ancestors)) = last_flags.split_last() else {
            return String::new();
        };

        let mut indent = String::new();
        for &ancestor_is_last in ancestors {
            indent.push_str(if ancestor_is_last {
                glyphs.blank
            } else {
                glyphs.continuation
            });
        }
        indent.push_str(if is_last { glyphs.last } else { glyphs.branch });
        indent
    }

    pub fn display_name(&self, node: &ProcessNode) -> String {
        if node.is_placeholder() {
            return PLACEHOLDER_NAME.to_string();
        }

        if Path::new(&node.command).is_absolute() {
            if let Some(name) = self.probe.existing_file_name(&node.command) {
                return name;
            }
        }

        node.command.clone()
    }
}

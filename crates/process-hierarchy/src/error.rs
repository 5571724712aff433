use libc::pid_t;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("no process with pid {pid} in the snapshot")]
    MissingRoot { pid: pid_t },

    #[error("malformed process record (ppid={parent_pid:?}, pid={pid:?}): {reason}")]
    MalformedRecord {
        parent_pid: String,
        pid: String,
        reason: &'static str,
    },
}

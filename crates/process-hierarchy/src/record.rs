use crate::error::HierarchyError;
use libc::pid_t;

/// A single process as seen at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub parent_pid: pid_t,
    pub pid: pid_t,
    pub command: String,
}

impl ProcessRecord {
    pub fn new(parent_pid: pid_t, pid: pid_t, command: impl Into<String>) -> Self {
        Self {
            parent_pid,
            pid,
            command: command.into(),
        }
    }
}

/// A process row as acquired, before the id columns are validated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawProcessRecord {
    pub parent_pid: String,
    pub pid: String,
    pub command: String,
}

impl RawProcessRecord {
    /// Split one line of `ps axo ppid,pid,comm` output into its three columns.
    ///
    /// The command column is the remainder of the line and may contain spaces.
    /// Missing columns are left empty.
    pub fn from_columns(line: &str) -> Self {
        let (parent_pid, rest) = split_column(line);
        let (pid, rest) = split_column(rest);

        Self {
            parent_pid: parent_pid.to_string(),
            pid: pid.to_string(),
            command: rest.trim().to_string(),
        }
    }

    pub fn parse(&self) -> Result<ProcessRecord, HierarchyError> {
        let malformed = |reason| HierarchyError::MalformedRecord {
            parent_pid: self.parent_pid.clone(),
            pid: self.pid.clone(),
            reason,
        };

        let parent_pid = self
            .parent_pid
            .parse::<pid_t>()
            .map_err(|_| malformed("parent pid is not an integer"))?;
        let pid = self
            .pid
            .parse::<pid_t>()
            .map_err(|_| malformed("pid is not an integer"))?;
        if self.command.is_empty() {
            return Err(malformed("command column is missing"));
        }

        Ok(ProcessRecord {
            parent_pid,
            pid,
            command: self.command.clone(),
        })
    }
}

impl From<ProcessRecord> for RawProcessRecord {
    fn from(record: ProcessRecord) -> Self {
        Self {
            parent_pid: record.parent_pid.to_string(),
            pid: record.pid.to_string(),
            command: record.command,
        }
    }
}

fn split_column(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}

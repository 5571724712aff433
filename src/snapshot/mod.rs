use std::path::PathBuf;

use crate::prelude::*;
use clap::ValueEnum;
use process_hierarchy::RawProcessRecord;
use serde::{Deserialize, Serialize};

mod file;
mod procfs_source;
mod ps;
mod sysinfo_source;

/// How to list the processes of the running system
#[derive(ValueEnum, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Run `ps axo ppid,pid,comm`
    #[default]
    Ps,
    /// Query the system through the sysinfo crate
    Sysinfo,
    /// Read /proc directly (Linux only)
    Procfs,
}

/// Where one process snapshot comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessSource {
    Live(SourceKind),
    /// A captured `ps axo ppid,pid,comm` listing
    File(PathBuf),
    Stdin,
}

impl ProcessSource {
    /// Build a source from the `--input` argument, `-` meaning stdin
    pub fn from_input(input: &str) -> Self {
        if input == "-" {
            return ProcessSource::Stdin;
        }
        // A ~ may reach us unexpanded when the path comes from a config or a quoted argument
        ProcessSource::File(PathBuf::from(shellexpand::tilde(input).as_ref()))
    }

    /// Take one snapshot of the process list
    pub fn snapshot(&self) -> Result<Vec<RawProcessRecord>> {
        let records = match self {
            ProcessSource::Live(SourceKind::Ps) => ps::snapshot()?,
            ProcessSource::Live(SourceKind::Sysinfo) => sysinfo_source::snapshot()?,
            ProcessSource::Live(SourceKind::Procfs) => procfs_source::snapshot()?,
            ProcessSource::File(path) => file::read_listing(path)?,
            ProcessSource::Stdin => file::read_stdin_listing()?,
        };
        debug!("Snapshot from {self:?} holds {} records", records.len());
        Ok(records)
    }
}

/// Parse `ps axo ppid,pid,comm` output, skipping its header line
pub fn parse_ps_listing(listing: &str) -> Vec<RawProcessRecord> {
    listing
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(RawProcessRecord::from_columns)
        .collect()
}

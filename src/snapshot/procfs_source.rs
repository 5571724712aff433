use crate::prelude::*;
use process_hierarchy::RawProcessRecord;

#[cfg(target_os = "linux")]
pub(super) fn snapshot() -> Result<Vec<RawProcessRecord>> {
    use itertools::Itertools;
    use process_hierarchy::ProcessRecord;

    let processes = procfs::process::all_processes().context("Failed to read /proc")?;

    let records = processes
        .filter_map(|process| match process.and_then(|process| process.stat()) {
            Ok(stat) => Some(ProcessRecord::new(stat.ppid, stat.pid, stat.comm)),
            Err(err) => {
                // Processes can exit while /proc is being walked
                debug!("Skipping process: {err}");
                None
            }
        })
        .sorted_by_key(|record| record.pid)
        .map(RawProcessRecord::from)
        .collect();

    Ok(records)
}

#[cfg(not(target_os = "linux"))]
pub(super) fn snapshot() -> Result<Vec<RawProcessRecord>> {
    bail!("The procfs source is only available on Linux")
}

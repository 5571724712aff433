use crate::prelude::*;
use itertools::Itertools;
use process_hierarchy::{ProcessRecord, RawProcessRecord};
use sysinfo::{ProcessRefreshKind, RefreshKind, System, UpdateKind};

pub(super) fn snapshot() -> Result<Vec<RawProcessRecord>> {
    let system = System::new_with_specifics(
        RefreshKind::nothing()
            .with_processes(ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet)),
    );
    if system.processes().is_empty() {
        bail!("sysinfo could not list any process on this system");
    }

    // Sibling order follows record order, so keep it stable like ps does
    let records = system
        .processes()
        .values()
        .filter(|process| process.thread_kind().is_none())
        .map(|process| {
            let command = match process.exe() {
                Some(exe) => exe.to_string_lossy().into_owned(),
                None => process.name().to_string_lossy().into_owned(),
            };
            let parent_pid = process.parent().map_or(0, |parent| parent.as_u32());
            ProcessRecord::new(
                parent_pid as libc::pid_t,
                process.pid().as_u32() as libc::pid_t,
                command,
            )
        })
        .sorted_by_key(|record| record.pid)
        .map(RawProcessRecord::from)
        .collect();

    Ok(records)
}

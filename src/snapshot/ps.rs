use std::process::Command;

use crate::prelude::*;
use process_hierarchy::RawProcessRecord;

use super::parse_ps_listing;

pub(super) fn snapshot() -> Result<Vec<RawProcessRecord>> {
    let output = Command::new("ps")
        .args(["axo", "ppid,pid,comm"])
        .output()
        .context("Failed to run ps")?;
    if !output.status.success() {
        bail!(
            "ps exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    Ok(parse_ps_listing(&listing))
}

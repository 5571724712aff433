use std::{fs, io, path::Path};

use crate::prelude::*;
use process_hierarchy::RawProcessRecord;

use super::parse_ps_listing;

pub(super) fn read_listing(path: &Path) -> Result<Vec<RawProcessRecord>> {
    let listing = fs::read_to_string(path)
        .with_context(|| format!("Failed to read process listing at {}", path.display()))?;
    Ok(parse_ps_listing(&listing))
}

pub(super) fn read_stdin_listing() -> Result<Vec<RawProcessRecord>> {
    let listing = io::read_to_string(io::stdin()).context("Failed to read process listing")?;
    Ok(parse_ps_listing(&listing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ps.txt");
        fs::write(&path, "PPID PID COMMAND\n0 1 init\n1 2 bash\n").unwrap();

        let records = read_listing(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].command, "bash");
    }

    #[test]
    fn test_read_missing_listing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_listing(&dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read process listing"));
    }
}

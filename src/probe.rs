use std::path::Path;

use process_hierarchy::NameProbe;

/// Checks commands against the local filesystem
pub struct FilesystemProbe;

impl NameProbe for FilesystemProbe {
    fn existing_file_name(&self, command: &str) -> Option<String> {
        let path = Path::new(command);
        if !path.exists() {
            return None;
        }

        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("daemon");
        std::fs::write(&binary, "").unwrap();

        let name = FilesystemProbe.existing_file_name(binary.to_str().unwrap());
        assert_eq!(name.as_deref(), Some("daemon"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert_eq!(
            FilesystemProbe.existing_file_name(missing.to_str().unwrap()),
            None
        );
    }

    #[test]
    fn test_root_has_no_file_name() {
        assert_eq!(FilesystemProbe.existing_file_name("/"), None);
    }
}

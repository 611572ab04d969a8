//! Stack lifecycle housekeeping.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Files generated while the stack runs, removed again by `down`.
///
/// Credential files under `private/plugins/` are not in this list: they
/// outlive the stack (see DESIGN notes before changing this).
pub const GENERATED_FILES: [&str; 4] = [
    "private/key.pem",
    "private/cert.pem",
    "private/cacert.pem",
    "private/reverse_ssh_port",
];

/// Delete the generated files, ignoring any that are already absent.
///
/// Returns the paths that were actually removed, for operator feedback.
pub fn remove_generated_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for name in GENERATED_FILES {
        let path = root.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn removes_present_files_and_ignores_absent_ones() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("private")).unwrap();
        fs::write(root.path().join("private/key.pem"), "key").unwrap();
        fs::write(root.path().join("private/reverse_ssh_port"), "2201").unwrap();

        let removed = remove_generated_files(root.path()).unwrap();
        assert_eq!(
            removed,
            [
                root.path().join("private/key.pem"),
                root.path().join("private/reverse_ssh_port"),
            ]
        );
        assert!(!root.path().join("private/key.pem").exists());

        // second invocation finds nothing left and still succeeds
        assert!(remove_generated_files(root.path()).unwrap().is_empty());
    }

    #[test]
    fn credential_files_survive_cleanup() {
        let root = tempdir().unwrap();
        let creds = root.path().join("private/plugins/plugin-37-0.1.0-0");
        fs::create_dir_all(&creds).unwrap();
        fs::write(creds.join("plugin.credentials"), "[credentials]\n").unwrap();

        remove_generated_files(root.path()).unwrap();
        assert!(creds.join("plugin.credentials").exists());
    }
}

//! New-plugin scaffolding from template directories.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{NodeError, Result};
use crate::manifest::MANIFEST_FILE;

/// Plugin names become directory, image and account name components, so the
/// character set is deliberately narrow.
pub fn plugin_name_valid(name: &str) -> bool {
    let re = Regex::new("^[a-z0-9_-]+$").expect("valid pattern");
    re.is_match(name)
}

/// A directory of named plugin templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Names of the available templates, sorted for stable CLI help output.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_dir())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn path(&self, template: &str) -> PathBuf {
        self.root.join(template)
    }
}

fn default_manifest(name: &str) -> String {
    let manifest = serde_json::json!({
        "architecture": [
            "linux/amd64",
            "linux/arm/v7",
            "linux/arm64"
        ],
        "arguments": [],
        "description": format!("My cool new plugin called {}", name),
        "inputs": [],
        "metadata": {},
        "id": 1000,
        "name": name,
        "namespace": "waggle",
        "source": "URL for repo",
        "version": "0.0.1"
    });
    let mut text = serde_json::to_string_pretty(&manifest).expect("manifest serializes");
    text.push('\n');
    text
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::from)?;
        let rel = entry.path().strip_prefix(src).expect("walked under src");
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Scaffold `plugin-{name}` in `parent` from the given template directory.
///
/// Both failure paths (bad name, existing directory) return before anything
/// touches the filesystem; existing content is never overwritten. Returns
/// the created plugin directory.
pub fn new_plugin(parent: &Path, name: &str, template_dir: &Path) -> Result<PathBuf> {
    if !plugin_name_valid(name) {
        return Err(NodeError::InvalidName);
    }

    let plugin_dir = parent.join(format!("plugin-{}", name));
    if plugin_dir.exists() {
        return Err(NodeError::DirectoryExists(
            plugin_dir.display().to_string(),
        ));
    }

    copy_dir(template_dir, &plugin_dir)?;
    std::fs::write(plugin_dir.join(MANIFEST_FILE), default_manifest(name))?;
    Ok(plugin_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::PluginManifest;
    use std::fs;
    use tempfile::tempdir;

    fn template_fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let simple = dir.path().join("simple");
        fs::create_dir_all(simple.join("src")).unwrap();
        fs::write(simple.join("Dockerfile"), "FROM python:3\n").unwrap();
        fs::write(simple.join("src/main.py"), "print('hello')\n").unwrap();
        dir
    }

    #[test]
    fn rejects_invalid_names() {
        for name in ["Simple", "my plugin", "plugin!", "UPPER", ""] {
            assert!(!plugin_name_valid(name), "{:?} should be invalid", name);
        }
        for name in ["simple", "my-plugin", "plugin_2", "a"] {
            assert!(plugin_name_valid(name), "{:?} should be valid", name);
        }
    }

    #[test]
    fn invalid_name_leaves_filesystem_untouched() {
        let templates = template_fixture();
        let parent = tempdir().unwrap();

        let err = new_plugin(parent.path(), "Bad Name", &templates.path().join("simple"));
        assert!(matches!(err, Err(NodeError::InvalidName)));
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn existing_directory_is_never_overwritten() {
        let templates = template_fixture();
        let parent = tempdir().unwrap();
        let existing = parent.path().join("plugin-simple");
        fs::create_dir(&existing).unwrap();
        fs::write(existing.join("keep.txt"), "precious").unwrap();

        let err = new_plugin(parent.path(), "simple", &templates.path().join("simple"));
        assert!(matches!(err, Err(NodeError::DirectoryExists(_))));
        assert_eq!(
            fs::read_to_string(existing.join("keep.txt")).unwrap(),
            "precious"
        );
    }

    #[test]
    fn scaffolds_template_and_manifest() {
        let templates = template_fixture();
        let parent = tempdir().unwrap();

        let plugin_dir =
            new_plugin(parent.path(), "mycounter", &templates.path().join("simple")).unwrap();

        assert_eq!(plugin_dir, parent.path().join("plugin-mycounter"));
        assert!(plugin_dir.join("Dockerfile").exists());
        assert!(plugin_dir.join("src/main.py").exists());

        let manifest = PluginManifest::load(&plugin_dir).unwrap();
        assert_eq!(manifest.id, 1000);
        assert_eq!(manifest.name, "mycounter");
        assert_eq!(manifest.version, "0.0.1");
    }

    #[test]
    fn template_store_lists_directories() {
        let templates = template_fixture();
        fs::create_dir(templates.path().join("advanced")).unwrap();
        fs::write(templates.path().join("README.md"), "not a template").unwrap();

        let store = TemplateStore::new(templates.path());
        assert_eq!(store.available(), ["advanced", "simple"]);
    }
}

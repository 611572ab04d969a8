//! End-to-end tests over the public plugin flow.
//!
//! Tests cover:
//! - Manifest resolution from a plugin directory on disk
//! - Build command construction from a loaded manifest
//! - Scaffolding a plugin and building from the scaffolded directory
//! - Credential generation and file layout
//! - Compose overlay generation

use std::fs;

use serde_json::Value;
use tempfile::tempdir;
use waggle_node_core::command::{build_command, image_name};
use waggle_node_core::compose::{parse_plugin_image_ref, ComposeOverlay, OVERLAY_FILE};
use waggle_node_core::credentials::Credential;
use waggle_node_core::identity::PluginIdentity;
use waggle_node_core::manifest::PluginManifest;
use waggle_node_core::scaffold::new_plugin;

// ============================================================================
// Manifest -> build command
// ============================================================================

#[test]
fn test_build_command_from_manifest_on_disk() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("sage.json"),
        r#"{
            "id": 123,
            "name": "test",
            "version": "1.2.3",
            "build_args": {"K1": "V1", "K2": "V2", "K3": "V3"}
        }"#,
    )
    .unwrap();

    let manifest = PluginManifest::load(dir.path()).unwrap();
    let cmd = build_command("/path/to/plugin", &[], &manifest);

    assert_eq!(
        cmd,
        [
            "docker",
            "build",
            "--build-arg",
            "K1=V1",
            "--build-arg",
            "K2=V2",
            "--build-arg",
            "K3=V3",
            "--label",
            "waggle.plugin.id=123",
            "--label",
            "waggle.plugin.version=1.2.3",
            "--label",
            "waggle.plugin.name=test",
            "-t",
            "plugin-test:1.2.3",
            "/path/to/plugin",
        ]
    );
}

// ============================================================================
// Scaffold -> manifest -> image name
// ============================================================================

#[test]
fn test_scaffolded_plugin_is_buildable() {
    let templates = tempdir().unwrap();
    let simple = templates.path().join("simple");
    fs::create_dir_all(&simple).unwrap();
    fs::write(simple.join("Dockerfile"), "FROM python:3\n").unwrap();

    let parent = tempdir().unwrap();
    let plugin_dir = new_plugin(parent.path(), "counter", &simple).unwrap();

    let manifest = PluginManifest::load(&plugin_dir).unwrap();
    assert_eq!(image_name(&manifest), "plugin-counter:0.0.1");

    let cmd = build_command(&plugin_dir.to_string_lossy(), &[], &manifest);
    assert_eq!(cmd[0], "docker");
    assert_eq!(cmd[1], "build");
    assert_eq!(cmd.last().unwrap(), &plugin_dir.to_string_lossy().to_string());
}

// ============================================================================
// Identity -> credential file
// ============================================================================

#[test]
fn test_identity_credential_file_layout() {
    let identity = PluginIdentity {
        id: 37,
        name: "simple".to_string(),
        version: "0.1.0".to_string(),
        instance: 0,
    };
    assert_eq!(identity.account_name(), "plugin-37-0.1.0-0");

    let credential = Credential::generate(identity.account_name());
    assert_eq!(credential.password.len(), 40);

    let root = tempdir().unwrap();
    let path = credential.write_file(root.path()).unwrap();
    assert!(path.ends_with("private/plugins/plugin-37-0.1.0-0/plugin.credentials"));

    let content = fs::read_to_string(path).unwrap();
    assert!(content.starts_with("[credentials]\n"));
    assert!(content.contains(&format!("password={}", credential.password)));
}

// ============================================================================
// Compose overlay
// ============================================================================

#[test]
fn test_compose_overlay_document() {
    let (name, version) = parse_plugin_image_ref("waggle/plugin-simple:0.1.0").unwrap();
    let identity = PluginIdentity {
        id: 37,
        name,
        version,
        instance: 0,
    };
    let credential = Credential {
        username: identity.account_name(),
        password: "s3cret".to_string(),
    };

    let mut overlay = ComposeOverlay::default();
    overlay.add_plugin("waggle/plugin-simple:0.1.0", &identity, &credential);

    let root = tempdir().unwrap();
    let path = overlay.write(root.path()).unwrap();
    assert_eq!(path, root.path().join(OVERLAY_FILE));

    let doc: Value = serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["version"], "3");

    let service = &doc["services"]["plugin-37-0.1.0-0"];
    assert_eq!(service["image"], "waggle/plugin-simple:0.1.0");
    assert_eq!(service["restart"], "always");
    assert_eq!(service["networks"][0], "waggle");
    let env: Vec<String> = service["environment"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        env,
        [
            "WAGGLE_PLUGIN_HOST=rabbitmq",
            "WAGGLE_PLUGIN_ID=37",
            "WAGGLE_PLUGIN_VERSION=0.1.0",
            "WAGGLE_PLUGIN_INSTANCE=0",
            "WAGGLE_PLUGIN_USERNAME=plugin-37-0.1.0-0",
            "WAGGLE_PLUGIN_PASSWORD=s3cret",
        ]
    );
}

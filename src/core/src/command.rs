//! Deterministic construction of container engine argument vectors.
//!
//! These are pure functions: identical input yields the identical vector.
//! The segment ordering of [`build_command`] and [`run_command`] is a
//! compatibility contract relied on by callers and tests asserting on
//! command shape.

use indexmap::IndexMap;

use crate::credentials::Credential;
use crate::identity::{
    PluginIdentity, ENV_PLUGIN_ID, ENV_PLUGIN_INSTANCE, ENV_PLUGIN_PASSWORD, ENV_PLUGIN_USERNAME,
    ENV_PLUGIN_VERSION,
};
use crate::manifest::{PluginManifest, LABEL_ID, LABEL_NAME, LABEL_VERSION};

/// Expand `K=V` strings into `--build-arg K=V` pairs, preserving input order.
pub fn build_args_from_list(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() * 2);
    for arg in args {
        out.push("--build-arg".to_string());
        out.push(arg.clone());
    }
    out
}

/// Expand a mapping into `--build-arg K=V` pairs in its insertion order.
///
/// Callers must not assume alphabetical order; the map iterates in
/// declaration order and the output follows it.
pub fn build_args_from_map(args: &IndexMap<String, String>) -> Vec<String> {
    let list: Vec<String> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    build_args_from_list(&list)
}

/// Image tag for a manifest: `plugin-{name}:{version}`.
pub fn image_name(manifest: &PluginManifest) -> String {
    format!("plugin-{}:{}", manifest.name, manifest.version)
}

/// Full `docker build` argument vector for a plugin directory.
///
/// Segment order: fixed prefix, user-supplied build args, manifest build
/// args, the three identity labels (id, version, name), `-t <image>`, then
/// the context directory as the final positional argument.
pub fn build_command(
    context_dir: &str,
    user_args: &[String],
    manifest: &PluginManifest,
) -> Vec<String> {
    let mut cmd = vec!["docker".to_string(), "build".to_string()];
    cmd.extend(build_args_from_list(user_args));
    cmd.extend(build_args_from_map(&manifest.build_args));
    cmd.extend([
        "--label".to_string(),
        format!("{}={}", LABEL_ID, manifest.id),
        "--label".to_string(),
        format!("{}={}", LABEL_VERSION, manifest.version),
        "--label".to_string(),
        format!("{}={}", LABEL_NAME, manifest.name),
        "-t".to_string(),
        image_name(manifest),
        context_dir.to_string(),
    ]);
    cmd
}

/// Full `docker run` argument vector for one plugin container.
///
/// The five `-e` injections appear in fixed order: id, version, instance,
/// username, password.
pub fn run_command(
    identity: &PluginIdentity,
    credential: &Credential,
    network: &str,
    container_name: &str,
    env_file: &str,
    image: &str,
) -> Vec<String> {
    vec![
        "docker".to_string(),
        "run".to_string(),
        "-it".to_string(),
        "--name".to_string(),
        container_name.to_string(),
        "--network".to_string(),
        network.to_string(),
        "--env-file".to_string(),
        env_file.to_string(),
        "--restart".to_string(),
        "on-failure".to_string(),
        "-e".to_string(),
        format!("{}={}", ENV_PLUGIN_ID, identity.id),
        "-e".to_string(),
        format!("{}={}", ENV_PLUGIN_VERSION, identity.version),
        "-e".to_string(),
        format!("{}={}", ENV_PLUGIN_INSTANCE, identity.instance),
        "-e".to_string(),
        format!("{}={}", ENV_PLUGIN_USERNAME, credential.username),
        "-e".to_string(),
        format!("{}={}", ENV_PLUGIN_PASSWORD, credential.password),
        image.to_string(),
    ]
}

//! `newplugin` — scaffold a new plugin project from a template.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use waggle_node_core::scaffold::{new_plugin, TemplateStore};

use crate::output;

#[derive(Args)]
pub struct NewPluginArgs {
    /// Plugin template to use
    #[arg(short = 't', long, default_value = "simple")]
    pub template: String,

    /// Name of the plugin (lowercase letters, numbers, _ and -)
    pub name: String,
}

pub fn execute(args: NewPluginArgs, project_dir: &Path) -> Result<i32> {
    let store = TemplateStore::new(project_dir.join("templates"));
    let available = store.available();
    if !available.contains(&args.template) {
        bail!(
            "unknown template '{}' (available: {})",
            args.template,
            available.join(", ")
        );
    }

    let plugin_dir = new_plugin(project_dir, &args.name, &store.path(&args.template))?;
    output::print_success(&format!("Created {}", plugin_dir.display()));
    Ok(0)
}

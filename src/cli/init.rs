//! trk init command implementation
//!
//! Creates the config file and empty JSON collections in a workspace.

use std::path::{Path, PathBuf};

use super::CommandContext;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::JsonStore;

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    data_dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    collections: bool,
}

pub fn run(ctx: &CommandContext) -> Result<()> {
    let root = ctx.workspace_root()?;
    let config = Config::load_from_workspace(&root)?;
    let data_dir = root.join(&config.data_dir);

    let store = JsonStore::new(data_dir.clone());
    let created_collections = !store.is_initialized();
    store.init()?;
    let created_config = ensure_config(&root)?;

    let report = InitReport {
        root: root.clone(),
        data_dir: data_dir.clone(),
        created: InitCreated {
            config: created_config,
            collections: created_collections,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(".trk.toml");
    }
    if created_collections {
        created_items.push(".trk/");
    }

    let header = if created_items.is_empty() {
        "trk init: nothing to do".to_string()
    } else {
        "trk init: initialized workspace".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("root", root.display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("trk user add <name>");
    human.push_next_step("trk actor set <user-id>");

    emit_success(
        OutputOptions {
            json: ctx.json,
            quiet: ctx.quiet,
        },
        "init",
        &report,
        Some(&human),
    )?;

    Ok(())
}

fn ensure_config(root: &Path) -> Result<bool> {
    let config_path = root.join(".trk.toml");
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                ".trk.toml exists but is not a file: {}",
                config_path.display()
            )));
        }
        return Ok(false);
    }

    Config::default().save(&config_path)?;
    Ok(true)
}

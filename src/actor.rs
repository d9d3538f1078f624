//! Acting-user resolution.
//!
//! Resolution order:
//! 1) CLI --actor (explicit)
//! 2) TRK_ACTOR environment variable
//! 3) Persisted workspace value in the data dir's `actor` file
//!
//! There is no fallback default: every mutating command needs a real
//! user id, so an unresolved actor is an error at the call site.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::EntityId;

const ACTOR_FILENAME: &str = "actor";

/// Resolve the acting user id from CLI, environment, and persisted value.
pub fn resolve_actor(data_dir: &Path, cli_actor: Option<EntityId>) -> Result<EntityId> {
    if let Some(actor) = cli_actor {
        return Ok(actor);
    }

    if let Ok(env_actor) = std::env::var("TRK_ACTOR") {
        let trimmed = env_actor.trim();
        if !trimmed.is_empty() {
            return trimmed.parse().map_err(|_| {
                Error::InvalidArgument(format!("TRK_ACTOR must be a user id, got '{trimmed}'"))
            });
        }
    }

    if let Some(actor) = load_persisted_actor(data_dir)? {
        return Ok(actor);
    }

    Err(Error::InvalidArgument(
        "no acting user: pass --actor, set TRK_ACTOR, or run 'trk actor set'".to_string(),
    ))
}

/// Persist the acting user id in the data dir.
pub fn persist_actor(data_dir: &Path, actor: EntityId) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(actor_path(data_dir), format!("{actor}\n"))?;
    Ok(())
}

/// Load the persisted acting user id, if present.
pub fn load_persisted_actor(data_dir: &Path) -> Result<Option<EntityId>> {
    let path = actor_path(data_dir);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let actor = trimmed.parse().map_err(|_| {
        Error::InvalidArgument(format!("persisted actor must be a user id, got '{trimmed}'"))
    })?;
    Ok(Some(actor))
}

fn actor_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ACTOR_FILENAME)
}

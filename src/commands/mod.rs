pub mod prepare;
pub mod providers;
pub mod run;

pub use prepare::PrepareCommand;
pub use providers::ProvidersCommand;
pub use run::RunCommand;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::credential::Credential;
use crate::source::SourceDefinition;
use crate::update::{InventoryUpdate, ModePolicy, UpdateOpts};

/// Arguments shared by the commands that build an update from files.
pub struct UpdateParams<'a> {
    pub source: &'a Path,
    pub credential: Option<&'a Path>,
    pub mode: &'a str,
    pub scripts_dir: Option<&'a Path>,
    pub update_id: u64,
    pub source_id: u64,
    pub license_type: &'a str,
}

/// Loads the source and credential files and assembles an update.
pub(crate) fn load_update(params: &UpdateParams) -> Result<InventoryUpdate> {
    let source = SourceDefinition::from_file(params.source).with_context(|| {
        format!(
            "Failed to load source definition from '{}'",
            params.source.display()
        )
    })?;

    let credential = match params.credential {
        Some(path) => Some(Credential::from_file(path).with_context(|| {
            format!("Failed to load credential from '{}'", path.display())
        })?),
        None => None,
    };

    let policy = ModePolicy::parse(params.mode).with_context(|| {
        format!(
            "'{}' is not a valid mode, expected one of: auto, script, plugin",
            params.mode
        )
    })?;

    Ok(InventoryUpdate {
        id: params.update_id,
        source_id: params.source_id,
        source,
        credential,
        opts: UpdateOpts {
            policy,
            scripts_dir: params.scripts_dir.map(PathBuf::from),
            license_type: params.license_type.to_string(),
        },
    })
}

//! Inventory update orchestration.
//!
//! [`InventoryUpdate::prepare`] walks the whole pipeline: resolve the
//! variables, build the injection plan for the selected mode, materialize
//! the private data directory and compose the final `ansible-inventory`
//! invocation. [`InventoryUpdate::run`] executes it and tears the
//! directory down afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::credential::Credential;
use crate::error::{InjectError, InjectResult};
use crate::inject::registry::InjectorRegistry;
use crate::inject::{
    BuildContext, ExecutionMode, InjectionResult, Injector, InventoryInput,
};
use crate::rundir::PrivateDataDir;
use crate::runner::{ProcessRunner, RunRequest, RunResult};
use crate::source::SourceDefinition;
use crate::vars;

/// Baseline environment for every `ansible-inventory` invocation.
pub const STANDARD_INVENTORY_UPDATE_ENV: [(&str, &str); 3] = [
    ("ANSIBLE_INVENTORY_UNPARSED_FAILED", "True"),
    ("ANSIBLE_INVENTORY_EXPORT", "True"),
    ("ANSIBLE_VERBOSE_TO_STDERR", "True"),
];

/// How to choose between script and plugin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModePolicy {
    /// Plugin when the kind has one, script otherwise.
    PluginPreferred,
    ScriptOnly,
    PluginRequired,
}

impl ModePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(ModePolicy::PluginPreferred),
            "script" => Some(ModePolicy::ScriptOnly),
            "plugin" => Some(ModePolicy::PluginRequired),
            _ => None,
        }
    }
}

/// Per-invocation settings that are not part of the source definition.
#[derive(Debug, Clone)]
pub struct UpdateOpts {
    pub policy: ModePolicy,
    pub scripts_dir: Option<PathBuf>,
    pub license_type: String,
}

/// One inventory update about to run.
#[derive(Debug)]
pub struct InventoryUpdate {
    pub id: u64,
    pub source_id: u64,
    pub source: SourceDefinition,
    pub credential: Option<Credential>,
    pub opts: UpdateOpts,
}

/// A materialized update, ready to execute. Dropping it removes the
/// private data directory.
#[derive(Debug)]
pub struct PreparedUpdate {
    pub dir: PrivateDataDir,
    pub env: BTreeMap<String, String>,
    pub program: String,
    pub args: Vec<String>,
    pub mode: ExecutionMode,
    pub injection: InjectionResult,
}

/// Where the bundled contrib scripts live when `--scripts-dir` is not
/// given.
pub fn default_scripts_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("invrun").join("inventory-scripts"))
        .unwrap_or_else(|| PathBuf::from("/usr/share/invrun/inventory-scripts"))
}

fn select_mode(policy: ModePolicy, injector: &dyn Injector) -> ExecutionMode {
    match policy {
        ModePolicy::ScriptOnly => ExecutionMode::Script,
        ModePolicy::PluginRequired => ExecutionMode::Plugin,
        ModePolicy::PluginPreferred => {
            if injector.supports_plugin() {
                ExecutionMode::Plugin
            } else {
                ExecutionMode::Script
            }
        }
    }
}

impl InventoryUpdate {
    /// Builds and materializes everything the update needs, without
    /// spawning a process.
    pub fn prepare(&self) -> InjectResult<PreparedUpdate> {
        let kind = self.source.kind();
        let registry = InjectorRegistry::new();
        let injector = registry.get(kind).ok_or_else(|| {
            InjectError::schema("kind", format!("no injector for source kind '{}'", kind))
        })?;

        let resolved = vars::resolve(&self.source, self.credential.as_ref())?;
        let ctx = BuildContext {
            license_type: &self.opts.license_type,
        };
        let injection = match select_mode(self.opts.policy, injector.as_ref()) {
            ExecutionMode::Script => injector.build_script(&resolved, &ctx)?,
            ExecutionMode::Plugin => injector.build_plugin(&resolved, &ctx)?,
        };

        let dir = PrivateDataDir::materialize(&injection, self.id)?;

        let mut env = dir.resolve_env(&injection)?;
        for (key, value) in STANDARD_INVENTORY_UPDATE_ENV {
            env.insert(key.to_string(), value.to_string());
        }
        env.insert(
            "ANSIBLE_INVENTORY_ENABLED".to_string(),
            injection.mode.enabled_value().to_string(),
        );
        env.insert(
            "AWX_PRIVATE_DATA_DIR".to_string(),
            dir.path().display().to_string(),
        );
        env.insert("INVENTORY_SOURCE_ID".to_string(), self.source_id.to_string());
        env.insert("INVENTORY_UPDATE_ID".to_string(), self.id.to_string());

        let input_path = match &injection.input {
            InventoryInput::Script(name) => self
                .opts
                .scripts_dir
                .clone()
                .unwrap_or_else(default_scripts_dir)
                .join(name),
            InventoryInput::Plugin(logical) => dir
                .alias_path(logical)
                .ok_or_else(|| {
                    InjectError::DirectoryConstruction(format!(
                        "plugin config '{}' was not materialized",
                        logical
                    ))
                })?
                .to_path_buf(),
        };

        let mut args = vec![
            "-i".to_string(),
            input_path.display().to_string(),
            "--list".to_string(),
            "--export".to_string(),
        ];
        args.extend(injection.args.iter().cloned());

        let mode = injection.mode;
        Ok(PreparedUpdate {
            dir,
            env,
            program: "ansible-inventory".to_string(),
            args,
            mode,
            injection,
        })
    }

    /// Prepares and executes the update. The private data directory is
    /// removed before this returns, success or not.
    pub fn run(&self, runner: &dyn ProcessRunner) -> Result<RunResult> {
        let prepared = self.prepare()?;
        let request = RunRequest {
            program: prepared.program.clone(),
            args: prepared.args.clone(),
            env: prepared.env.clone(),
            working_dir: prepared.dir.path().to_path_buf(),
        };
        let result = runner.run(&request)?;
        drop(prepared);
        if !result.is_success() {
            bail!("Inventory update failed with return code {}", result.rc);
        }
        Ok(result)
    }
}

//! Injector contract and the artifact model it produces.
//!
//! An [`Injector`] turns resolved variables into an [`InjectionResult`], a
//! pure description of environment variables and files. Paths do not exist
//! at this stage; files reference each other through `{{ file:NAME }}`
//! tokens that the private data directory resolves when it materializes
//! the plan.

pub mod ini;
pub mod providers;
pub mod registry;

use std::collections::BTreeMap;

use crate::error::{InjectError, InjectResult};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

/// How `ansible-inventory` consumes the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Script,
    Plugin,
}

impl ExecutionMode {
    /// Value for `ANSIBLE_INVENTORY_ENABLED`.
    pub fn enabled_value(self) -> &'static str {
        match self {
            ExecutionMode::Script => "script",
            ExecutionMode::Plugin => "auto",
        }
    }
}

/// A planned environment variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvValue {
    /// Plain text, safe to print.
    Literal(String),
    /// Plain text that must be masked in human-facing output.
    Secret(String),
    /// Resolves to the absolute path of the named planned file.
    FileRef(String),
}

/// Content of a planned file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Text(String),
    Directory,
}

/// One planned file inside the private data directory.
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub logical: String,
    pub content: FileContent,
    pub secret: bool,
    pub unique_suffix: bool,
}

impl FileSpec {
    /// A plain text file with default permissions.
    pub fn text(logical: &str, content: String) -> Self {
        FileSpec {
            logical: logical.to_string(),
            content: FileContent::Text(content),
            secret: false,
            unique_suffix: false,
        }
    }

    /// A text file restricted to the owning user.
    pub fn secret_text(logical: &str, content: String) -> Self {
        FileSpec {
            logical: logical.to_string(),
            content: FileContent::Text(content),
            secret: true,
            unique_suffix: false,
        }
    }

    /// An empty scratch directory with a randomized name suffix, so two
    /// updates of the same source never share cache state.
    pub fn cache_dir(logical: &str) -> Self {
        FileSpec {
            logical: logical.to_string(),
            content: FileContent::Directory,
            secret: false,
            unique_suffix: true,
        }
    }
}

/// What `ansible-inventory -i` is pointed at.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryInput {
    /// Name of a bundled contrib script, resolved against the scripts dir.
    Script(String),
    /// Logical name of a planned plugin config file.
    Plugin(String),
}

/// The full artifact plan for one update.
#[derive(Debug, Clone)]
pub struct InjectionResult {
    pub env: BTreeMap<String, EnvValue>,
    pub files: Vec<FileSpec>,
    pub mode: ExecutionMode,
    pub input: InventoryInput,
    pub args: Vec<String>,
}

impl InjectionResult {
    pub fn new(mode: ExecutionMode, input: InventoryInput) -> Self {
        InjectionResult {
            env: BTreeMap::new(),
            files: Vec::new(),
            mode,
            input,
            args: Vec::new(),
        }
    }

    pub fn add_env(&mut self, key: &str, value: EnvValue) {
        self.env.insert(key.to_string(), value);
    }

    pub fn add_file(&mut self, file: FileSpec) {
        self.files.push(file);
    }
}

/// Per-update knobs that are not part of the source definition.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub license_type: &'a str,
}

/// Builds injection plans for one source kind.
///
/// Implementations are pure: same inputs, same plan.
pub trait Injector: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fully qualified inventory plugin name, if the kind has one.
    fn plugin_name(&self) -> Option<&'static str> {
        None
    }

    fn supports_plugin(&self) -> bool {
        self.plugin_name().is_some()
    }

    fn build_script(
        &self,
        vars: &NormalizedVars,
        ctx: &BuildContext,
    ) -> InjectResult<InjectionResult>;

    fn build_plugin(
        &self,
        _vars: &NormalizedVars,
        _ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        Err(InjectError::UnsupportedMode(self.kind().name().to_string()))
    }
}

/// File name for a plugin config, derived from the last segment of the
/// plugin's fully qualified name.
pub fn plugin_file_name(plugin: &str) -> String {
    let short = plugin.rsplit('.').next().unwrap_or(plugin);
    format!("{}.yml", short)
}

/// Token a planned file uses to mention another planned file's path.
pub fn file_token(logical: &str) -> String {
    format!("{{{{ file:{} }}}}", logical)
}

pub(crate) fn ystr(value: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(value.to_string())
}

pub(crate) fn ybool(value: bool) -> serde_yaml::Value {
    serde_yaml::Value::Bool(value)
}

pub(crate) fn yseq(values: Vec<serde_yaml::Value>) -> serde_yaml::Value {
    serde_yaml::Value::Sequence(values)
}

pub(crate) fn ymap(entries: BTreeMap<String, String>) -> serde_yaml::Value {
    let mut map = serde_yaml::Mapping::new();
    for (key, value) in entries {
        map.insert(ystr(&key), ystr(&value));
    }
    serde_yaml::Value::Mapping(map)
}

/// Renders a sorted YAML document with a trailing newline.
pub(crate) fn render_yaml(doc: &BTreeMap<String, serde_yaml::Value>) -> InjectResult<String> {
    let text = serde_yaml::to_string(doc)
        .map_err(|e| InjectError::Serialization(e.to_string()))?;
    Ok(text)
}

//! Materialization of injection plans into private data directories.
//!
//! A [`PrivateDataDir`] is the on-disk form of an [`InjectionResult`]: a
//! temp directory named `awx_<update-id>_<random>` holding every planned
//! file. The directory is removed when the value drops unless [`keep`] is
//! called.
//!
//! [`keep`]: PrivateDataDir::keep

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{InjectError, InjectResult};
use crate::inject::{EnvValue, FileContent, InjectionResult, file_token};

/// A materialized private data directory.
///
/// Holds the temp dir guard; dropping this value deletes the directory
/// and everything in it, cache dirs included.
#[derive(Debug)]
pub struct PrivateDataDir {
    dir: Option<TempDir>,
    path: PathBuf,
    aliases: BTreeMap<String, PathBuf>,
}

fn dir_error(what: &str, err: std::io::Error) -> InjectError {
    InjectError::DirectoryConstruction(format!("{}: {}", what, err))
}

#[cfg(unix)]
fn create_secret(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_secret(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}

/// Replaces `{{ file:NAME }}` tokens with the allocated paths. A token
/// wrapped in single quotes loses them, so YAML scalars that were quoted
/// for the token's sake come out plain once a path is in place.
fn substitute_tokens(content: &str, aliases: &BTreeMap<String, PathBuf>) -> String {
    let mut out = content.to_string();
    for (logical, path) in aliases {
        let token = file_token(logical);
        let path_str = path.display().to_string();
        out = out.replace(&format!("'{}'", token), &path_str);
        out = out.replace(&token, &path_str);
    }
    out
}

impl PrivateDataDir {
    /// Creates the directory and writes every planned file into it.
    ///
    /// Runs in two passes: allocate every path first so that token
    /// substitution can see the whole alias map, then write the contents.
    pub fn materialize(injection: &InjectionResult, update_id: u64) -> InjectResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("awx_{}_", update_id))
            .tempdir()
            .map_err(|e| dir_error("creating root", e))?;
        let path = dir.path().to_path_buf();

        let mut aliases: BTreeMap<String, PathBuf> = BTreeMap::new();
        for file in &injection.files {
            if aliases.contains_key(&file.logical) {
                return Err(InjectError::DirectoryConstruction(format!(
                    "duplicate file name '{}'",
                    file.logical
                )));
            }
            let allocated = if file.unique_suffix {
                tempfile::Builder::new()
                    .prefix(&file.logical)
                    .tempdir_in(&path)
                    .map_err(|e| dir_error("allocating scratch dir", e))?
                    .into_path()
            } else {
                let target = path.join(&file.logical);
                if matches!(file.content, FileContent::Directory) {
                    fs::create_dir(&target)
                        .map_err(|e| dir_error("creating directory", e))?;
                }
                target
            };
            aliases.insert(file.logical.clone(), allocated);
        }

        for file in &injection.files {
            let FileContent::Text(raw) = &file.content else {
                continue;
            };
            let content = substitute_tokens(raw, &aliases);
            let target = &aliases[&file.logical];
            if file.secret {
                let mut handle =
                    create_secret(target).map_err(|e| dir_error("creating secret file", e))?;
                handle
                    .write_all(content.as_bytes())
                    .map_err(|e| dir_error("writing secret file", e))?;
            } else {
                fs::write(target, content).map_err(|e| dir_error("writing file", e))?;
            }
        }

        Ok(PrivateDataDir {
            dir: Some(dir),
            path,
            aliases,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Allocated path of a planned file.
    pub fn alias_path(&self, logical: &str) -> Option<&Path> {
        self.aliases.get(logical).map(PathBuf::as_path)
    }

    /// Resolves the planned environment to concrete strings, turning
    /// `FileRef` values into the paths allocated for them.
    pub fn resolve_env(
        &self,
        injection: &InjectionResult,
    ) -> InjectResult<BTreeMap<String, String>> {
        let mut env = BTreeMap::new();
        for (key, value) in &injection.env {
            let resolved = match value {
                EnvValue::Literal(v) | EnvValue::Secret(v) => v.clone(),
                EnvValue::FileRef(logical) => self
                    .alias_path(logical)
                    .ok_or_else(|| {
                        InjectError::DirectoryConstruction(format!(
                            "environment variable {} references unknown file '{}'",
                            key, logical
                        ))
                    })?
                    .display()
                    .to_string(),
            };
            env.insert(key.clone(), resolved);
        }
        Ok(env)
    }

    /// Disarms cleanup and returns the directory path.
    pub fn keep(mut self) -> PathBuf {
        match self.dir.take() {
            Some(dir) => dir.into_path(),
            None => self.path.clone(),
        }
    }
}

//! Reading and writing reference fixtures on disk.
//!
//! A fixture directory holds `env.json` plus a `files/` directory with one
//! file per canonical alias. Regenerating and comparing both go through
//! this layout.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::InjectResult;
use crate::verify::CanonicalForm;

/// Writes `form` out as a fixture directory, replacing prior contents of
/// `files/`.
pub fn write_reference(dir: &Path, form: &CanonicalForm) -> InjectResult<()> {
    let files_dir = dir.join("files");
    if files_dir.exists() {
        fs::remove_dir_all(&files_dir)?;
    }
    fs::create_dir_all(&files_dir)?;

    let mut env_json = serde_json::to_string_pretty(&form.env)?;
    env_json.push('\n');
    fs::write(dir.join("env.json"), env_json)?;

    for (alias, content) in &form.files {
        fs::write(files_dir.join(alias), content)?;
    }
    Ok(())
}

/// Reads a fixture directory back into `(env, files)` maps. A missing
/// directory reads as empty maps so a fresh checkout fails with a
/// comparison diff instead of an I/O error.
pub fn read_reference(dir: &Path) -> InjectResult<(BTreeMap<String, String>, BTreeMap<String, String>)> {
    let env_path = dir.join("env.json");
    let env = if env_path.exists() {
        serde_json::from_str(&fs::read_to_string(&env_path)?)?
    } else {
        BTreeMap::new()
    };

    let mut files = BTreeMap::new();
    let files_dir = dir.join("files");
    if files_dir.exists() {
        for entry in fs::read_dir(&files_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            files.insert(name, fs::read_to_string(entry.path())?);
        }
    }
    Ok((env, files))
}

use anyhow::Result;
use walkdir::WalkDir;

use crate::commands::UpdateParams;
use crate::inject::{EnvValue, ExecutionMode};
use crate::output;

pub struct PrepareCommand;

impl PrepareCommand {
    /// Execute the prepare command
    pub fn execute(params: &UpdateParams, keep: bool) -> Result<()> {
        let update = super::load_update(params)?;
        let prepared = update.prepare()?;

        let mode = match prepared.mode {
            ExecutionMode::Script => "script",
            ExecutionMode::Plugin => "plugin",
        };
        let command_line = std::iter::once(prepared.program.clone())
            .chain(prepared.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        output::section("Execution");
        output::key_value("Source", update.source.name());
        output::key_value("Mode", mode);
        output::key_value("Command", &command_line);

        output::section("Environment");
        for (key, value) in &prepared.env {
            // Secret values never reach the terminal.
            let shown = match prepared.injection.env.get(key) {
                Some(EnvValue::Secret(_)) => "***",
                _ => value.as_str(),
            };
            output::key_value(key, shown);
        }

        output::section("Files");
        let root = prepared.dir.path().to_path_buf();
        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry.path().strip_prefix(&root)?.to_path_buf();
            if entry.file_type().is_dir() {
                output::path(&format!("{}/", rel.display()));
            } else {
                output::path(&rel.display().to_string());
            }
        }

        output::blank();
        if keep {
            let kept = prepared.dir.keep();
            output::info(&format!(
                "Private data directory kept at {}",
                kept.display()
            ));
        } else {
            output::dimmed("Private data directory removed, pass --keep to retain it");
        }
        Ok(())
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::commands::UpdateParams;
use crate::output;
use crate::runner::RealProcessRunner;

pub struct RunCommand;

impl RunCommand {
    /// Execute the run command
    pub fn execute(params: &UpdateParams) -> Result<()> {
        let update = super::load_update(params)?;

        output::section("Inventory update");
        output::key_value("Source", update.source.name());
        output::key_value("Kind", update.source.kind().name());
        output::key_value("Update id", &update.id.to_string());

        // Ctrl-C flips the flag; the runner kills the child and bails.
        let cancel = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to install interrupt handler")?;

        output::blank();
        let runner = RealProcessRunner::new(cancel);
        let result = update.run(&runner)?;

        output::blank();
        output::success(&format!(
            "Inventory update finished with return code {}",
            result.rc
        ));
        Ok(())
    }
}

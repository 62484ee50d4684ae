use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use invrun::commands::{PrepareCommand, ProvidersCommand, RunCommand, UpdateParams};

#[derive(Parser)]
#[command(name = "invrun")]
#[command(about = "Prepare and run cloud inventory source updates", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UpdateArgs {
    /// Path to the source definition file (YAML)
    source: PathBuf,

    /// Path to a credential file (YAML)
    #[arg(short, long)]
    credential: Option<PathBuf>,

    /// Execution mode: auto, script or plugin
    #[arg(short, long, default_value = "auto")]
    mode: String,

    /// Directory holding the legacy inventory scripts
    #[arg(long, env = "INVRUN_SCRIPTS_DIR")]
    scripts_dir: Option<PathBuf>,

    /// Identifier for this update run
    #[arg(long, default_value_t = 1)]
    update_id: u64,

    /// Identifier of the inventory source
    #[arg(long, default_value_t = 1)]
    source_id: u64,

    /// License type reported to remote inventory sources
    #[arg(long, default_value = "open")]
    license_type: String,
}

impl UpdateArgs {
    fn params(&self) -> UpdateParams<'_> {
        UpdateParams {
            source: &self.source,
            credential: self.credential.as_deref(),
            mode: &self.mode,
            scripts_dir: self.scripts_dir.as_deref(),
            update_id: self.update_id,
            source_id: self.source_id,
            license_type: &self.license_type,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run an inventory update end to end
    Run {
        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Materialize an update without running it and show the result
    Prepare {
        #[command(flatten)]
        update: UpdateArgs,

        /// Keep the private data directory instead of removing it
        #[arg(long)]
        keep: bool,
    },

    /// List the supported inventory providers
    Providers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { update } => {
            RunCommand::execute(&update.params())?;
        }
        Commands::Prepare { update, keep } => {
            PrepareCommand::execute(&update.params(), keep)?;
        }
        Commands::Providers => {
            ProvidersCommand::execute()?;
        }
    }

    Ok(())
}

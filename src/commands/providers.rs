use anyhow::Result;

use crate::inject::registry::InjectorRegistry;
use crate::output;
use crate::source::SourceKind;

pub struct ProvidersCommand;

impl ProvidersCommand {
    /// Execute the providers command
    pub fn execute() -> Result<()> {
        let registry = InjectorRegistry::new();

        output::section("Inventory providers");
        output::table_header(&["source", "script", "plugin"]);
        for kind in SourceKind::ALL {
            if let Some(injector) = registry.get(kind) {
                let plugin = injector.plugin_name().unwrap_or("-");
                output::table_row(&[kind.name(), kind.script_file(), plugin]);
            }
        }
        output::blank();
        Ok(())
    }
}

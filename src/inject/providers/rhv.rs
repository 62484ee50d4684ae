//! Red Hat Virtualization (oVirt) injector.

use std::collections::BTreeMap;

use super::required_input;
use crate::error::InjectResult;
use crate::inject::ini::IniFile;
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    plugin_file_name, render_yaml, ybool, ymap, ystr,
};
use crate::source::SourceKind;
use crate::vars::{NormalizedVars, VarValue};

const PLUGIN_NAME: &str = "ovirt.ovirt.ovirt";
const INI_LOGICAL: &str = "ovirt.ini";

pub struct RhvInjector;

impl Injector for RhvInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::Rhv
    }

    fn plugin_name(&self) -> Option<&'static str> {
        Some(PLUGIN_NAME)
    }

    fn build_script(
        &self,
        vars: &NormalizedVars,
        _ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        let mut result = InjectionResult::new(
            ExecutionMode::Script,
            InventoryInput::Script(self.kind().script_file().to_string()),
        );

        let mut ini = IniFile::new();
        ini.set_options("ovirt", vars.options());
        ini.set("ovirt", "ovirt_url", required_input(vars, "host")?);
        ini.set("ovirt", "ovirt_username", required_input(vars, "username")?);
        ini.set("ovirt", "ovirt_password", required_input(vars, "password")?);
        if let Some(ca_file) = vars.cred_text("ca_file") {
            ini.set("ovirt", "ovirt_ca_file", ca_file);
        }

        result.add_file(FileSpec::secret_text(INI_LOGICAL, ini.render()));
        result.add_env("OVIRT_INI_PATH", EnvValue::FileRef(INI_LOGICAL.to_string()));
        Ok(result)
    }

    fn build_plugin(
        &self,
        vars: &NormalizedVars,
        _ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        let file_name = plugin_file_name(PLUGIN_NAME);
        let mut result = InjectionResult::new(
            ExecutionMode::Plugin,
            InventoryInput::Plugin(file_name.clone()),
        );

        // The ovirt plugin accepts its whole option set as top-level keys,
        // so options pass through untouched, mappings included.
        let mut doc: BTreeMap<String, serde_yaml::Value> = BTreeMap::new();
        doc.insert("plugin".to_string(), ystr(PLUGIN_NAME));
        for (key, value) in vars.options() {
            let rendered = match value {
                VarValue::Str(s) => ystr(s),
                VarValue::Bool(b) => ybool(*b),
                VarValue::Map(m) => ymap(m.clone()),
            };
            doc.insert(key.clone(), rendered);
        }

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        result.add_env(
            "OVIRT_URL",
            EnvValue::Literal(required_input(vars, "host")?.to_string()),
        );
        result.add_env(
            "OVIRT_USERNAME",
            EnvValue::Literal(required_input(vars, "username")?.to_string()),
        );
        result.add_env(
            "OVIRT_PASSWORD",
            EnvValue::Secret(required_input(vars, "password")?.to_string()),
        );
        if let Some(ca_file) = vars.cred_text("ca_file") {
            result.add_env("OVIRT_CAFILE", EnvValue::Literal(ca_file.to_string()));
        }
        Ok(result)
    }
}

//! VMware vCenter injector.
//!
//! Script mode only. The typed `instance_filters` and `group_by` fields are
//! folded into the script's `host_filters` and `groupby_patterns` options,
//! typed value first.

use super::required_input;
use crate::error::InjectResult;
use crate::inject::ini::{IniFile, ini_value};
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const INI_LOGICAL: &str = "vmware.ini";

fn joined(typed: Option<String>, option: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(value) = typed {
        if !value.is_empty() {
            parts.push(value);
        }
    }
    if let Some(value) = option {
        if !value.is_empty() {
            parts.push(value.to_string());
        }
    }
    if parts.is_empty() { None } else { Some(parts.join(",")) }
}

pub struct VmwareInjector;

impl Injector for VmwareInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::Vmware
    }

    fn build_script(
        &self,
        vars: &NormalizedVars,
        _ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        let host = required_input(vars, "host")?;
        let username = required_input(vars, "username")?;
        let password = required_input(vars, "password")?;

        let mut result = InjectionResult::new(
            ExecutionMode::Script,
            InventoryInput::Script(self.kind().script_file().to_string()),
        );

        let mut ini = IniFile::new();
        ini.set_options("vmware", vars.options());
        if let Some(filters) = joined(
            vars.instance_filters().map(str::to_string),
            vars.option_str("host_filters"),
        ) {
            ini.set("vmware", "host_filters", filters);
        }
        let patterns = if vars.group_by().is_empty() {
            None
        } else {
            Some(vars.group_by().join(","))
        };
        if let Some(patterns) = joined(patterns, vars.option_str("groupby_patterns")) {
            ini.set("vmware", "groupby_patterns", patterns);
        }
        ini.set("vmware", "server", host);
        ini.set("vmware", "username", username);
        ini.set("vmware", "password", password);

        result.add_file(FileSpec::secret_text(INI_LOGICAL, ini.render()));
        result.add_env("VMWARE_INI_PATH", EnvValue::FileRef(INI_LOGICAL.to_string()));
        result.add_env("VMWARE_HOST", EnvValue::Literal(host.to_string()));
        result.add_env("VMWARE_USER", EnvValue::Literal(username.to_string()));
        let validate = vars
            .options()
            .get("validate_certs")
            .and_then(ini_value)
            .unwrap_or_else(|| "False".to_string());
        result.add_env("VMWARE_VALIDATE_CERTS", EnvValue::Literal(validate));
        Ok(result)
    }
}

//! Ansible Tower injector, for syncing an inventory from another Tower.

use super::required_input;
use crate::error::{InjectError, InjectResult};
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    plugin_file_name, render_yaml, ybool, ystr,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;
use std::collections::BTreeMap;

const PLUGIN_NAME: &str = "awx.awx.tower";
const PASSWORD_LOGICAL: &str = "tower_password";

fn inventory_id(vars: &NormalizedVars) -> InjectResult<u64> {
    vars.inventory_id().ok_or_else(|| {
        InjectError::schema(
            "instance_filters",
            "tower sources must name the remote inventory id",
        )
    })
}

fn verify_ssl_value(vars: &NormalizedVars) -> &'static str {
    if vars.cred_bool("verify_ssl").unwrap_or(false) {
        "True"
    } else {
        "False"
    }
}

fn add_common_env(
    result: &mut InjectionResult,
    vars: &NormalizedVars,
    ctx: &BuildContext,
) -> InjectResult<()> {
    result.add_env(
        "TOWER_HOST",
        EnvValue::Literal(required_input(vars, "host")?.to_string()),
    );
    result.add_env(
        "TOWER_USERNAME",
        EnvValue::Literal(required_input(vars, "username")?.to_string()),
    );
    result.add_env(
        "TOWER_VERIFY_SSL",
        EnvValue::Literal(verify_ssl_value(vars).to_string()),
    );
    result.add_env(
        "TOWER_LICENSE_TYPE",
        EnvValue::Literal(ctx.license_type.to_string()),
    );
    Ok(())
}

pub struct TowerInjector;

impl Injector for TowerInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::Tower
    }

    fn plugin_name(&self) -> Option<&'static str> {
        Some(PLUGIN_NAME)
    }

    fn build_script(
        &self,
        vars: &NormalizedVars,
        ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        let mut result = InjectionResult::new(
            ExecutionMode::Script,
            InventoryInput::Script(self.kind().script_file().to_string()),
        );

        // The script reads the password from a file to keep it out of the
        // environment. No trailing newline, the content is the password.
        result.add_file(FileSpec::secret_text(
            PASSWORD_LOGICAL,
            required_input(vars, "password")?.to_string(),
        ));
        result.add_env(
            "TOWER_PASSWORD_FILE",
            EnvValue::FileRef(PASSWORD_LOGICAL.to_string()),
        );
        result.add_env(
            "TOWER_INVENTORY",
            EnvValue::Literal(inventory_id(vars)?.to_string()),
        );
        add_common_env(&mut result, vars, ctx)?;
        Ok(result)
    }

    fn build_plugin(
        &self,
        vars: &NormalizedVars,
        ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        let file_name = plugin_file_name(PLUGIN_NAME);
        let mut result = InjectionResult::new(
            ExecutionMode::Plugin,
            InventoryInput::Plugin(file_name.clone()),
        );

        let mut doc: BTreeMap<String, serde_yaml::Value> = BTreeMap::new();
        doc.insert("plugin".to_string(), ystr(PLUGIN_NAME));
        doc.insert(
            "inventory_id".to_string(),
            serde_yaml::Value::Number(inventory_id(vars)?.into()),
        );
        doc.insert("include_metadata".to_string(), ybool(true));

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        result.add_env(
            "TOWER_PASSWORD",
            EnvValue::Secret(required_input(vars, "password")?.to_string()),
        );
        add_common_env(&mut result, vars, ctx)?;
        Ok(result)
    }
}

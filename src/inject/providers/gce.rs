//! Google Compute Engine injector.

use std::collections::BTreeMap;

use super::required_input;
use crate::error::{InjectError, InjectResult};
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    file_token, plugin_file_name, render_yaml, yseq, ystr,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const PLUGIN_NAME: &str = "google.cloud.gcp_compute";
const CREDENTIALS_LOGICAL: &str = "gce_credentials.json";

/// Service account document in the layout the Google SDKs load.
fn credentials_json(vars: &NormalizedVars) -> InjectResult<String> {
    let mut doc = BTreeMap::new();
    doc.insert("type", "service_account");
    doc.insert("client_email", required_input(vars, "username")?);
    doc.insert("project_id", required_input(vars, "project")?);
    doc.insert("private_key", required_input(vars, "ssh_key_data")?);
    let rendered = serde_json::to_string_pretty(&doc)
        .map_err(|e| InjectError::Serialization(e.to_string()))?;
    Ok(format!("{}\n", rendered))
}

pub struct GceInjector;

impl Injector for GceInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::Gce
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
        result.add_file(FileSpec::secret_text(CREDENTIALS_LOGICAL, credentials_json(vars)?));
        result.add_env(
            "GCE_CREDENTIALS_FILE_PATH",
            EnvValue::FileRef(CREDENTIALS_LOGICAL.to_string()),
        );
        result.add_env(
            "GCE_EMAIL",
            EnvValue::Literal(required_input(vars, "username")?.to_string()),
        );
        result.add_env(
            "GCE_PROJECT",
            EnvValue::Literal(required_input(vars, "project")?.to_string()),
        );
        // The script treats an empty zone list as "all zones", but the key
        // itself must exist either way.
        result.add_env("GCE_ZONE", EnvValue::Literal(vars.regions_csv()));
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

        let mut doc: BTreeMap<String, serde_yaml::Value> = BTreeMap::new();
        doc.insert("plugin".to_string(), ystr(PLUGIN_NAME));
        doc.insert("auth_kind".to_string(), ystr("serviceaccount"));
        doc.insert(
            "projects".to_string(),
            yseq(vec![ystr(required_input(vars, "project")?)]),
        );
        doc.insert(
            "service_account_file".to_string(),
            ystr(&file_token(CREDENTIALS_LOGICAL)),
        );
        if !vars.regions().is_empty() {
            let zones = vars.regions().iter().map(|z| ystr(z)).collect();
            doc.insert("zones".to_string(), yseq(zones));
        }

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        result.add_file(FileSpec::secret_text(CREDENTIALS_LOGICAL, credentials_json(vars)?));
        result.add_env("GCE_ZONE", EnvValue::Literal(vars.regions_csv()));
        Ok(result)
    }
}

//! Microsoft Azure Resource Manager injector.

use std::collections::BTreeMap;

use super::required_input;
use crate::error::InjectResult;
use crate::inject::ini::IniFile;
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    plugin_file_name, render_yaml, ybool, ymap, yseq, ystr,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const PLUGIN_NAME: &str = "azure.azcollection.azure_rm";
const INI_LOGICAL: &str = "azure_rm.ini";

/// Credential inputs and the `[credentials]` keys the legacy script reads
/// them from.
const CREDENTIAL_INI_KEYS: &[(&str, &str)] = &[
    ("username", "ad_user"),
    ("client", "client_id"),
    ("cloud_environment", "cloud_environment"),
    ("password", "password"),
    ("secret", "secret"),
    ("subscription", "subscription_id"),
    ("tenant", "tenant"),
];

/// Non-secret credential inputs exported as identity environment variables
/// in both modes.
const IDENTITY_ENV: &[(&str, &str)] = &[
    ("subscription", "AZURE_SUBSCRIPTION_ID"),
    ("client", "AZURE_CLIENT_ID"),
    ("tenant", "AZURE_TENANT"),
    ("username", "AZURE_AD_USER"),
    ("cloud_environment", "AZURE_CLOUD_ENVIRONMENT"),
];

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{}'", i)).collect();
    format!("[{}]", quoted.join(", "))
}

fn csv_items(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect()
}

fn add_identity_env(result: &mut InjectionResult, vars: &NormalizedVars) {
    for (input, env_var) in IDENTITY_ENV {
        if let Some(value) = vars.cred_text(input) {
            result.add_env(env_var, EnvValue::Literal(value.to_string()));
        }
    }
}

pub struct AzureRmInjector;

impl Injector for AzureRmInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::AzureRm
    }

    fn plugin_name(&self) -> Option<&'static str> {
        Some(PLUGIN_NAME)
    }

    fn build_script(
        &self,
        vars: &NormalizedVars,
        _ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        required_input(vars, "subscription")?;
        let mut result = InjectionResult::new(
            ExecutionMode::Script,
            InventoryInput::Script(self.kind().script_file().to_string()),
        );

        let mut ini = IniFile::new();
        ini.set_options("azure", vars.options());
        if !vars.regions().is_empty() {
            ini.set("azure", "locations", vars.regions_csv());
        }
        for (input, key) in CREDENTIAL_INI_KEYS {
            if let Some(value) = vars.cred_text(input) {
                ini.set("credentials", key, value);
            }
        }

        // The [credentials] section carries the client secret, so the whole
        // file is owner-only.
        result.add_file(FileSpec::secret_text(INI_LOGICAL, ini.render()));
        result.add_env("AZURE_INI_PATH", EnvValue::FileRef(INI_LOGICAL.to_string()));
        add_identity_env(&mut result, vars);
        Ok(result)
    }

    fn build_plugin(
        &self,
        vars: &NormalizedVars,
        _ctx: &BuildContext,
    ) -> InjectResult<InjectionResult> {
        required_input(vars, "subscription")?;
        let file_name = plugin_file_name(PLUGIN_NAME);
        let mut result = InjectionResult::new(
            ExecutionMode::Plugin,
            InventoryInput::Plugin(file_name.clone()),
        );

        let mut doc: BTreeMap<String, serde_yaml::Value> = BTreeMap::new();
        doc.insert("plugin".to_string(), ystr(PLUGIN_NAME));
        doc.insert("default_host_filters".to_string(), yseq(Vec::new()));

        let mut excludes = Vec::new();
        if let Some(groups) = vars.option_str("resource_groups") {
            let items = csv_items(groups);
            if !items.is_empty() {
                excludes.push(ystr(&format!(
                    "resource_group not in {}",
                    quoted_list(&items)
                )));
            }
        }
        if !vars.regions().is_empty() {
            excludes.push(ystr(&format!(
                "location not in {}",
                quoted_list(vars.regions())
            )));
        }
        doc.insert("exclude_host_filters".to_string(), yseq(excludes));

        if vars.option_bool("use_private_ip", false) {
            let mut expressions = BTreeMap::new();
            expressions.insert(
                "ansible_host".to_string(),
                "private_ipv4_addresses | first".to_string(),
            );
            doc.insert("hostvar_expressions".to_string(), ymap(expressions));
        }

        if let Some(tags) = vars.option_str("tags") {
            let groups: Vec<serde_yaml::Value> = csv_items(tags)
                .iter()
                .map(|term| {
                    let key = term.split(':').next().unwrap_or(term);
                    let mut map = serde_yaml::Mapping::new();
                    map.insert(ystr("key"), ystr(&format!("tags.{}", key)));
                    map.insert(ystr("prefix"), ystr(""));
                    map.insert(ystr("separator"), ystr(""));
                    serde_yaml::Value::Mapping(map)
                })
                .collect();
            if !groups.is_empty() {
                doc.insert("keyed_groups".to_string(), yseq(groups));
            }
        }

        doc.insert("plain_host_names".to_string(), ybool(true));

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        add_identity_env(&mut result, vars);
        if let Some(password) = vars.cred_text("password") {
            result.add_env("AZURE_PASSWORD", EnvValue::Secret(password.to_string()));
        }
        if let Some(secret) = vars.cred_text("secret") {
            result.add_env("AZURE_SECRET", EnvValue::Secret(secret.to_string()));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Credential;
    use crate::source::SourceDefinition;
    use crate::vars::resolve;
    use serde_json::json;

    fn azure_vars(vars: BTreeMap<String, serde_json::Value>, regions: Option<&str>) -> NormalizedVars {
        let mut inputs = BTreeMap::new();
        inputs.insert("subscription".to_string(), json!("sub-1"));
        inputs.insert("client".to_string(), json!("client-1"));
        inputs.insert("secret".to_string(), json!("shhh"));
        inputs.insert("tenant".to_string(), json!("tenant-1"));
        let cred = Credential::new("azure_rm", inputs).unwrap();
        let mut source = SourceDefinition::new("az", SourceKind::AzureRm).with_vars(vars);
        if let Some(regions) = regions {
            source = source.with_regions(regions).unwrap();
        }
        resolve(&source, Some(&cred)).unwrap()
    }

    #[test]
    fn test_quoted_list() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(quoted_list(&items), "['a', 'b']");
    }

    #[test]
    fn test_script_secrets_stay_out_of_env() {
        let vars = azure_vars(BTreeMap::new(), None);
        let ctx = BuildContext { license_type: "open" };
        let result = AzureRmInjector.build_script(&vars, &ctx).unwrap();
        assert!(!result.env.contains_key("AZURE_SECRET"));
        assert!(!result.env.contains_key("AZURE_PASSWORD"));
        assert_eq!(
            result.env.get("AZURE_SUBSCRIPTION_ID"),
            Some(&EnvValue::Literal("sub-1".to_string()))
        );
        let ini = &result.files[0];
        assert!(ini.secret);
        match &ini.content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("[credentials]\n"));
                assert!(text.contains("secret = shhh\n"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_plugin_exclude_filters() {
        let mut source_vars = BTreeMap::new();
        source_vars.insert("resource_groups".to_string(), json!("rg1,rg2"));
        let vars = azure_vars(source_vars, Some("eastus,westus"));
        let ctx = BuildContext { license_type: "open" };
        let result = AzureRmInjector.build_plugin(&vars, &ctx).unwrap();
        match &result.files[0].content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("- resource_group not in ['rg1', 'rg2']\n"));
                assert!(text.contains("- location not in ['eastus', 'westus']\n"));
                assert!(text.contains("default_host_filters: []\n"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_plugin_secret_env_fallback() {
        let vars = azure_vars(BTreeMap::new(), None);
        let ctx = BuildContext { license_type: "open" };
        let result = AzureRmInjector.build_plugin(&vars, &ctx).unwrap();
        assert_eq!(
            result.env.get("AZURE_SECRET"),
            Some(&EnvValue::Secret("shhh".to_string()))
        );
        assert!(!result.env.contains_key("AZURE_PASSWORD"));
    }

    #[test]
    fn test_tag_keyed_groups() {
        let mut source_vars = BTreeMap::new();
        source_vars.insert("tags".to_string(), json!("Creator:jm, team"));
        let vars = azure_vars(source_vars, None);
        let ctx = BuildContext { license_type: "open" };
        let result = AzureRmInjector.build_plugin(&vars, &ctx).unwrap();
        match &result.files[0].content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("- key: tags.Creator\n"));
                assert!(text.contains("- key: tags.team\n"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }
}

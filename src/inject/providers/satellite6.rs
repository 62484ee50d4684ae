//! Red Hat Satellite 6 (Foreman) injector.
//!
//! Options prefixed `satellite6_` configure the script's `[ansible]`
//! section with the prefix stripped; everything else lands in `[foreman]`.

use std::collections::BTreeMap;

use super::required_input;
use crate::error::InjectResult;
use crate::inject::ini::{IniFile, ini_value};
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    plugin_file_name, render_yaml, ybool, ystr,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const PLUGIN_NAME: &str = "theforeman.foreman.foreman";
const INI_LOGICAL: &str = "foreman.ini";

const DEFAULT_GROUP_PREFIX: &str = "foreman_";

pub struct Satellite6Injector;

impl Injector for Satellite6Injector {
    fn kind(&self) -> SourceKind {
        SourceKind::Satellite6
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
        ini.set("ansible", "group_patterns", "[]");
        ini.set("ansible", "group_prefix", DEFAULT_GROUP_PREFIX);
        ini.set("ansible", "want_facts", "True");
        ini.set("ansible", "want_hostcollections", "False");
        ini.set("cache", "path", "/tmp");
        ini.set("cache", "scan_new_hosts", "True");
        ini.set("foreman", "ssl_verify", "False");
        for (key, value) in vars.options() {
            let Some(rendered) = ini_value(value) else {
                continue;
            };
            match key.strip_prefix("satellite6_") {
                Some(stripped) => ini.set("ansible", stripped, rendered),
                None => ini.set("foreman", key, rendered),
            }
        }
        ini.set("foreman", "url", required_input(vars, "host")?);
        ini.set("foreman", "user", required_input(vars, "username")?);
        ini.set("foreman", "password", required_input(vars, "password")?);

        result.add_file(FileSpec::secret_text(INI_LOGICAL, ini.render()));
        result.add_env("FOREMAN_INI_PATH", EnvValue::FileRef(INI_LOGICAL.to_string()));
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
        doc.insert(
            "group_prefix".to_string(),
            ystr(vars
                .option_str("satellite6_group_prefix")
                .unwrap_or(DEFAULT_GROUP_PREFIX)),
        );
        doc.insert(
            "want_facts".to_string(),
            ybool(vars.option_bool("satellite6_want_facts", true)),
        );
        doc.insert(
            "want_hostcollections".to_string(),
            ybool(vars.option_bool("satellite6_want_hostcollections", false)),
        );

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        result.add_env(
            "FOREMAN_SERVER",
            EnvValue::Literal(required_input(vars, "host")?.to_string()),
        );
        result.add_env(
            "FOREMAN_USER",
            EnvValue::Literal(required_input(vars, "username")?.to_string()),
        );
        result.add_env(
            "FOREMAN_PASSWORD",
            EnvValue::Secret(required_input(vars, "password")?.to_string()),
        );
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

    fn satellite_vars(source_vars: BTreeMap<String, serde_json::Value>) -> NormalizedVars {
        let mut inputs = BTreeMap::new();
        inputs.insert("host".to_string(), json!("https://satellite.example.org"));
        inputs.insert("username".to_string(), json!("admin"));
        inputs.insert("password".to_string(), json!("shhh"));
        let cred = Credential::new("satellite6", inputs).unwrap();
        let source = SourceDefinition::new("sat", SourceKind::Satellite6).with_vars(source_vars);
        resolve(&source, Some(&cred)).unwrap()
    }

    #[test]
    fn test_prefix_routing() {
        let mut source_vars = BTreeMap::new();
        source_vars.insert("satellite6_group_prefix".to_string(), json!("custom_"));
        source_vars.insert("satellite6_want_ansible_ssh_host".to_string(), json!(true));
        source_vars.insert("extra".to_string(), json!("stays"));
        let vars = satellite_vars(source_vars);
        let ctx = BuildContext { license_type: "open" };
        let result = Satellite6Injector.build_script(&vars, &ctx).unwrap();
        match &result.files[0].content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("[ansible]\n"));
                assert!(text.contains("group_prefix = custom_\n"));
                assert!(text.contains("want_ansible_ssh_host = True\n"));
                assert!(text.contains("\n[foreman]\nextra = stays\n"));
                assert!(!text.contains("satellite6_"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_script_section_defaults() {
        let vars = satellite_vars(BTreeMap::new());
        let ctx = BuildContext { license_type: "open" };
        let result = Satellite6Injector.build_script(&vars, &ctx).unwrap();
        match &result.files[0].content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("group_patterns = []\n"));
                assert!(text.contains("[cache]\npath = /tmp\nscan_new_hosts = True\n"));
                assert!(text.contains("ssl_verify = False\n"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_plugin_defaults_and_env() {
        let vars = satellite_vars(BTreeMap::new());
        let ctx = BuildContext { license_type: "open" };
        let result = Satellite6Injector.build_plugin(&vars, &ctx).unwrap();
        match &result.files[0].content {
            crate::inject::FileContent::Text(text) => {
                assert_eq!(
                    text,
                    "group_prefix: foreman_\nplugin: theforeman.foreman.foreman\nwant_facts: true\nwant_hostcollections: false\n"
                );
            }
            other => panic!("unexpected content {:?}", other),
        }
        assert_eq!(
            result.env.get("FOREMAN_PASSWORD"),
            Some(&EnvValue::Secret("shhh".to_string()))
        );
    }
}

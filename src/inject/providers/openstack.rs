//! OpenStack injector.
//!
//! Both modes hand the connection details to the SDK through a `clouds.yml`
//! with a single `devstack` cloud entry; plugin mode adds the inventory
//! plugin config on top.

use std::collections::BTreeMap;

use super::required_input;
use crate::error::InjectResult;
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    plugin_file_name, render_yaml, ybool, ystr,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const PLUGIN_NAME: &str = "openstack.cloud.openstack";
const CLOUDS_LOGICAL: &str = "clouds.yml";

fn ynested(map: BTreeMap<String, serde_yaml::Value>) -> serde_yaml::Value {
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in map {
        out.insert(ystr(&key), value);
    }
    serde_yaml::Value::Mapping(out)
}

fn clouds_yaml(vars: &NormalizedVars) -> InjectResult<String> {
    let mut ansible = BTreeMap::new();
    ansible.insert(
        "expand_hostvars".to_string(),
        ybool(vars.option_bool("expand_hostvars", false)),
    );
    ansible.insert(
        "fail_on_errors".to_string(),
        ybool(vars.option_bool("fail_on_errors", true)),
    );
    ansible.insert(
        "use_hostnames".to_string(),
        ybool(vars.option_bool("use_hostnames", true)),
    );

    let mut auth = BTreeMap::new();
    auth.insert("auth_url".to_string(), ystr(required_input(vars, "host")?));
    if let Some(domain) = vars.cred_text("domain") {
        auth.insert("domain_name".to_string(), ystr(domain));
    }
    auth.insert("password".to_string(), ystr(required_input(vars, "password")?));
    auth.insert(
        "project_name".to_string(),
        ystr(required_input(vars, "project")?),
    );
    auth.insert("username".to_string(), ystr(required_input(vars, "username")?));

    let mut devstack = BTreeMap::new();
    devstack.insert("auth".to_string(), ynested(auth));
    devstack.insert("private".to_string(), ybool(vars.option_bool("private", true)));
    devstack.insert(
        "verify".to_string(),
        ybool(vars.cred_bool("verify_ssl").unwrap_or(false)),
    );

    let mut clouds = BTreeMap::new();
    clouds.insert("devstack".to_string(), ynested(devstack));

    let mut doc = BTreeMap::new();
    doc.insert("ansible".to_string(), ynested(ansible));
    doc.insert("clouds".to_string(), ynested(clouds));
    render_yaml(&doc)
}

pub struct OpenstackInjector;

impl Injector for OpenstackInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::Openstack
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
        result.add_file(FileSpec::secret_text(CLOUDS_LOGICAL, clouds_yaml(vars)?));
        result.add_env(
            "OS_CLIENT_CONFIG_FILE",
            EnvValue::FileRef(CLOUDS_LOGICAL.to_string()),
        );
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
            "expand_hostvars".to_string(),
            ybool(vars.option_bool("expand_hostvars", false)),
        );
        doc.insert(
            "fail_on_errors".to_string(),
            ybool(vars.option_bool("fail_on_errors", true)),
        );
        doc.insert(
            "use_hostnames".to_string(),
            ybool(vars.option_bool("use_hostnames", true)),
        );

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        result.add_file(FileSpec::secret_text(CLOUDS_LOGICAL, clouds_yaml(vars)?));
        result.add_env(
            "OS_CLIENT_CONFIG_FILE",
            EnvValue::FileRef(CLOUDS_LOGICAL.to_string()),
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

    fn openstack_vars(source_vars: BTreeMap<String, serde_json::Value>) -> NormalizedVars {
        let mut inputs = BTreeMap::new();
        inputs.insert("host".to_string(), json!("https://keystone.example.org"));
        inputs.insert("username".to_string(), json!("admin"));
        inputs.insert("password".to_string(), json!("shhh"));
        inputs.insert("project".to_string(), json!("demo"));
        let cred = Credential::new("openstack", inputs).unwrap();
        let source = SourceDefinition::new("os", SourceKind::Openstack).with_vars(source_vars);
        resolve(&source, Some(&cred)).unwrap()
    }

    #[test]
    fn test_clouds_document_shape() {
        let text = clouds_yaml(&openstack_vars(BTreeMap::new())).unwrap();
        assert!(text.starts_with("ansible:\n"));
        assert!(text.contains("clouds:\n  devstack:\n    auth:\n"));
        assert!(text.contains("      auth_url: https://keystone.example.org\n"));
        assert!(text.contains("    private: true\n"));
        assert!(text.contains("    verify: false\n"));
        // No domain in the credential, no domain_name key.
        assert!(!text.contains("domain_name"));
    }

    #[test]
    fn test_option_overrides_reach_both_documents() {
        let mut source_vars = BTreeMap::new();
        source_vars.insert("use_hostnames".to_string(), json!(false));
        source_vars.insert("expand_hostvars".to_string(), json!(true));
        let vars = openstack_vars(source_vars);
        let ctx = BuildContext { license_type: "open" };
        let result = OpenstackInjector.build_plugin(&vars, &ctx).unwrap();
        match &result.files[0].content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("expand_hostvars: true\n"));
                assert!(text.contains("use_hostnames: false\n"));
                assert!(text.contains("plugin: openstack.cloud.openstack\n"));
            }
            other => panic!("unexpected content {:?}", other),
        }
        match &result.files[1].content {
            crate::inject::FileContent::Text(text) => {
                assert!(text.contains("  use_hostnames: false\n"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_script_env() {
        let vars = openstack_vars(BTreeMap::new());
        let ctx = BuildContext { license_type: "open" };
        let result = OpenstackInjector.build_script(&vars, &ctx).unwrap();
        assert_eq!(
            result.env.get("OS_CLIENT_CONFIG_FILE"),
            Some(&EnvValue::FileRef("clouds.yml".to_string()))
        );
        assert!(result.files[0].secret);
    }
}

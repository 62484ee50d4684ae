//! Merging of source variables, typed fields and credential inputs.
//!
//! [`resolve`] folds the three inputs of an update into a single
//! [`NormalizedVars`] value with fixed precedence: provider defaults are
//! overridden by `source_vars`, and the typed fields (`source_regions`,
//! `instance_filters`, `group_by`) always win over both. The result is a
//! plain value; nothing here touches the filesystem or the environment.

use std::collections::BTreeMap;

use crate::credential::Credential;
use crate::error::{InjectError, InjectResult};
use crate::inject::providers::ec2;
use crate::source::{SourceDefinition, SourceKind};

/// A normalized source variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Str(String),
    Bool(bool),
    Map(BTreeMap<String, String>),
}

/// The fully merged inputs for one injection run.
#[derive(Debug, Clone)]
pub struct NormalizedVars {
    kind: SourceKind,
    options: BTreeMap<String, VarValue>,
    regions: Vec<String>,
    instance_filters: Option<String>,
    group_by: Vec<String>,
    inventory_id: Option<u64>,
    credential: Option<Credential>,
}

impl NormalizedVars {
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn options(&self) -> &BTreeMap<String, VarValue> {
        &self.options
    }

    /// String value of an option, if set to one.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        match self.options.get(key) {
            Some(VarValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean value of an option. Falls back to `default` when the option
    /// is absent or not a boolean.
    pub fn option_bool(&self, key: &str, default: bool) -> bool {
        match self.options.get(key) {
            Some(VarValue::Bool(b)) => *b,
            _ => default,
        }
    }

    pub fn option_map(&self, key: &str) -> Option<&BTreeMap<String, String>> {
        match self.options.get(key) {
            Some(VarValue::Map(m)) => Some(m),
            _ => None,
        }
    }

    /// Region list after normalization. Empty means "all regions".
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn regions_csv(&self) -> String {
        self.regions.join(",")
    }

    pub fn instance_filters(&self) -> Option<&str> {
        self.instance_filters.as_deref()
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// Remote inventory id, only set for tower sources.
    pub fn inventory_id(&self) -> Option<u64> {
        self.inventory_id
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Text input of the linked credential, if any.
    pub fn cred_text(&self, id: &str) -> Option<&str> {
        self.credential.as_ref().and_then(|c| c.text(id))
    }

    /// Boolean input of the linked credential, if any.
    pub fn cred_bool(&self, id: &str) -> Option<bool> {
        self.credential.as_ref().and_then(|c| c.boolean(id))
    }
}

/// Merges a source definition and an optional credential into the inputs
/// an injector consumes.
pub fn resolve(
    source: &SourceDefinition,
    credential: Option<&Credential>,
) -> InjectResult<NormalizedVars> {
    let kind = source.kind();

    let credential = match credential {
        Some(cred) => {
            if cred.kind() != kind.credential_kind() {
                return Err(InjectError::schema(
                    "credential",
                    format!(
                        "source kind '{}' takes a '{}' credential, got '{}'",
                        kind,
                        kind.credential_kind(),
                        cred.kind()
                    ),
                ));
            }
            Some(cred.clone())
        }
        None => {
            if !kind.credential_optional() {
                return Err(InjectError::MissingCredential(kind.name().to_string()));
            }
            None
        }
    };

    let mut options = provider_defaults(kind);
    for (key, value) in source.source_vars() {
        options.insert(key.clone(), coerce_var(key, value)?);
    }

    let regions = split_regions(source.source_regions());
    let group_by = split_group_by(kind, source.group_by())?;

    let inventory_id = match kind {
        SourceKind::Tower => Some(parse_inventory_id(source.instance_filters())?),
        _ => None,
    };

    Ok(NormalizedVars {
        kind,
        options,
        regions,
        instance_filters: source.instance_filters().map(str::to_string),
        group_by,
        inventory_id,
        credential,
    })
}

/// Baseline options a provider assumes when `source_vars` does not
/// override them.
fn provider_defaults(kind: SourceKind) -> BTreeMap<String, VarValue> {
    let mut defaults = BTreeMap::new();
    let mut put_str = |key: &str, value: &str| {
        defaults.insert(key.to_string(), VarValue::Str(value.to_string()));
    };
    match kind {
        SourceKind::Ec2 => {
            put_str("cache_max_age", "300");
            put_str("destination_variable", "public_dns_name");
            put_str("regions_exclude", "us-gov-west-1,cn-north-1");
            put_str("vpc_destination_variable", "ip_address");
            for (key, value) in [
                ("all_instances", true),
                ("all_rds_instances", false),
                ("elasticache", false),
                ("include_rds_clusters", false),
                ("nested_groups", true),
                ("rds", false),
                ("route53", false),
                ("stack_filters", false),
            ] {
                defaults.insert(key.to_string(), VarValue::Bool(value));
            }
        }
        SourceKind::Vmware => {
            put_str("cache_max_age", "300");
            defaults.insert("validate_certs".to_string(), VarValue::Bool(false));
        }
        SourceKind::AzureRm => {
            put_str("include_powerstate", "yes");
            put_str("group_by_resource_group", "yes");
            put_str("group_by_location", "yes");
            put_str("group_by_tag", "yes");
        }
        SourceKind::Openstack => {
            for (key, value) in [
                ("private", true),
                ("use_hostnames", true),
                ("expand_hostvars", false),
                ("fail_on_errors", true),
            ] {
                defaults.insert(key.to_string(), VarValue::Bool(value));
            }
        }
        SourceKind::Cloudforms => {
            put_str("version", "2.4");
        }
        SourceKind::Rhv => {
            defaults.insert("ovirt_insecure".to_string(), VarValue::Bool(false));
        }
        SourceKind::Gce | SourceKind::Satellite6 | SourceKind::Tower => {}
    }
    defaults
}

fn coerce_var(key: &str, value: &serde_json::Value) -> InjectResult<VarValue> {
    match value {
        serde_json::Value::String(s) => Ok(VarValue::Str(s.clone())),
        serde_json::Value::Bool(b) => Ok(VarValue::Bool(*b)),
        serde_json::Value::Number(n) => Ok(VarValue::Str(n.to_string())),
        serde_json::Value::Object(map) => {
            let mut flat = BTreeMap::new();
            for (k, v) in map {
                match v {
                    serde_json::Value::String(s) => {
                        flat.insert(k.clone(), s.clone());
                    }
                    _ => {
                        return Err(InjectError::schema(
                            key,
                            format!("mapping member '{}' must be a string", k),
                        ));
                    }
                }
            }
            Ok(VarValue::Map(flat))
        }
        serde_json::Value::Array(_) => Err(InjectError::schema(
            key,
            "lists are not supported as source variable values",
        )),
        serde_json::Value::Null => Err(InjectError::schema(
            key,
            "null is not supported as a source variable value",
        )),
    }
}

/// Splits a region list. An entry of "all" (any case) clears the list,
/// which downstream code reads as "no region restriction".
fn split_regions(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let regions: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if regions.iter().any(|r| r.eq_ignore_ascii_case("all")) {
        return Vec::new();
    }
    regions
}

fn split_group_by(kind: SourceKind, raw: Option<&str>) -> InjectResult<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut choices = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if kind == SourceKind::Ec2 {
            let lowered = entry.to_lowercase();
            if !ec2::is_group_by_choice(&lowered) {
                return Err(InjectError::schema(
                    "group_by",
                    format!("'{}' is not a valid ec2 grouping choice", entry),
                ));
            }
            choices.push(lowered);
        } else {
            choices.push(entry.to_string());
        }
    }
    Ok(choices)
}

fn parse_inventory_id(raw: Option<&str>) -> InjectResult<u64> {
    let raw = raw.ok_or_else(|| {
        InjectError::schema(
            "instance_filters",
            "tower sources must name the remote inventory id",
        )
    })?;
    raw.trim().parse::<u64>().map_err(|_| {
        InjectError::schema(
            "instance_filters",
            format!("'{}' is not a numeric inventory id", raw),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vmware_credential() -> Credential {
        let mut inputs = BTreeMap::new();
        inputs.insert("host".to_string(), json!("https://vcenter.example.org"));
        inputs.insert("username".to_string(), json!("admin"));
        inputs.insert("password".to_string(), json!("shhh"));
        Credential::new("vmware", inputs).unwrap()
    }

    #[test]
    fn test_defaults_overridden_by_source_vars() {
        let mut vars = BTreeMap::new();
        vars.insert("cache_max_age".to_string(), json!(600));
        let source = SourceDefinition::new("vc", SourceKind::Vmware).with_vars(vars);
        let resolved = resolve(&source, Some(&vmware_credential())).unwrap();
        assert_eq!(resolved.option_str("cache_max_age"), Some("600"));
        assert!(!resolved.option_bool("validate_certs", true));
    }

    #[test]
    fn test_missing_credential() {
        let source = SourceDefinition::new("vc", SourceKind::Vmware);
        let err = resolve(&source, None).unwrap_err();
        assert!(matches!(err, InjectError::MissingCredential(_)));
    }

    #[test]
    fn test_ec2_credential_is_optional() {
        let source = SourceDefinition::new("aws", SourceKind::Ec2);
        let resolved = resolve(&source, None).unwrap();
        assert!(!resolved.has_credential());
    }

    #[test]
    fn test_credential_kind_mismatch() {
        let source = SourceDefinition::new("os", SourceKind::Openstack);
        let err = resolve(&source, Some(&vmware_credential())).unwrap_err();
        assert!(err.to_string().contains("takes a 'openstack' credential"));
    }

    #[test]
    fn test_region_all_clears_the_list() {
        let source = SourceDefinition::new("aws", SourceKind::Ec2)
            .with_regions("us-east-1, ALL ,eu-west-1")
            .unwrap();
        let resolved = resolve(&source, None).unwrap();
        assert!(resolved.regions().is_empty());
    }

    #[test]
    fn test_region_whitespace_trimmed() {
        let source = SourceDefinition::new("aws", SourceKind::Ec2)
            .with_regions(" us-east-1 ,, eu-west-1 ")
            .unwrap();
        let resolved = resolve(&source, None).unwrap();
        assert_eq!(resolved.regions(), ["us-east-1", "eu-west-1"]);
        assert_eq!(resolved.regions_csv(), "us-east-1,eu-west-1");
    }

    #[test]
    fn test_ec2_group_by_validated() {
        let source = SourceDefinition::new("aws", SourceKind::Ec2)
            .with_group_by("Region, tag_keys")
            .unwrap();
        let resolved = resolve(&source, None).unwrap();
        assert_eq!(resolved.group_by(), ["region", "tag_keys"]);

        let bad = SourceDefinition::new("aws", SourceKind::Ec2)
            .with_group_by("flavor")
            .unwrap();
        let err = resolve(&bad, None).unwrap_err();
        assert!(err.to_string().contains("flavor"));
    }

    #[test]
    fn test_vmware_group_by_kept_verbatim() {
        let source = SourceDefinition::new("vc", SourceKind::Vmware)
            .with_group_by("{{ config.GuestId }}")
            .unwrap();
        let resolved = resolve(&source, Some(&vmware_credential())).unwrap();
        assert_eq!(resolved.group_by(), ["{{ config.GuestId }}"]);
    }

    #[test]
    fn test_var_coercion_failures() {
        for bad in [json!([1, 2]), json!(null), json!({"a": 1})] {
            let mut vars = BTreeMap::new();
            vars.insert("extra".to_string(), bad);
            let source = SourceDefinition::new("vc", SourceKind::Vmware).with_vars(vars);
            let err = resolve(&source, Some(&vmware_credential())).unwrap_err();
            assert!(matches!(err, InjectError::SchemaViolation { .. }));
        }
    }

    #[test]
    fn test_tower_inventory_id() {
        let mut inputs = BTreeMap::new();
        inputs.insert("host".to_string(), json!("https://tower.example.org"));
        inputs.insert("username".to_string(), json!("admin"));
        inputs.insert("password".to_string(), json!("shhh"));
        let cred = Credential::new("tower", inputs).unwrap();

        let source = SourceDefinition::new("upstream", SourceKind::Tower)
            .with_instance_filters("42")
            .unwrap();
        let resolved = resolve(&source, Some(&cred)).unwrap();
        assert_eq!(resolved.inventory_id(), Some(42));

        let named = SourceDefinition::new("upstream", SourceKind::Tower)
            .with_instance_filters("Demo Inventory")
            .unwrap();
        let err = resolve(&named, Some(&cred)).unwrap_err();
        assert!(matches!(err, InjectError::SchemaViolation { .. }));

        let missing = SourceDefinition::new("upstream", SourceKind::Tower);
        let err = resolve(&missing, Some(&cred)).unwrap_err();
        assert!(matches!(err, InjectError::SchemaViolation { .. }));
    }
}

//! User-facing inventory source definitions.

use super::kind::SourceKind;
use crate::error::{InjectError, InjectResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// An inventory source: a provider kind plus its configuration.
///
/// The typed fields are validated against the kind's field-support table at
/// construction, so an `ec2`-only field never reaches an injector for a kind
/// that cannot honor it. The kind itself is fixed for the life of the value.
#[derive(Debug, Clone)]
pub struct SourceDefinition {
    name: String,
    kind: SourceKind,
    source_vars: BTreeMap<String, serde_json::Value>,
    source_regions: Option<String>,
    instance_filters: Option<String>,
    group_by: Option<String>,
}

/// On-disk shape of a source definition.
#[derive(Deserialize)]
struct SourceFile {
    name: String,
    kind: SourceKind,
    #[serde(default)]
    source_vars: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    source_regions: Option<String>,
    #[serde(default)]
    instance_filters: Option<String>,
    #[serde(default)]
    group_by: Option<String>,
}

impl SourceDefinition {
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            source_vars: BTreeMap::new(),
            source_regions: None,
            instance_filters: None,
            group_by: None,
        }
    }

    /// Replace the free-form source variables.
    pub fn with_vars(mut self, vars: BTreeMap<String, serde_json::Value>) -> Self {
        self.source_vars = vars;
        self
    }

    pub fn with_regions(mut self, regions: &str) -> InjectResult<Self> {
        if !self.kind.field_support().source_regions {
            return Err(InjectError::schema(
                "source_regions",
                format!("not supported by source kind '{}'", self.kind),
            ));
        }
        self.source_regions = Some(regions.to_string());
        Ok(self)
    }

    pub fn with_instance_filters(mut self, filters: &str) -> InjectResult<Self> {
        if !self.kind.field_support().instance_filters {
            return Err(InjectError::schema(
                "instance_filters",
                format!("not supported by source kind '{}'", self.kind),
            ));
        }
        self.instance_filters = Some(filters.to_string());
        Ok(self)
    }

    pub fn with_group_by(mut self, group_by: &str) -> InjectResult<Self> {
        if !self.kind.field_support().group_by {
            return Err(InjectError::schema(
                "group_by",
                format!("not supported by source kind '{}'", self.kind),
            ));
        }
        self.group_by = Some(group_by.to_string());
        Ok(self)
    }

    /// Load and validate a definition from a YAML file.
    pub fn from_file(path: &Path) -> InjectResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: SourceFile = serde_yaml::from_str(&raw)?;

        let mut def = SourceDefinition::new(file.name, file.kind).with_vars(file.source_vars);
        if let Some(regions) = &file.source_regions {
            def = def.with_regions(regions)?;
        }
        if let Some(filters) = &file.instance_filters {
            def = def.with_instance_filters(filters)?;
        }
        if let Some(group_by) = &file.group_by {
            def = def.with_group_by(group_by)?;
        }
        Ok(def)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn source_vars(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.source_vars
    }

    pub fn source_regions(&self) -> Option<&str> {
        self.source_regions.as_deref()
    }

    pub fn instance_filters(&self) -> Option<&str> {
        self.instance_filters.as_deref()
    }

    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_fields_validated_against_kind() {
        let def = SourceDefinition::new("test", SourceKind::Gce);
        let err = def.with_instance_filters("foo").unwrap_err();
        assert!(matches!(err, InjectError::SchemaViolation { .. }));

        let def = SourceDefinition::new("test", SourceKind::Openstack);
        assert!(def.with_regions("nova").is_err());
    }

    #[test]
    fn test_ec2_accepts_all_typed_fields() {
        let def = SourceDefinition::new("test", SourceKind::Ec2)
            .with_regions("us-east-1")
            .unwrap()
            .with_instance_filters("tag:Name=web")
            .unwrap()
            .with_group_by("region")
            .unwrap();
        assert_eq!(def.source_regions(), Some("us-east-1"));
        assert_eq!(def.group_by(), Some("region"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        std::fs::write(
            &path,
            "name: my-ec2\nkind: ec2\nsource_vars:\n  boto_profile: /tmp/profile\nsource_regions: us-east-2\n",
        )
        .unwrap();

        let def = SourceDefinition::from_file(&path).unwrap();
        assert_eq!(def.name(), "my-ec2");
        assert_eq!(def.kind(), SourceKind::Ec2);
        assert_eq!(def.source_regions(), Some("us-east-2"));
        assert_eq!(
            def.source_vars().get("boto_profile"),
            Some(&serde_json::Value::String("/tmp/profile".to_string()))
        );
    }

    #[test]
    fn test_from_file_rejects_unsupported_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        std::fs::write(&path, "name: bad\nkind: gce\ngroup_by: zone\n").unwrap();
        assert!(SourceDefinition::from_file(&path).is_err());
    }

    #[test]
    fn test_from_file_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        std::fs::write(&path, "name: bad\nkind: rax\n").unwrap();
        let err = SourceDefinition::from_file(&path).unwrap_err();
        assert!(matches!(err, InjectError::ConfigParse(_)));
    }
}

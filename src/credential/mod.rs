//! Credentials and their field schemas.
//!
//! A [`Credential`] is a validated bag of input values for one credential
//! kind. Validation happens once at construction, so downstream code can
//! read fields without re-checking types.

pub mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{InjectError, InjectResult};
use schema::{FieldKind, FieldSpec};

/// A single validated credential input value.
#[derive(Debug, Clone, PartialEq)]
pub enum CredValue {
    Text(String),
    Bool(bool),
}

/// A credential of a known kind with schema-validated inputs.
#[derive(Debug, Clone)]
pub struct Credential {
    kind: String,
    inputs: BTreeMap<String, CredValue>,
}

/// On-disk credential definition.
#[derive(Debug, Deserialize)]
struct CredentialFile {
    kind: String,
    #[serde(default)]
    inputs: BTreeMap<String, serde_json::Value>,
}

impl Credential {
    /// Validates the given inputs against the schema for `kind`.
    pub fn new(
        kind: &str,
        inputs: BTreeMap<String, serde_json::Value>,
    ) -> InjectResult<Self> {
        let fields = schema::fields_for(kind).ok_or_else(|| {
            InjectError::schema("kind", format!("unknown credential kind '{}'", kind))
        })?;

        let mut validated = BTreeMap::new();
        for (id, value) in inputs {
            let spec = fields.iter().find(|f| f.id == id).ok_or_else(|| {
                InjectError::schema(
                    &id,
                    format!("not a valid input for credential kind '{}'", kind),
                )
            })?;
            validated.insert(id, coerce(spec, value)?);
        }

        for field in fields {
            if field.required && !validated.contains_key(field.id) {
                return Err(InjectError::schema(
                    field.id,
                    format!("required by credential kind '{}'", kind),
                ));
            }
        }

        Ok(Credential {
            kind: kind.to_string(),
            inputs: validated,
        })
    }

    /// Loads and validates a credential from a YAML file.
    pub fn from_file(path: &Path) -> InjectResult<Self> {
        let raw = fs::read_to_string(path)?;
        let parsed: CredentialFile = serde_yaml::from_str(&raw)?;
        Credential::new(&parsed.kind, parsed.inputs)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Text value of a field, if set.
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.inputs.get(id) {
            Some(CredValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean value of a field, if set.
    pub fn boolean(&self, id: &str) -> Option<bool> {
        match self.inputs.get(id) {
            Some(CredValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

fn coerce(spec: &FieldSpec, value: serde_json::Value) -> InjectResult<CredValue> {
    match (spec.kind, value) {
        (FieldKind::Text, serde_json::Value::String(s)) => Ok(CredValue::Text(s)),
        (FieldKind::Boolean, serde_json::Value::Bool(b)) => Ok(CredValue::Bool(b)),
        (FieldKind::Text, other) => Err(InjectError::schema(
            spec.id,
            format!("expected a string, got {}", json_type_name(&other)),
        )),
        (FieldKind::Boolean, other) => Err(InjectError::schema(
            spec.id,
            format!("expected a boolean, got {}", json_type_name(&other)),
        )),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn aws_inputs() -> BTreeMap<String, serde_json::Value> {
        let mut inputs = BTreeMap::new();
        inputs.insert("username".to_string(), json!("AKIA123"));
        inputs.insert("password".to_string(), json!("shhh"));
        inputs
    }

    #[test]
    fn test_valid_credential() {
        let cred = Credential::new("aws", aws_inputs()).unwrap();
        assert_eq!(cred.kind(), "aws");
        assert_eq!(cred.text("username"), Some("AKIA123"));
        assert_eq!(cred.text("security_token"), None);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = Credential::new("rax", BTreeMap::new()).unwrap_err();
        assert!(matches!(err, InjectError::SchemaViolation { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut inputs = aws_inputs();
        inputs.insert("region".to_string(), json!("us-east-1"));
        let err = Credential::new("aws", inputs).unwrap_err();
        assert!(err.to_string().contains("region"));
    }

    #[test]
    fn test_missing_required_field() {
        let mut inputs = aws_inputs();
        inputs.remove("password");
        let err = Credential::new("aws", inputs).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_type_mismatch() {
        let mut inputs = aws_inputs();
        inputs.insert("password".to_string(), json!(42));
        let err = Credential::new("aws", inputs).unwrap_err();
        assert!(err.to_string().contains("expected a string"));
    }

    #[test]
    fn test_boolean_field() {
        let mut inputs = BTreeMap::new();
        inputs.insert("host".to_string(), json!("https://tower.example.org"));
        inputs.insert("username".to_string(), json!("admin"));
        inputs.insert("password".to_string(), json!("shhh"));
        inputs.insert("verify_ssl".to_string(), json!(true));
        let cred = Credential::new("tower", inputs).unwrap();
        assert_eq!(cred.boolean("verify_ssl"), Some(true));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "kind: vmware").unwrap();
        writeln!(file, "inputs:").unwrap();
        writeln!(file, "  host: https://vcenter.example.org").unwrap();
        writeln!(file, "  username: admin").unwrap();
        writeln!(file, "  password: shhh").unwrap();
        let cred = Credential::from_file(&path).unwrap();
        assert_eq!(cred.kind(), "vmware");
        assert_eq!(cred.text("host"), Some("https://vcenter.example.org"));
    }
}

//! Deterministic INI rendering for contrib script config files.

use std::collections::BTreeMap;

use crate::vars::VarValue;

/// An INI document with sorted sections and keys.
#[derive(Debug, Default)]
pub struct IniFile {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniFile {
    pub fn new() -> Self {
        IniFile::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Copies every scalar option into `section`. Mapping options have no
    /// INI rendering and are skipped.
    pub fn set_options(&mut self, section: &str, options: &BTreeMap<String, VarValue>) {
        for (key, value) in options {
            if let Some(rendered) = ini_value(value) {
                self.set(section, key, rendered);
            }
        }
    }

    /// Renders the document with one blank line between sections and a
    /// trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, (section, entries)) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push('[');
            out.push_str(section);
            out.push_str("]\n");
            for (key, value) in entries {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }
}

/// INI text for a scalar variable value, None for mappings.
pub fn ini_value(value: &VarValue) -> Option<String> {
    match value {
        VarValue::Str(s) => Some(s.clone()),
        VarValue::Bool(true) => Some("True".to_string()),
        VarValue::Bool(false) => Some("False".to_string()),
        VarValue::Map(_) => None,
    }
}

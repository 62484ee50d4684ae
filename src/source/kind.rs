//! The closed set of supported inventory source kinds.

use crate::error::{InjectError, InjectResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cloud inventory source kind.
///
/// Adding a kind means adding a variant here, an injector module, and rows
/// in the capability tables below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Ec2,
    Gce,
    AzureRm,
    Vmware,
    Openstack,
    Rhv,
    Satellite6,
    Cloudforms,
    Tower,
}

/// Which typed source fields a kind accepts.
#[derive(Debug, Clone, Copy)]
pub struct FieldSupport {
    pub source_regions: bool,
    pub instance_filters: bool,
    pub group_by: bool,
}

impl SourceKind {
    /// All kinds, in display order.
    pub const ALL: [SourceKind; 9] = [
        SourceKind::Ec2,
        SourceKind::Gce,
        SourceKind::AzureRm,
        SourceKind::Vmware,
        SourceKind::Openstack,
        SourceKind::Rhv,
        SourceKind::Satellite6,
        SourceKind::Cloudforms,
        SourceKind::Tower,
    ];

    /// Wire name of the kind, as used in definition files and directory names.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Ec2 => "ec2",
            SourceKind::Gce => "gce",
            SourceKind::AzureRm => "azure_rm",
            SourceKind::Vmware => "vmware",
            SourceKind::Openstack => "openstack",
            SourceKind::Rhv => "rhv",
            SourceKind::Satellite6 => "satellite6",
            SourceKind::Cloudforms => "cloudforms",
            SourceKind::Tower => "tower",
        }
    }

    /// Parse a wire name back into a kind.
    pub fn from_name(name: &str) -> InjectResult<SourceKind> {
        SourceKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == name)
            .ok_or_else(|| InjectError::schema("kind", format!("unknown source kind '{}'", name)))
    }

    /// Legacy inventory script shipped for this kind.
    pub fn script_file(&self) -> &'static str {
        match self {
            SourceKind::Ec2 => "ec2.py",
            SourceKind::Gce => "gce.py",
            SourceKind::AzureRm => "azure_rm.py",
            SourceKind::Vmware => "vmware_inventory.py",
            SourceKind::Openstack => "openstack_inventory.py",
            SourceKind::Rhv => "ovirt4.py",
            SourceKind::Satellite6 => "foreman.py",
            SourceKind::Cloudforms => "cloudforms.py",
            SourceKind::Tower => "tower.py",
        }
    }

    /// Credential kind expected for this source kind.
    pub fn credential_kind(&self) -> &'static str {
        match self {
            SourceKind::Ec2 => "aws",
            other => other.name(),
        }
    }

    /// Whether an update of this kind may run without a linked credential.
    ///
    /// EC2 can fall back to ambient AWS configuration; everything else needs
    /// explicit credentials.
    pub fn credential_optional(&self) -> bool {
        matches!(self, SourceKind::Ec2)
    }

    pub fn field_support(&self) -> FieldSupport {
        let (source_regions, instance_filters, group_by) = match self {
            SourceKind::Ec2 => (true, true, true),
            SourceKind::Gce => (true, false, false),
            SourceKind::AzureRm => (true, false, false),
            SourceKind::Vmware => (false, true, true),
            SourceKind::Tower => (false, true, false),
            _ => (false, false, false),
        };
        FieldSupport {
            source_regions,
            instance_filters,
            group_by,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

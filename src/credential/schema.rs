//! Built-in field schemas for the supported credential kinds.
//!
//! Each credential kind declares the inputs it accepts. The injection engine
//! only reads these tables; it never invents fields of its own.

/// Value type of a credential input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Boolean,
}

/// Extra format constraint carried by some text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    SshPrivateKey,
    Url,
}

/// One input field of a credential kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub format: Option<FieldFormat>,
    pub secret: bool,
    pub required: bool,
}

const fn text(id: &'static str, label: &'static str, required: bool) -> FieldSpec {
    FieldSpec {
        id,
        label,
        kind: FieldKind::Text,
        format: None,
        secret: false,
        required,
    }
}

const fn secret(id: &'static str, label: &'static str, required: bool) -> FieldSpec {
    FieldSpec {
        id,
        label,
        kind: FieldKind::Text,
        format: None,
        secret: true,
        required,
    }
}

const fn url(id: &'static str, label: &'static str, required: bool) -> FieldSpec {
    FieldSpec {
        id,
        label,
        kind: FieldKind::Text,
        format: Some(FieldFormat::Url),
        secret: false,
        required,
    }
}

const fn boolean(id: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        id,
        label,
        kind: FieldKind::Boolean,
        format: None,
        secret: false,
        required: false,
    }
}

const AWS_FIELDS: &[FieldSpec] = &[
    text("username", "Access Key", true),
    secret("password", "Secret Key", true),
    secret("security_token", "STS Token", false),
];

const GCE_FIELDS: &[FieldSpec] = &[
    text("username", "Service Account Email Address", true),
    text("project", "Project", true),
    FieldSpec {
        id: "ssh_key_data",
        label: "RSA Private Key",
        kind: FieldKind::Text,
        format: Some(FieldFormat::SshPrivateKey),
        secret: true,
        required: true,
    },
];

const AZURE_RM_FIELDS: &[FieldSpec] = &[
    text("subscription", "Subscription ID", true),
    text("username", "Username", false),
    secret("password", "Password", false),
    text("client", "Client ID", false),
    secret("secret", "Client Secret", false),
    text("tenant", "Tenant ID", false),
    text("cloud_environment", "Azure Cloud Environment", false),
];

const VMWARE_FIELDS: &[FieldSpec] = &[
    url("host", "vCenter Host", true),
    text("username", "Username", true),
    secret("password", "Password", true),
];

const OPENSTACK_FIELDS: &[FieldSpec] = &[
    url("host", "Host (Authentication URL)", true),
    text("username", "Username", true),
    secret("password", "Password (API Key)", true),
    text("project", "Project (Tenant Name)", true),
    text("domain", "Domain Name", false),
    boolean("verify_ssl", "Verify SSL"),
];

const RHV_FIELDS: &[FieldSpec] = &[
    url("host", "Host (Authentication URL)", true),
    text("username", "Username", true),
    secret("password", "Password", true),
    text("ca_file", "CA File", false),
];

const SATELLITE6_FIELDS: &[FieldSpec] = &[
    url("host", "Satellite 6 URL", true),
    text("username", "Username", true),
    secret("password", "Password", true),
];

const CLOUDFORMS_FIELDS: &[FieldSpec] = &[
    url("host", "CloudForms URL", true),
    text("username", "Username", true),
    secret("password", "Password", true),
];

const TOWER_FIELDS: &[FieldSpec] = &[
    url("host", "Ansible Tower Hostname", true),
    text("username", "Username", true),
    secret("password", "Password", true),
    boolean("verify_ssl", "Verify SSL"),
];

/// Field schema for a credential kind, or None for an unknown kind.
pub fn fields_for(credential_kind: &str) -> Option<&'static [FieldSpec]> {
    match credential_kind {
        "aws" => Some(AWS_FIELDS),
        "gce" => Some(GCE_FIELDS),
        "azure_rm" => Some(AZURE_RM_FIELDS),
        "vmware" => Some(VMWARE_FIELDS),
        "openstack" => Some(OPENSTACK_FIELDS),
        "rhv" => Some(RHV_FIELDS),
        "satellite6" => Some(SATELLITE6_FIELDS),
        "cloudforms" => Some(CLOUDFORMS_FIELDS),
        "tower" => Some(TOWER_FIELDS),
        _ => None,
    }
}

/// Look up one field spec within a kind's schema.
pub fn field_spec(credential_kind: &str, id: &str) -> Option<&'static FieldSpec> {
    fields_for(credential_kind)?.iter().find(|f| f.id == id)
}

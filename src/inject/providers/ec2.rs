//! Amazon EC2 injector.
//!
//! Script mode drives the legacy `ec2.py` contrib script through `ec2.ini`;
//! plugin mode emits an `amazon.aws.aws_ec2` config file. Both read
//! [`GROUP_BY_RULES`], the table that maps each grouping choice to the
//! environment variable, INI key and keyed-group entry it switches on.

use std::collections::BTreeMap;

use crate::error::InjectResult;
use crate::inject::ini::IniFile;
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    file_token, plugin_file_name, render_yaml, ybool, ymap, yseq, ystr,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const PLUGIN_NAME: &str = "amazon.aws.aws_ec2";
const CACHE_LOGICAL: &str = "ec2_cache";
const CREDENTIALS_LOGICAL: &str = "aws_credentials";

/// Plugin keyed-group entry for one grouping choice.
pub(crate) struct KeyedGroup {
    pub key: &'static str,
    pub prefix: &'static str,
    pub separator: Option<&'static str>,
}

/// One grouping choice and the keys it switches on.
pub(crate) struct GroupByRule {
    pub choice: &'static str,
    pub env_var: &'static str,
    pub ini_key: &'static str,
    pub keyed_group: KeyedGroup,
}

pub(crate) const GROUP_BY_RULES: &[GroupByRule] = &[
    GroupByRule {
        choice: "availability_zone",
        env_var: "EC2_GROUP_BY_AVAILABILITY_ZONE",
        ini_key: "group_by_availability_zone",
        keyed_group: KeyedGroup {
            key: "placement.availability_zone",
            prefix: "",
            separator: Some(""),
        },
    },
    GroupByRule {
        choice: "ami_id",
        env_var: "EC2_GROUP_BY_AMI_ID",
        ini_key: "group_by_ami_id",
        keyed_group: KeyedGroup {
            key: "image_id",
            prefix: "",
            separator: Some(""),
        },
    },
    GroupByRule {
        choice: "instance_id",
        env_var: "EC2_GROUP_BY_INSTANCE_ID",
        ini_key: "group_by_instance_id",
        keyed_group: KeyedGroup {
            key: "instance_id",
            prefix: "",
            separator: Some(""),
        },
    },
    GroupByRule {
        choice: "instance_type",
        env_var: "EC2_GROUP_BY_INSTANCE_TYPE",
        ini_key: "group_by_instance_type",
        keyed_group: KeyedGroup {
            key: "instance_type",
            prefix: "type",
            separator: None,
        },
    },
    GroupByRule {
        choice: "key_pair",
        env_var: "EC2_GROUP_BY_KEY_PAIR",
        ini_key: "group_by_key_pair",
        keyed_group: KeyedGroup {
            key: "key_name",
            prefix: "key",
            separator: None,
        },
    },
    GroupByRule {
        choice: "region",
        env_var: "EC2_GROUP_BY_REGION",
        ini_key: "group_by_region",
        keyed_group: KeyedGroup {
            key: "placement.region",
            prefix: "",
            separator: Some(""),
        },
    },
    GroupByRule {
        choice: "security_group",
        env_var: "EC2_GROUP_BY_SECURITY_GROUP",
        ini_key: "group_by_security_group",
        keyed_group: KeyedGroup {
            key: "security_groups | map(attribute=\"group_name\")",
            prefix: "security_group",
            separator: None,
        },
    },
    GroupByRule {
        choice: "tag_keys",
        env_var: "EC2_GROUP_BY_TAG_KEYS",
        ini_key: "group_by_tag_keys",
        keyed_group: KeyedGroup {
            key: "tags",
            prefix: "tag",
            separator: None,
        },
    },
    GroupByRule {
        choice: "tag_none",
        env_var: "EC2_GROUP_BY_TAG_NONE",
        ini_key: "group_by_tag_none",
        keyed_group: KeyedGroup {
            key: "tags",
            prefix: "tag_none",
            separator: None,
        },
    },
    GroupByRule {
        choice: "vpc_id",
        env_var: "EC2_GROUP_BY_VPC_ID",
        ini_key: "group_by_vpc_id",
        keyed_group: KeyedGroup {
            key: "vpc_id",
            prefix: "vpc_id",
            separator: None,
        },
    },
    GroupByRule {
        choice: "instance_state",
        env_var: "EC2_GROUP_BY_INSTANCE_STATE",
        ini_key: "group_by_instance_state",
        keyed_group: KeyedGroup {
            key: "instance_state_name",
            prefix: "instance_state",
            separator: None,
        },
    },
    GroupByRule {
        choice: "platform",
        env_var: "EC2_GROUP_BY_PLATFORM",
        ini_key: "group_by_platform",
        keyed_group: KeyedGroup {
            key: "platform",
            prefix: "platform",
            separator: None,
        },
    },
];

/// True when `choice` names a row of the grouping table.
pub(crate) fn is_group_by_choice(choice: &str) -> bool {
    GROUP_BY_RULES.iter().any(|rule| rule.choice == choice)
}

fn selected_rules(vars: &NormalizedVars) -> Vec<&'static GroupByRule> {
    GROUP_BY_RULES
        .iter()
        .filter(|rule| vars.group_by().iter().any(|c| c == rule.choice))
        .collect()
}

/// Hostname aliases the legacy script accepts, translated to the attribute
/// names the aws_ec2 plugin exposes.
fn plugin_hostname(script_name: &str) -> &str {
    match script_name {
        "public_dns_name" => "public-dns-name",
        "private_dns_name" => "private-dns-name",
        "ip_address" => "public-ip-address",
        "private_ip_address" => "private-ip-address",
        other => other,
    }
}

/// Filter terms arrive as a comma list of `key=value` pairs; a bare term
/// matches the instance Name tag.
fn parse_filters(raw: Option<&str>) -> Option<serde_yaml::Value> {
    let raw = raw?;
    let mut filters = BTreeMap::new();
    for term in raw.split(',') {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        match term.split_once('=') {
            Some((key, value)) => {
                filters.insert(key.trim().to_string(), value.trim().to_string())
            }
            None => filters.insert("tag:Name".to_string(), term.to_string()),
        };
    }
    if filters.is_empty() {
        None
    } else {
        Some(ymap(filters))
    }
}

fn keyed_group_value(group: &KeyedGroup) -> serde_yaml::Value {
    let mut map = serde_yaml::Mapping::new();
    map.insert(ystr("key"), ystr(group.key));
    map.insert(ystr("prefix"), ystr(group.prefix));
    if let Some(separator) = group.separator {
        map.insert(ystr("separator"), ystr(separator));
    }
    serde_yaml::Value::Mapping(map)
}

fn credentials_ini(vars: &NormalizedVars) -> Option<String> {
    let username = vars.cred_text("username")?;
    let mut ini = IniFile::new();
    ini.set("default", "aws_access_key_id", username);
    if let Some(password) = vars.cred_text("password") {
        ini.set("default", "aws_secret_access_key", password);
    }
    if let Some(token) = vars.cred_text("security_token") {
        ini.set("default", "aws_security_token", token);
    }
    Some(ini.render())
}

fn add_credential(result: &mut InjectionResult, vars: &NormalizedVars) {
    if let Some(content) = credentials_ini(vars) {
        result.add_file(FileSpec::secret_text(CREDENTIALS_LOGICAL, content));
        if let Some(username) = vars.cred_text("username") {
            result.add_env("AWS_ACCESS_KEY_ID", EnvValue::Literal(username.to_string()));
        }
        result.add_env(
            "AWS_SHARED_CREDENTIALS_FILE",
            EnvValue::FileRef(CREDENTIALS_LOGICAL.to_string()),
        );
    }
}

pub struct Ec2Injector;

impl Injector for Ec2Injector {
    fn kind(&self) -> SourceKind {
        SourceKind::Ec2
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
        ini.set_options("ec2", vars.options());
        let regions = if vars.regions().is_empty() {
            "all".to_string()
        } else {
            vars.regions_csv()
        };
        ini.set("ec2", "regions", regions);
        if let Some(filters) = vars.instance_filters() {
            ini.set("ec2", "instance_filters", filters);
        }
        for rule in selected_rules(vars) {
            ini.set("ec2", rule.ini_key, "True");
            result.add_env(rule.env_var, EnvValue::Literal("True".to_string()));
        }
        ini.set("ec2", "cache_path", file_token(CACHE_LOGICAL));

        result.add_file(FileSpec::text("ec2.ini", ini.render()));
        result.add_file(FileSpec::cache_dir(CACHE_LOGICAL));
        add_credential(&mut result, vars);

        result.add_env("EC2_INI_PATH", EnvValue::FileRef("ec2.ini".to_string()));
        if !vars.regions().is_empty() {
            result.add_env("EC2_REGIONS", EnvValue::Literal(vars.regions_csv()));
        }
        if let Some(filters) = vars.instance_filters() {
            result.add_env("EC2_INSTANCE_FILTERS", EnvValue::Literal(filters.to_string()));
        }
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
        if let Some(profile) = vars.option_str("boto_profile") {
            doc.insert("boto_profile".to_string(), ystr(profile));
        }
        if let Some(arn) = vars.option_str("iam_role_arn") {
            doc.insert("iam_role_arn".to_string(), ystr(arn));
        }
        doc.insert("cache".to_string(), ybool(true));
        doc.insert("cache_plugin".to_string(), ystr("jsonfile"));
        doc.insert("cache_connection".to_string(), ystr(&file_token(CACHE_LOGICAL)));
        if let Some(destination) = vars.option_str("destination_variable") {
            let mut compose = BTreeMap::new();
            compose.insert("ansible_host".to_string(), destination.to_string());
            doc.insert("compose".to_string(), ymap(compose));
        }
        if let Some(filters) = parse_filters(vars.instance_filters()) {
            doc.insert("filters".to_string(), filters);
        }
        if let Some(hostname) = vars.option_str("hostname_variable") {
            doc.insert(
                "hostnames".to_string(),
                yseq(vec![ystr(plugin_hostname(hostname))]),
            );
        }
        let selected = selected_rules(vars);
        if !selected.is_empty() {
            let groups = selected
                .iter()
                .map(|rule| keyed_group_value(&rule.keyed_group))
                .collect();
            doc.insert("keyed_groups".to_string(), yseq(groups));
        }
        if !vars.regions().is_empty() {
            let regions = vars.regions().iter().map(|r| ystr(r)).collect();
            doc.insert("regions".to_string(), yseq(regions));
        }

        result.add_file(FileSpec::text(&file_name, render_yaml(&doc)?));
        result.add_file(FileSpec::cache_dir(CACHE_LOGICAL));
        add_credential(&mut result, vars);
        Ok(result)
    }
}

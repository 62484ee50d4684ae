//! Red Hat CloudForms injector.
//!
//! Script mode only. The script reads a fixed option whitelist; anything
//! else in the source variables is ignored, unlike most providers.

use super::required_input;
use crate::error::InjectResult;
use crate::inject::ini::{IniFile, ini_value};
use crate::inject::{
    BuildContext, EnvValue, ExecutionMode, FileSpec, InjectionResult, Injector, InventoryInput,
    file_token,
};
use crate::source::SourceKind;
use crate::vars::NormalizedVars;

const INI_LOGICAL: &str = "cloudforms.ini";
const CACHE_LOGICAL: &str = "cloudforms_cache";

const OPTION_WHITELIST: &[&str] = &[
    "version",
    "purge_actions",
    "clean_group_keys",
    "nest_tags",
    "suffix",
    "prefer_ipv4",
];

pub struct CloudformsInjector;

impl Injector for CloudformsInjector {
    fn kind(&self) -> SourceKind {
        SourceKind::Cloudforms
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
        ini.set("cache", "max_age", "0");
        ini.set("cache", "path", file_token(CACHE_LOGICAL));
        ini.set("cloudforms", "url", required_input(vars, "host")?);
        ini.set("cloudforms", "username", required_input(vars, "username")?);
        ini.set("cloudforms", "password", required_input(vars, "password")?);
        ini.set("cloudforms", "ssl_verify", "False");
        for key in OPTION_WHITELIST {
            if let Some(rendered) = vars.options().get(*key).and_then(ini_value) {
                ini.set("cloudforms", key, rendered);
            }
        }

        result.add_file(FileSpec::secret_text(INI_LOGICAL, ini.render()));
        result.add_file(FileSpec::cache_dir(CACHE_LOGICAL));
        result.add_env(
            "CLOUDFORMS_INI_PATH",
            EnvValue::FileRef(INI_LOGICAL.to_string()),
        );
        Ok(result)
    }
}

//! One injector per supported source kind.

pub mod azure_rm;
pub mod cloudforms;
pub mod ec2;
pub mod gce;
pub mod openstack;
pub mod rhv;
pub mod satellite6;
pub mod tower;
pub mod vmware;

use crate::error::{InjectError, InjectResult};
use crate::vars::NormalizedVars;

/// Credential input that the kind's schema marks required.
///
/// Resolution already rejects updates without a credential, so a miss here
/// means the schema and the injector disagree about a field id.
pub(crate) fn required_input<'a>(vars: &'a NormalizedVars, id: &str) -> InjectResult<&'a str> {
    vars.cred_text(id)
        .ok_or_else(|| InjectError::schema(id, "missing required credential input"))
}

//! Injector registry.
//!
//! Provides a central registry for looking up injectors by source kind.

use std::collections::HashMap;
use std::sync::Arc;

use super::Injector;
use super::providers::{
    azure_rm::AzureRmInjector, cloudforms::CloudformsInjector, ec2::Ec2Injector, gce::GceInjector,
    openstack::OpenstackInjector, rhv::RhvInjector, satellite6::Satellite6Injector,
    tower::TowerInjector, vmware::VmwareInjector,
};
use crate::source::SourceKind;

/// Registry of the built-in injectors, one per source kind.
pub struct InjectorRegistry {
    injectors: HashMap<SourceKind, Arc<dyn Injector>>,
}

impl InjectorRegistry {
    /// Create a new registry with all built-in injectors.
    pub fn new() -> Self {
        let mut injectors: HashMap<SourceKind, Arc<dyn Injector>> = HashMap::new();
        injectors.insert(SourceKind::Ec2, Arc::new(Ec2Injector));
        injectors.insert(SourceKind::Gce, Arc::new(GceInjector));
        injectors.insert(SourceKind::AzureRm, Arc::new(AzureRmInjector));
        injectors.insert(SourceKind::Vmware, Arc::new(VmwareInjector));
        injectors.insert(SourceKind::Openstack, Arc::new(OpenstackInjector));
        injectors.insert(SourceKind::Rhv, Arc::new(RhvInjector));
        injectors.insert(SourceKind::Satellite6, Arc::new(Satellite6Injector));
        injectors.insert(SourceKind::Cloudforms, Arc::new(CloudformsInjector));
        injectors.insert(SourceKind::Tower, Arc::new(TowerInjector));
        Self { injectors }
    }

    /// Get the injector for a source kind.
    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn Injector>> {
        self.injectors.get(&kind).cloned()
    }
}

impl Default for InjectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// API version v1alpha1 for Net Operator CRDs

pub mod ip_pool;
pub mod port_config;
pub mod vsphere_distributed_network;

pub use ip_pool::IPPoolReference;
pub use port_config::{
    MacLearningPolicy, MacLimitPolicy, MacManagementPolicy, VSphereDistributedPortConfig,
    VlanSpec, VlanTrunkRange, VlanType,
};
pub use vsphere_distributed_network::{
    ConditionStatus, IPAssignmentMode, VSphereDistributedNetwork,
    VSphereDistributedNetworkCondition, VSphereDistributedNetworkConditionType,
    VSphereDistributedNetworkList, VSphereDistributedNetworkSpec,
    VSphereDistributedNetworkStatus,
};

use crate::scheme::{Scheme, SchemeError};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

/// API group for Net Operator resources
pub const API_GROUP: &str = "netoperator.vmware.com";
/// API version for Net Operator resources
pub const API_VERSION: &str = "v1alpha1";

/// Lowest VLAN ID accepted anywhere in a VLAN configuration
pub const VLAN_ID_MIN: i32 = 0;
/// Highest VLAN ID accepted anywhere in a VLAN configuration
pub const VLAN_ID_MAX: i32 = 4094;
/// Upper bound of the MAC learning limit
pub const MAC_LEARNING_LIMIT_MAX: i32 = 4096;

/// Add every kind of this group/version to `scheme`
pub fn add_to_scheme(scheme: &Scheme) -> Result<(), SchemeError> {
    scheme.add_known_type::<VSphereDistributedNetwork>()?;
    scheme.add_known_type::<VSphereDistributedNetworkList>()?;
    Ok(())
}

/// Add every kind of this group/version to the process-wide scheme
pub fn register() -> Result<(), SchemeError> {
    add_to_scheme(Scheme::global())
}

/// CRD manifests for every resource kind of this group/version
pub fn crds() -> Vec<CustomResourceDefinition> {
    vec![VSphereDistributedNetwork::crd()]
}

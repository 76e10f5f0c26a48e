//! Admission validation for VSphereDistributedNetwork objects
//!
//! The checks mirror the constraints declared on the API types: mode
//! coherence between `ipAssignmentMode` and the addressing fields, VLAN ID
//! and MAC learning limit bounds, and at most one condition per type.

use crate::field::{FieldError, FieldErrors, FieldPath};
use ipnetwork::{ipv4_mask_to_prefix, ipv6_mask_to_prefix};
use netop_api::v1alpha1::{
    IPAssignmentMode, MacManagementPolicy, VSphereDistributedNetwork,
    VSphereDistributedNetworkSpec, VSphereDistributedNetworkStatus,
    VSphereDistributedPortConfig, VlanSpec, MAC_LEARNING_LIMIT_MAX, VLAN_ID_MAX, VLAN_ID_MIN,
};
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::debug;

/// Validate a whole object as submitted for create
pub fn validate(network: &VSphereDistributedNetwork) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let metadata = FieldPath::new("metadata");

    if network.metadata.name.as_deref().unwrap_or_default().is_empty()
        && network.metadata.generate_name.as_deref().unwrap_or_default().is_empty()
    {
        errors.push(FieldError::required(
            metadata.child("name"),
            "name or generateName is required",
        ));
    }

    if let Some(namespace) = network.metadata.namespace.as_deref() {
        if !namespace.is_empty() {
            errors.push(FieldError::forbidden(
                metadata.child("namespace"),
                "not allowed on cluster-scoped resources",
            ));
        }
    }

    errors.extend(spec_errors(&network.spec, &FieldPath::new("spec")));
    if let Some(status) = network.status.as_ref() {
        errors.extend(status_errors(status, &FieldPath::new("status")));
    }

    debug!(
        "Validated VSphereDistributedNetwork {}: {} error(s)",
        network.metadata.name.as_deref().unwrap_or("<generated>"),
        errors.len()
    );
    errors.into_result()
}

/// Validate an update. No field is immutable, so only `new` is checked.
pub fn validate_update(
    old: &VSphereDistributedNetwork,
    new: &VSphereDistributedNetwork,
) -> Result<(), FieldErrors> {
    if old.spec.effective_ip_assignment_mode() != new.spec.effective_ip_assignment_mode() {
        debug!(
            "ipAssignmentMode changing from {} to {}",
            old.spec.effective_ip_assignment_mode(),
            new.spec.effective_ip_assignment_mode()
        );
    }
    validate(new)
}

/// Validate the desired state on its own
pub fn validate_spec(spec: &VSphereDistributedNetworkSpec) -> Result<(), FieldErrors> {
    spec_errors(spec, &FieldPath::new("spec")).into_result()
}

/// Validate the observed state on its own
pub fn validate_status(status: &VSphereDistributedNetworkStatus) -> Result<(), FieldErrors> {
    status_errors(status, &FieldPath::new("status")).into_result()
}

fn spec_errors(spec: &VSphereDistributedNetworkSpec, path: &FieldPath) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if spec.port_group_id.is_empty() {
        errors.push(FieldError::required(
            path.child("portGroupID"),
            "must identify an existing distributed port group",
        ));
    }

    let mode = spec.effective_ip_assignment_mode();
    match mode {
        IPAssignmentMode::StaticPool => {
            if spec.ip_pools.is_empty() {
                errors.push(FieldError::required(
                    path.child("ipPools"),
                    "at least one IPPool reference is required when ipAssignmentMode is staticpool",
                ));
            }
            if spec.gateway.is_empty() {
                errors.push(FieldError::required(
                    path.child("gateway"),
                    "required when ipAssignmentMode is staticpool",
                ));
            } else if spec.gateway.parse::<IpAddr>().is_err() {
                errors.push(FieldError::invalid(
                    path.child("gateway"),
                    &spec.gateway,
                    "must be a valid IP address",
                ));
            }
            if spec.subnet_mask.is_empty() {
                errors.push(FieldError::required(
                    path.child("subnetMask"),
                    "required when ipAssignmentMode is staticpool",
                ));
            } else if !is_subnet_mask(&spec.subnet_mask) {
                errors.push(FieldError::invalid(
                    path.child("subnetMask"),
                    &spec.subnet_mask,
                    "must be a valid subnet mask",
                ));
            }
        }
        IPAssignmentMode::Dhcp | IPAssignmentMode::None => {
            let detail = format!("must be empty when ipAssignmentMode is {}", mode);
            if !spec.ip_pools.is_empty() {
                errors.push(FieldError::forbidden(path.child("ipPools"), detail.clone()));
            }
            if !spec.gateway.is_empty() {
                errors.push(FieldError::forbidden(path.child("gateway"), detail.clone()));
            }
            if !spec.subnet_mask.is_empty() {
                errors.push(FieldError::forbidden(path.child("subnetMask"), detail));
            }
        }
    }

    let pools = path.child("ipPools");
    for (i, pool) in spec.ip_pools.iter().enumerate() {
        if pool.name.is_empty() {
            errors.push(FieldError::required(pools.index(i).child("name"), "IPPool name is required"));
        }
    }

    errors
}

fn status_errors(status: &VSphereDistributedNetworkStatus, path: &FieldPath) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let conditions = path.child("conditions");
    let mut seen = HashMap::new();
    for (i, condition) in status.conditions.iter().enumerate() {
        if seen.insert(condition.r#type, i).is_some() {
            errors.push(FieldError::duplicate(conditions.index(i).child("type"), condition.r#type));
        }
    }

    if let Some(config) = status.default_port_config.as_ref() {
        errors.extend(port_config_errors(config, &path.child("defaultPortConfig")));
    }

    errors
}

/// Validate a port configuration rooted at `path`
pub fn port_config_errors(config: &VSphereDistributedPortConfig, path: &FieldPath) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(vlan) = config.vlan.as_ref() {
        errors.extend(vlan_errors(vlan, &path.child("vlan")));
    }
    if let Some(policy) = config.mac_management_policy.as_ref() {
        errors.extend(mac_policy_errors(policy, &path.child("macManagementPolicy")));
    }

    errors
}

fn vlan_errors(vlan: &VlanSpec, path: &FieldPath) -> FieldErrors {
    let mut errors = FieldErrors::new();

    // Only the active variant is checked; other fields are ignored on the wire.
    match vlan {
        VlanSpec::Standard { vlan_id: Some(id) } => {
            check_vlan_id(*id, path.child("vlanID"), &mut errors);
        }
        VlanSpec::Trunk {
            trunk_range: Some(ranges),
        } => {
            let ranges_path = path.child("trunkRange");
            for (i, range) in ranges.iter().enumerate() {
                let range_path = ranges_path.index(i);
                check_vlan_id(range.start, range_path.child("start"), &mut errors);
                check_vlan_id(range.end, range_path.child("end"), &mut errors);
            }
        }
        _ => {}
    }

    errors
}

fn mac_policy_errors(policy: &MacManagementPolicy, path: &FieldPath) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(limit) = policy
        .mac_learning_policy
        .as_ref()
        .and_then(|learning| learning.limit)
    {
        if !(0..=MAC_LEARNING_LIMIT_MAX).contains(&limit) {
            errors.push(FieldError::invalid(
                path.child("macLearningPolicy").child("limit"),
                limit,
                format!("must be between 0 and {}, inclusive", MAC_LEARNING_LIMIT_MAX),
            ));
        }
    }

    errors
}

fn check_vlan_id(id: i32, path: FieldPath, errors: &mut FieldErrors) {
    if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&id) {
        errors.push(FieldError::invalid(
            path,
            id,
            format!("must be between {} and {}, inclusive", VLAN_ID_MIN, VLAN_ID_MAX),
        ));
    }
}

fn is_subnet_mask(mask: &str) -> bool {
    match mask.parse::<IpAddr>() {
        Ok(IpAddr::V4(mask)) => ipv4_mask_to_prefix(mask).is_ok(),
        Ok(IpAddr::V6(mask)) => ipv6_mask_to_prefix(mask).is_ok(),
        Err(_) => false,
    }
}

//! Scheme-aware decoding of wire objects

use crate::error::{CoreError, Result};
use crate::field::{FieldError, FieldErrors, FieldPath};
use netop_api::v1alpha1::{
    ConditionStatus, IPAssignmentMode, MacLimitPolicy, VSphereDistributedNetwork,
    VSphereDistributedNetworkConditionType, VlanType,
};
use netop_api::{Scheme, SchemeObject};
use serde_json::Value;
use tracing::debug;

/// Decode a VSphereDistributedNetwork from its JSON wire form.
///
/// `apiVersion`/`kind` must name a kind registered in `scheme`, and it must
/// be the VSphereDistributedNetwork kind. Enumerated fields holding an
/// unknown token are reported with their field path before structural
/// decoding runs.
pub fn decode_network(scheme: &Scheme, value: Value) -> Result<VSphereDistributedNetwork> {
    let api_version = value
        .get("apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let known = scheme.lookup_api_version(api_version, &kind)?;
    let expected = VSphereDistributedNetwork::known_type();
    if known.gvk != expected.gvk {
        return Err(CoreError::UnexpectedKind {
            expected: format!("{}, Kind={}", expected.api_version(), expected.gvk.kind),
            actual: format!("{}, Kind={}", known.api_version(), known.gvk.kind),
        });
    }

    enum_token_errors(&value).into_result()?;

    let network = serde_json::from_value(value)?;
    debug!("Decoded {} object", kind);
    Ok(network)
}

fn enum_token_errors(value: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let spec = FieldPath::new("spec");
    // An empty mode means unset.
    check_token(
        value
            .pointer("/spec/ipAssignmentMode")
            .filter(|mode| mode.as_str() != Some("")),
        spec.child("ipAssignmentMode"),
        &IPAssignmentMode::ALL.map(|m| m.as_str()),
        &mut errors,
    );

    let status = FieldPath::new("status");
    if let Some(conditions) = value.pointer("/status/conditions").and_then(Value::as_array) {
        let path = status.child("conditions");
        for (i, condition) in conditions.iter().enumerate() {
            check_token(
                condition.get("type"),
                path.index(i).child("type"),
                &VSphereDistributedNetworkConditionType::ALL.map(|t| t.as_str()),
                &mut errors,
            );
            check_token(
                condition.get("status"),
                path.index(i).child("status"),
                &ConditionStatus::ALL.map(|s| s.as_str()),
                &mut errors,
            );
        }
    }

    let port_config = status.child("defaultPortConfig");
    check_token(
        value.pointer("/status/defaultPortConfig/vlan/type"),
        port_config.child("vlan").child("type"),
        &VlanType::ALL.map(|t| t.as_str()),
        &mut errors,
    );
    check_token(
        value.pointer("/status/defaultPortConfig/macManagementPolicy/macLearningPolicy/limitPolicy"),
        port_config
            .child("macManagementPolicy")
            .child("macLearningPolicy")
            .child("limitPolicy"),
        &MacLimitPolicy::ALL.map(|p| p.as_str()),
        &mut errors,
    );

    errors
}

// Non-string values are left to the structural decoder.
fn check_token(value: Option<&Value>, path: FieldPath, supported: &[&str], errors: &mut FieldErrors) {
    if let Some(token) = value.and_then(Value::as_str) {
        if !supported.contains(&token) {
            errors.push(FieldError::not_supported(path, token, supported));
        }
    }
}

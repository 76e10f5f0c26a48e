//! Validating admission for VSphereDistributedNetwork

use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use kube::ResourceExt;
use netop_api::Scheme;
use netop_core::validation::{validate, validate_update};
use netop_core::{decode_network, Result};
use tracing::{debug, error, info, warn};

/// Answer an AdmissionReview. Malformed reviews get an invalid response.
pub fn review(scheme: &Scheme, body: AdmissionReview<DynamicObject>) -> AdmissionReview<DynamicObject> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(err) => {
            error!("invalid request: {}", err);
            return AdmissionResponse::invalid(err.to_string()).into_review();
        }
    };
    admit(scheme, &req).into_review()
}

/// Decide a single admission request
pub fn admit(scheme: &Scheme, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
    let res = AdmissionResponse::from(req);

    if matches!(req.operation, Operation::Delete) {
        debug!("allowing DELETE of {}", req.name);
        return res;
    }

    let Some(obj) = &req.object else {
        warn!("denied: {:?} on {} (no object in request)", req.operation, req.name);
        return res.deny("request carries no object");
    };

    let name = obj.name_any();
    match check(scheme, obj, req.old_object.as_ref()) {
        Ok(()) => {
            info!("accepted: {:?} on resource {}", req.operation, name);
            res
        }
        Err(err) => {
            warn!("denied: {:?} on {} ({})", req.operation, name, err);
            res.deny(err.to_string())
        }
    }
}

fn check(scheme: &Scheme, obj: &DynamicObject, old: Option<&DynamicObject>) -> Result<()> {
    let network = decode_network(scheme, serde_json::to_value(obj)?)?;

    let old = match old.map(serde_json::to_value).transpose()? {
        Some(value) => match decode_network(scheme, value) {
            Ok(old) => Some(old),
            Err(err) => {
                debug!("old object does not decode, validating as create: {}", err);
                None
            }
        },
        None => None,
    };

    match old {
        Some(old) => validate_update(&old, &network)?,
        None => validate(&network)?,
    }
    Ok(())
}

//! Condition bookkeeping on VSphereDistributedNetwork status
//!
//! Conditions behave as a map keyed by type: setting a condition replaces
//! any entry of the same type, and the list is kept sorted by type so the
//! serialized form is stable.

use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use netop_api::v1alpha1::{
    ConditionStatus, VSphereDistributedNetworkCondition as Condition,
    VSphereDistributedNetworkConditionType as ConditionType, VSphereDistributedNetworkStatus,
};
use tracing::debug;

/// What a condition says about one aspect of the network
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// The condition has never been written
    NotEvaluated,
    /// Evaluated and not failing (`False`)
    Healthy,
    /// A failure condition is `True`
    Failing,
    /// A warning condition is `True`
    Warning,
    /// The controller could not tell (`Unknown`)
    Unknown,
}

pub fn find_condition(
    status: &VSphereDistributedNetworkStatus,
    r#type: ConditionType,
) -> Option<&Condition> {
    status.conditions.iter().find(|c| c.r#type == r#type)
}

/// Set `condition`, replacing any existing entry of the same type.
///
/// The transition time only moves when the status value flips. It is taken
/// from `condition` when present, `now` otherwise. Returns whether anything
/// changed.
pub fn set_condition(
    status: &mut VSphereDistributedNetworkStatus,
    mut condition: Condition,
    now: Time,
) -> bool {
    let r#type = condition.r#type;

    let mut first = true;
    status.conditions.retain(|c| {
        if c.r#type != r#type {
            return true;
        }
        let keep = first;
        first = false;
        keep
    });

    let changed = match status.conditions.iter_mut().find(|c| c.r#type == r#type) {
        None => {
            if condition.last_transition_time.is_none() {
                condition.last_transition_time = Some(now);
            }
            status.conditions.push(condition);
            true
        }
        Some(existing) => {
            let mut changed = false;
            if existing.status != condition.status {
                existing.status = condition.status;
                existing.last_transition_time = Some(condition.last_transition_time.unwrap_or(now));
                changed = true;
            }
            if existing.reason != condition.reason {
                existing.reason = condition.reason;
                changed = true;
            }
            if existing.message != condition.message {
                existing.message = condition.message;
                changed = true;
            }
            changed
        }
    };

    status.conditions.sort_by_key(|c| c.r#type);

    if changed {
        debug!("Condition {} updated", r#type);
    }
    changed
}

/// [`set_condition`] stamped with the current time
pub fn set_condition_now(status: &mut VSphereDistributedNetworkStatus, condition: Condition) -> bool {
    set_condition(status, condition, Time(Utc::now()))
}

/// Remove the condition of the given type. Returns whether one was present.
pub fn remove_condition(status: &mut VSphereDistributedNetworkStatus, r#type: ConditionType) -> bool {
    let before = status.conditions.len();
    status.conditions.retain(|c| c.r#type != r#type);
    before != status.conditions.len()
}

pub fn is_condition_true(status: &VSphereDistributedNetworkStatus, r#type: ConditionType) -> bool {
    find_condition(status, r#type).is_some_and(Condition::is_true)
}

/// Interpret the condition of the given type
pub fn observe(status: Option<&VSphereDistributedNetworkStatus>, r#type: ConditionType) -> Observation {
    let Some(condition) = status.and_then(|s| find_condition(s, r#type)) else {
        return Observation::NotEvaluated;
    };
    match condition.status {
        ConditionStatus::False => Observation::Healthy,
        ConditionStatus::Unknown => Observation::Unknown,
        ConditionStatus::True if r#type.is_warning() => Observation::Warning,
        ConditionStatus::True => Observation::Failing,
    }
}

/// No failure condition is `True`. Warnings and unevaluated conditions do
/// not block readiness.
pub fn is_ready(status: Option<&VSphereDistributedNetworkStatus>) -> bool {
    ConditionType::ALL
        .iter()
        .all(|t| observe(status, *t) != Observation::Failing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minute: u32) -> Time {
        Time(Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap())
    }

    #[test]
    fn test_set_condition_replaces_same_type() {
        let mut status = VSphereDistributedNetworkStatus::default();

        set_condition(
            &mut status,
            Condition::new(ConditionType::PortGroupFailure, ConditionStatus::True)
                .with_reason("PortGroupNotFound"),
            t(1),
        );
        set_condition(
            &mut status,
            Condition::new(ConditionType::PortGroupFailure, ConditionStatus::False),
            t(2),
        );

        assert_eq!(status.conditions.len(), 1);
        let condition = find_condition(&status, ConditionType::PortGroupFailure).unwrap();
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.last_transition_time, Some(t(2)));
        assert_eq!(condition.reason, None);
    }

    #[test]
    fn test_transition_time_kept_without_flip() {
        let mut status = VSphereDistributedNetworkStatus::default();
        set_condition(
            &mut status,
            Condition::new(ConditionType::IPPoolPressure, ConditionStatus::True),
            t(1),
        );

        let changed = set_condition(
            &mut status,
            Condition::new(ConditionType::IPPoolPressure, ConditionStatus::True)
                .with_message("3 addresses left"),
            t(5),
        );
        assert!(changed);

        let condition = find_condition(&status, ConditionType::IPPoolPressure).unwrap();
        assert_eq!(condition.last_transition_time, Some(t(1)));
        assert_eq!(condition.message.as_deref(), Some("3 addresses left"));

        let changed = set_condition(
            &mut status,
            Condition::new(ConditionType::IPPoolPressure, ConditionStatus::True)
                .with_message("3 addresses left"),
            t(6),
        );
        assert!(!changed);
    }

    #[test]
    fn test_explicit_transition_time_wins() {
        let mut status = VSphereDistributedNetworkStatus::default();
        let explicit = Time(t(0).0 - Duration::minutes(30));
        set_condition(
            &mut status,
            Condition::new(ConditionType::IPPoolInvalid, ConditionStatus::True)
                .with_last_transition_time(explicit.clone()),
            t(1),
        );
        let condition = find_condition(&status, ConditionType::IPPoolInvalid).unwrap();
        assert_eq!(condition.last_transition_time, Some(explicit));
    }

    #[test]
    fn test_conditions_sorted_by_type() {
        let mut status = VSphereDistributedNetworkStatus::default();
        for ty in [
            ConditionType::PortGroupFailure,
            ConditionType::IPPoolPressure,
            ConditionType::IPPoolInvalid,
        ] {
            set_condition(&mut status, Condition::new(ty, ConditionStatus::False), t(1));
        }

        let types: Vec<&str> = status.conditions.iter().map(|c| c.r#type.as_str()).collect();
        assert_eq!(types, vec!["IPPoolInvalid", "IPPoolPressure", "PortGroupFailure"]);
    }

    #[test]
    fn test_set_condition_collapses_duplicates() {
        let mut status = VSphereDistributedNetworkStatus {
            conditions: vec![
                Condition::new(ConditionType::PortGroupFailure, ConditionStatus::True),
                Condition::new(ConditionType::PortGroupFailure, ConditionStatus::Unknown),
            ],
            default_port_config: None,
        };
        set_condition(
            &mut status,
            Condition::new(ConditionType::PortGroupFailure, ConditionStatus::False),
            t(3),
        );
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, ConditionStatus::False);
    }

    #[test]
    fn test_remove_condition() {
        let mut status = VSphereDistributedNetworkStatus::default();
        set_condition_now(
            &mut status,
            Condition::new(ConditionType::IPPoolInvalid, ConditionStatus::True),
        );
        assert!(status.conditions[0].last_transition_time.is_some());

        assert!(remove_condition(&mut status, ConditionType::IPPoolInvalid));
        assert!(!remove_condition(&mut status, ConditionType::IPPoolInvalid));
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn test_observe_distinguishes_absence_from_false() {
        let mut status = VSphereDistributedNetworkStatus::default();
        assert_eq!(observe(None, ConditionType::PortGroupFailure), Observation::NotEvaluated);
        assert_eq!(
            observe(Some(&status), ConditionType::PortGroupFailure),
            Observation::NotEvaluated
        );

        set_condition(
            &mut status,
            Condition::new(ConditionType::PortGroupFailure, ConditionStatus::False),
            t(1),
        );
        assert_eq!(observe(Some(&status), ConditionType::PortGroupFailure), Observation::Healthy);

        set_condition(
            &mut status,
            Condition::new(ConditionType::PortGroupFailure, ConditionStatus::Unknown),
            t(2),
        );
        assert_eq!(observe(Some(&status), ConditionType::PortGroupFailure), Observation::Unknown);
    }

    #[test]
    fn test_pressure_is_warning_not_failure() {
        let mut status = VSphereDistributedNetworkStatus::default();
        set_condition(
            &mut status,
            Condition::new(ConditionType::IPPoolPressure, ConditionStatus::True),
            t(1),
        );
        assert_eq!(observe(Some(&status), ConditionType::IPPoolPressure), Observation::Warning);
        assert!(is_condition_true(&status, ConditionType::IPPoolPressure));
        assert!(is_ready(Some(&status)));

        set_condition(
            &mut status,
            Condition::new(ConditionType::IPPoolInvalid, ConditionStatus::True),
            t(2),
        );
        assert_eq!(observe(Some(&status), ConditionType::IPPoolInvalid), Observation::Failing);
        assert!(!is_ready(Some(&status)));
    }
}

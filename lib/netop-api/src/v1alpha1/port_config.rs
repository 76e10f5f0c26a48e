use crate::v1alpha1::{VLAN_ID_MAX, VLAN_ID_MIN};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VLAN configuration type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VlanType {
    // A single VLAN ID
    Standard,
    // A set of VLAN ID ranges
    Trunk,
    // A private VLAN
    Private,
}

impl VlanType {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Trunk, Self::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            VlanType::Standard => "standard",
            VlanType::Trunk => "trunk",
            VlanType::Private => "private",
        }
    }
}

impl std::fmt::Display for VlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of VLAN IDs allowed on a trunk port
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct VlanTrunkRange {
    /// Beginning of the VLAN ID range (inclusive)
    #[schemars(range(min = 0, max = 4094))]
    pub start: i32,

    /// End of the VLAN ID range (inclusive)
    #[schemars(range(min = 0, max = 4094))]
    pub end: i32,
}

impl VlanTrunkRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// The same range with its endpoints in ascending order.
    ///
    /// Reversed ranges are accepted as written; consumers that need
    /// `start <= end` canonicalize through this.
    pub fn normalized(&self) -> Self {
        Self {
            start: self.start.min(self.end),
            end: self.start.max(self.end),
        }
    }

    /// Whether `vlan_id` falls inside the range, in either orientation
    pub fn contains(&self, vlan_id: i32) -> bool {
        let range = self.normalized();
        range.start <= vlan_id && vlan_id <= range.end
    }
}

/// VLAN configuration of a port.
///
/// The wire form is a flat record discriminated by `type`. Fields belonging
/// to a variant other than the active one are ignored when decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VlanSpecFields", into = "VlanSpecFields")]
pub enum VlanSpec {
    /// A single VLAN ID. Zero, or an absent ID, means no VLAN.
    Standard { vlan_id: Option<i32> },
    /// Ranges of allowed VLANs. Ranges may overlap.
    Trunk {
        trunk_range: Option<Vec<VlanTrunkRange>>,
    },
    /// A private VLAN ID
    Private { private_vlan_id: Option<i32> },
}

impl VlanSpec {
    pub fn standard(vlan_id: i32) -> Self {
        VlanSpec::Standard {
            vlan_id: Some(vlan_id),
        }
    }

    pub fn trunk(ranges: impl IntoIterator<Item = VlanTrunkRange>) -> Self {
        VlanSpec::Trunk {
            trunk_range: Some(ranges.into_iter().collect()),
        }
    }

    pub fn private(private_vlan_id: i32) -> Self {
        VlanSpec::Private {
            private_vlan_id: Some(private_vlan_id),
        }
    }

    pub fn vlan_type(&self) -> VlanType {
        match self {
            VlanSpec::Standard { .. } => VlanType::Standard,
            VlanSpec::Trunk { .. } => VlanType::Trunk,
            VlanSpec::Private { .. } => VlanType::Private,
        }
    }

    /// VLAN ID of a standard configuration, defaulting to 0
    pub fn vlan_id(&self) -> Option<i32> {
        match self {
            VlanSpec::Standard { vlan_id } => Some(vlan_id.unwrap_or(0)),
            _ => None,
        }
    }

    /// Trunk ranges of a trunk configuration
    pub fn trunk_ranges(&self) -> &[VlanTrunkRange] {
        match self {
            VlanSpec::Trunk {
                trunk_range: Some(ranges),
            } => ranges,
            _ => &[],
        }
    }
}

impl Default for VlanSpec {
    fn default() -> Self {
        VlanSpec::Standard { vlan_id: None }
    }
}

impl JsonSchema for VlanSpec {
    fn schema_name() -> String {
        "VlanSpec".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        VlanSpecFields::json_schema(gen)
    }
}

/// VLAN configuration of a port
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct VlanSpecFields {
    /// Type of VLAN configuration (standard, trunk, or private)
    r#type: VlanType,

    /// VLAN ID when type is standard; ignored otherwise.
    /// 0 means no VLAN, 1 to 4094 is a VLAN ID.
    #[serde(rename = "vlanID", default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "vlan_id_schema")]
    vlan_id: Option<i32>,

    /// Ranges of allowed VLANs when type is trunk; ignored otherwise.
    /// Overlapping ranges are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trunk_range: Option<Vec<VlanTrunkRange>>,

    /// Private VLAN ID when type is private; ignored otherwise
    #[serde(rename = "privateVlanID", default, skip_serializing_if = "Option::is_none")]
    private_vlan_id: Option<i32>,
}

// Absent IDs are defaulted to 0 by the API server
fn vlan_id_schema(gen: &mut SchemaGenerator) -> Schema {
    let mut schema = gen.subschema_for::<i32>().into_object();
    schema.number().minimum = Some(f64::from(VLAN_ID_MIN));
    schema.number().maximum = Some(f64::from(VLAN_ID_MAX));
    schema.metadata().default = Some(serde_json::json!(0));
    Schema::Object(schema)
}

fn false_by_default(gen: &mut SchemaGenerator) -> Schema {
    let mut schema = gen.subschema_for::<bool>().into_object();
    schema.metadata().default = Some(serde_json::json!(false));
    Schema::Object(schema)
}

impl From<VlanSpecFields> for VlanSpec {
    fn from(fields: VlanSpecFields) -> Self {
        match fields.r#type {
            VlanType::Standard => VlanSpec::Standard {
                vlan_id: fields.vlan_id,
            },
            VlanType::Trunk => VlanSpec::Trunk {
                trunk_range: fields.trunk_range,
            },
            VlanType::Private => VlanSpec::Private {
                private_vlan_id: fields.private_vlan_id,
            },
        }
    }
}

impl From<VlanSpec> for VlanSpecFields {
    fn from(spec: VlanSpec) -> Self {
        let r#type = spec.vlan_type();
        let mut fields = VlanSpecFields {
            r#type,
            vlan_id: None,
            trunk_range: None,
            private_vlan_id: None,
        };
        match spec {
            VlanSpec::Standard { vlan_id } => fields.vlan_id = vlan_id,
            VlanSpec::Trunk { trunk_range } => fields.trunk_range = trunk_range,
            VlanSpec::Private { private_vlan_id } => fields.private_vlan_id = private_vlan_id,
        }
        fields
    }
}

/// Policy applied when the MAC learning limit is exceeded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MacLimitPolicy {
    // New MAC addresses are still allowed
    Allow,
    // New MAC addresses are dropped
    Drop,
}

impl MacLimitPolicy {
    pub const ALL: [Self; 2] = [Self::Allow, Self::Drop];

    pub fn as_str(&self) -> &'static str {
        match self {
            MacLimitPolicy::Allow => "allow",
            MacLimitPolicy::Drop => "drop",
        }
    }
}

/// MAC learning policy configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MacLearningPolicy {
    /// Whether MAC learning is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Whether unlearned MACs are flooded for ingress traffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "false_by_default")]
    pub allow_unicast_flooding: Option<bool>,

    /// Maximum number of MAC addresses that can be learned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 4096))]
    pub limit: Option<i32>,

    /// Policy used when the limit is exceeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_policy: Option<MacLimitPolicy>,
}

impl MacLearningPolicy {
    pub fn unicast_flooding_allowed(&self) -> bool {
        self.allow_unicast_flooding.unwrap_or(false)
    }
}

/// MAC management policy configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MacManagementPolicy {
    /// Whether promiscuous mode is enabled, i.e. all traffic is seen on the port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "false_by_default")]
    pub allow_promiscuous: Option<bool>,

    /// Whether frames addressed to a MAC other than the configured one are received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_changes: Option<bool>,

    /// Whether the adapter may send traffic from a MAC other than its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forged_transmits: Option<bool>,

    /// MAC learning policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_learning_policy: Option<MacLearningPolicy>,
}

impl MacManagementPolicy {
    pub fn promiscuous_allowed(&self) -> bool {
        self.allow_promiscuous.unwrap_or(false)
    }
}

/// Port-level configuration of a vSphere Distributed Network
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDistributedPortConfig {
    /// VLAN configuration of the port. Unset until retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<VlanSpec>,

    /// MAC management policy of the port. Unset until retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_management_policy: Option<MacManagementPolicy>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vlan_spec_wire_names() {
        let value = serde_json::to_value(VlanSpec::standard(100)).unwrap();
        assert_eq!(value, json!({"type": "standard", "vlanID": 100}));

        let value = serde_json::to_value(VlanSpec::private(7)).unwrap();
        assert_eq!(value, json!({"type": "private", "privateVlanID": 7}));

        let value =
            serde_json::to_value(VlanSpec::trunk([VlanTrunkRange::new(100, 200)])).unwrap();
        assert_eq!(
            value,
            json!({"type": "trunk", "trunkRange": [{"start": 100, "end": 200}]})
        );
    }

    #[test]
    fn test_vlan_spec_ignores_inactive_variant_fields() {
        let spec: VlanSpec = serde_json::from_value(json!({
            "type": "standard",
            "vlanID": 12,
            "trunkRange": [{"start": 1, "end": 2}],
            "privateVlanID": 3
        }))
        .unwrap();
        assert_eq!(spec, VlanSpec::standard(12));

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value, json!({"type": "standard", "vlanID": 12}));
    }

    #[test]
    fn test_vlan_spec_keeps_zero_distinct_from_absent() {
        let absent: VlanSpec = serde_json::from_value(json!({"type": "standard"})).unwrap();
        let zero: VlanSpec = serde_json::from_value(json!({"type": "standard", "vlanID": 0})).unwrap();

        assert_ne!(absent, zero);
        assert_eq!(absent.vlan_id(), Some(0));
        assert_eq!(zero.vlan_id(), Some(0));
        assert_eq!(serde_json::to_value(&absent).unwrap(), json!({"type": "standard"}));
        assert_eq!(
            serde_json::to_value(&zero).unwrap(),
            json!({"type": "standard", "vlanID": 0})
        );
    }

    #[test]
    fn test_vlan_spec_rejects_unknown_type() {
        let result = serde_json::from_value::<VlanSpec>(json!({"type": "vxlan"}));
        assert!(result.is_err());

        let result = serde_json::from_value::<VlanSpec>(json!({"vlanID": 5}));
        assert!(result.is_err(), "type is required");
    }

    #[test]
    fn test_trunk_range_normalized_and_contains() {
        let reversed = VlanTrunkRange::new(300, 100);
        assert_eq!(reversed.normalized(), VlanTrunkRange::new(100, 300));
        assert!(reversed.contains(100));
        assert!(reversed.contains(300));
        assert!(!reversed.contains(301));

        let spec = VlanSpec::trunk([VlanTrunkRange::new(100, 200), VlanTrunkRange::new(150, 250)]);
        assert_eq!(spec.vlan_type(), VlanType::Trunk);
        assert_eq!(spec.trunk_ranges().len(), 2);
        assert_eq!(spec.vlan_id(), None);
    }

    #[test]
    fn test_mac_learning_policy_emission() {
        let policy = MacLearningPolicy::default();
        assert_eq!(serde_json::to_value(&policy).unwrap(), json!({"enabled": false}));

        let policy = MacLearningPolicy {
            enabled: true,
            allow_unicast_flooding: Some(true),
            limit: Some(4096),
            limit_policy: Some(MacLimitPolicy::Drop),
        };
        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "enabled": true,
                "allowUnicastFlooding": true,
                "limit": 4096,
                "limitPolicy": "drop"
            })
        );
    }

    #[test]
    fn test_mac_learning_policy_defaults_enabled() {
        let policy: MacLearningPolicy = serde_json::from_value(json!({})).unwrap();
        assert!(!policy.enabled);
        assert!(!policy.unicast_flooding_allowed());
    }

    #[test]
    fn test_mac_limit_policy_rejects_unknown_token() {
        let result = serde_json::from_value::<MacLearningPolicy>(json!({
            "enabled": true,
            "limitPolicy": "block"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_port_config_omits_unretrieved_fields() {
        let config = VSphereDistributedPortConfig::default();
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({}));

        let config = VSphereDistributedPortConfig {
            vlan: Some(VlanSpec::standard(0)),
            mac_management_policy: Some(MacManagementPolicy {
                allow_promiscuous: Some(false),
                mac_changes: Some(true),
                forged_transmits: None,
                mac_learning_policy: None,
            }),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "vlan": {"type": "standard", "vlanID": 0},
                "macManagementPolicy": {"allowPromiscuous": false, "macChanges": true}
            })
        );
        let decoded: VSphereDistributedPortConfig = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, config);
        assert!(!decoded.mac_management_policy.unwrap().promiscuous_allowed());
    }

    #[test]
    fn test_vlan_spec_schema_is_flat_record() {
        let schema = schemars::schema_for!(VlanSpec);
        let value = serde_json::to_value(&schema).unwrap();
        let properties = &value["properties"];
        assert!(properties.get("type").is_some());
        assert!(properties.get("vlanID").is_some());
        assert!(properties.get("trunkRange").is_some());
        assert!(properties.get("privateVlanID").is_some());
    }
}

use crate::scheme::{KnownType, SchemeObject, Scope};
use crate::v1alpha1::ip_pool::IPPoolReference;
use crate::v1alpha1::port_config::VSphereDistributedPortConfig;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ListMeta, Time};
use kube::core::{GroupVersionKind, ObjectList, TypeMeta};
use kube::{CustomResource, Resource};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of the list wrapper
pub const LIST_KIND: &str = "VSphereDistributedNetworkList";

/// VSphereDistributedNetwork represents a network backed by a vSphere
/// Distributed PortGroup on a vSphere Distributed Switch
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "netoperator.vmware.com",
    version = "v1alpha1",
    kind = "VSphereDistributedNetwork",
    plural = "vspheredistributednetworks",
    derive = "Default",
    derive = "PartialEq",
    status = "VSphereDistributedNetworkStatus",
    printcolumn = r#"{"name":"PortGroupID","type":"string","jsonPath":".spec.portGroupID"}"#,
    printcolumn = r#"{"name":"Mode","type":"string","jsonPath":".spec.ipAssignmentMode"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDistributedNetworkSpec {
    /// Identifier of an existing vSphere Distributed PortGroup
    #[serde(rename = "portGroupID")]
    pub port_group_id: String,

    /// IP assignment mode for network interfaces. Defaults to staticpool.
    /// With dhcp and none, ipPools, gateway and subnetMask must be empty.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_mode_as_unset"
    )]
    #[schemars(schema_with = "ip_assignment_mode_schema")]
    pub ip_assignment_mode: Option<IPAssignmentMode>,

    /// IPPool objects to allocate from. Only set with staticpool.
    pub ip_pools: Vec<IPPoolReference>,

    /// Gateway for network interfaces. Only set with staticpool.
    pub gateway: String,

    /// Subnet mask for network interfaces. Only set with staticpool.
    pub subnet_mask: String,
}

impl VSphereDistributedNetworkSpec {
    /// Spec allocating addresses from the given pools
    pub fn static_pool(
        port_group_id: impl Into<String>,
        ip_pools: Vec<IPPoolReference>,
        gateway: impl Into<String>,
        subnet_mask: impl Into<String>,
    ) -> Self {
        Self {
            port_group_id: port_group_id.into(),
            ip_assignment_mode: Some(IPAssignmentMode::StaticPool),
            ip_pools,
            gateway: gateway.into(),
            subnet_mask: subnet_mask.into(),
        }
    }

    /// Spec leaving address assignment to DHCP
    pub fn dhcp(port_group_id: impl Into<String>) -> Self {
        Self {
            port_group_id: port_group_id.into(),
            ip_assignment_mode: Some(IPAssignmentMode::Dhcp),
            ..Default::default()
        }
    }

    /// Spec assigning no address and configuring no DHCP client
    pub fn no_ip(port_group_id: impl Into<String>) -> Self {
        Self {
            port_group_id: port_group_id.into(),
            ip_assignment_mode: Some(IPAssignmentMode::None),
            ..Default::default()
        }
    }

    /// The assignment mode in force, applying the staticpool default
    pub fn effective_ip_assignment_mode(&self) -> IPAssignmentMode {
        self.ip_assignment_mode.unwrap_or_default()
    }
}

// An empty token is the same as leaving the mode unset.
fn empty_mode_as_unset<'de, D>(deserializer: D) -> Result<Option<IPAssignmentMode>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(token) => IPAssignmentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == token)
            .map(Some)
            .ok_or_else(|| D::Error::unknown_variant(token, IPAssignmentMode::TOKENS)),
    }
}

fn ip_assignment_mode_schema(gen: &mut SchemaGenerator) -> Schema {
    let mut schema = gen.subschema_for::<IPAssignmentMode>().into_object();
    schema
        .enum_values
        .get_or_insert_with(Vec::new)
        .push(serde_json::json!(""));
    Schema::Object(schema)
}

/// How network interfaces get their IP address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IPAssignmentMode {
    // Assigned dynamically using DHCP
    Dhcp,
    // Assigned from a static pool of addresses
    #[default]
    StaticPool,
    // No IP is assigned and no DHCP client is configured
    None,
}

impl IPAssignmentMode {
    pub const ALL: [Self; 3] = [Self::Dhcp, Self::StaticPool, Self::None];
    pub const TOKENS: &'static [&'static str] = &["dhcp", "staticpool", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            IPAssignmentMode::Dhcp => "dhcp",
            IPAssignmentMode::StaticPool => "staticpool",
            IPAssignmentMode::None => "none",
        }
    }
}

impl std::fmt::Display for IPAssignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state of a VSphereDistributedNetwork
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDistributedNetworkStatus {
    /// Current observed conditions, at most one per type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(schema_with = "conditions_schema")]
    pub conditions: Vec<VSphereDistributedNetworkCondition>,

    /// Port configuration applied to every port unless overridden per port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_port_config: Option<VSphereDistributedPortConfig>,
}

fn conditions_schema(gen: &mut SchemaGenerator) -> Schema {
    let mut schema = gen
        .subschema_for::<Vec<VSphereDistributedNetworkCondition>>()
        .into_object();
    schema
        .extensions
        .insert("x-kubernetes-list-type".to_string(), serde_json::json!("map"));
    schema
        .extensions
        .insert("x-kubernetes-list-map-keys".to_string(), serde_json::json!(["type"]));
    Schema::Object(schema)
}

/// Condition types reported on a VSphereDistributedNetwork.
///
/// Variants are declared in token order so sorting a condition list by type
/// matches sorting by the wire string.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum VSphereDistributedNetworkConditionType {
    // No valid IPPool reference exists
    IPPoolInvalid,
    // An IPPool is low on free addresses
    IPPoolPressure,
    // The PortGroupID does not exist, or vCenter Server could not be reached
    PortGroupFailure,
}

impl VSphereDistributedNetworkConditionType {
    pub const ALL: [Self; 3] = [Self::IPPoolInvalid, Self::IPPoolPressure, Self::PortGroupFailure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IPPoolInvalid => "IPPoolInvalid",
            Self::IPPoolPressure => "IPPoolPressure",
            Self::PortGroupFailure => "PortGroupFailure",
        }
    }

    /// Warnings do not mean provisioning has failed
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::IPPoolPressure)
    }
}

impl std::fmt::Display for VSphereDistributedNetworkConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a condition: True, False or Unknown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub const ALL: [Self; 3] = [Self::True, Self::False, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a VSphereDistributedNetwork at a certain point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDistributedNetworkCondition {
    /// Type of the condition
    pub r#type: VSphereDistributedNetworkConditionType,

    /// Status of the condition
    pub status: ConditionStatus,

    /// Machine readable reason for the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human readable details about the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// When the condition last moved from one status to another.
    /// Replaced, never merged, on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
}

impl VSphereDistributedNetworkCondition {
    pub fn new(r#type: VSphereDistributedNetworkConditionType, status: ConditionStatus) -> Self {
        Self {
            r#type,
            status,
            reason: None,
            message: None,
            last_transition_time: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_last_transition_time(mut self, time: Time) -> Self {
        self.last_transition_time = Some(time);
        self
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

impl VSphereDistributedNetwork {
    /// Conditions reported so far, empty before the first status write
    pub fn conditions(&self) -> &[VSphereDistributedNetworkCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    /// Default port configuration, if it has been retrieved
    pub fn default_port_config(&self) -> Option<&VSphereDistributedPortConfig> {
        self.status.as_ref()?.default_port_config.as_ref()
    }
}

impl SchemeObject for VSphereDistributedNetwork {
    fn known_type() -> KnownType {
        KnownType {
            gvk: GroupVersionKind::gvk(&Self::group(&()), &Self::version(&()), &Self::kind(&())),
            plural: Some(Self::plural(&()).into_owned()),
            scope: Scope::Cluster,
            list_of: None,
        }
    }
}

/// VSphereDistributedNetworkList contains a list of VSphereDistributedNetwork
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VSphereDistributedNetworkList {
    #[serde(flatten)]
    pub types: TypeMeta,

    #[serde(default)]
    pub metadata: ListMeta,

    pub items: Vec<VSphereDistributedNetwork>,
}

impl VSphereDistributedNetworkList {
    pub fn new(items: Vec<VSphereDistributedNetwork>) -> Self {
        Self {
            types: TypeMeta {
                api_version: VSphereDistributedNetwork::api_version(&()).into_owned(),
                kind: LIST_KIND.to_string(),
            },
            metadata: ListMeta::default(),
            items,
        }
    }
}

impl Default for VSphereDistributedNetworkList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<ObjectList<VSphereDistributedNetwork>> for VSphereDistributedNetworkList {
    fn from(list: ObjectList<VSphereDistributedNetwork>) -> Self {
        let mut converted = Self::new(list.items);
        converted.metadata = list.metadata;
        converted
    }
}

impl SchemeObject for VSphereDistributedNetworkList {
    fn known_type() -> KnownType {
        let item = VSphereDistributedNetwork::known_type();
        KnownType {
            gvk: GroupVersionKind::gvk(&item.gvk.group, &item.gvk.version, LIST_KIND),
            plural: None,
            scope: item.scope,
            list_of: Some(item.gvk.kind),
        }
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to an IPPool object.
///
/// The IPPool schema is owned by the IPAM provider; only enough of the
/// reference is modelled here to resolve it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IPPoolReference {
    /// Name of the IPPool
    pub name: String,

    /// API group of the IPPool, when not the default IPAM group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,

    /// Kind of the referent, when not `IPPool`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl IPPoolReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

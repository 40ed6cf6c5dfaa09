use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated account as returned by the whoami endpoint. Only `name` and `type` are
/// lifted out; everything else (orgs, email, auth details) stays in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubIdentity {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HubIdentity {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

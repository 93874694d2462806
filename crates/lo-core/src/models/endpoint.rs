use serde::Serialize;

/// Where the gateway's host address came from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AddressSource {
    Configured,
    Interface,
    OutboundRoute,
    Fallback,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentEndpoint {
    pub agent_id: String,
    pub url: String,
    pub source: AddressSource,
}

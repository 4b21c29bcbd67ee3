//! Backend payloads

use serde::{Deserialize, Serialize};

/// `GET /api/summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Requesting client, as seen by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,

    /// Server internals
    pub server: ServerInfo,
}

impl Summary {
    /// Whether the client is on the same network as the server
    pub fn is_local(&self) -> bool {
        self.client.as_ref().is_some_and(|c| c.is_local)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub is_local: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub hostname: String,

    /// Seconds since boot
    #[serde(default)]
    pub uptime_sec: f64,

    /// Server local time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(default)]
    pub os: String,

    #[serde(default)]
    pub arch: String,

    #[serde(default)]
    pub go_version: String,
}

/// `GET /api/ip`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<PublicIp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSection {
    #[serde(default)]
    pub host_ips: Vec<HostIp>,
}

/// Host address with its reverse DNS name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostIp {
    pub ip: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicIp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── Non-service configuration objects ──
//
// Only the fields callers inspect are typed; everything else rides along
// in `extra` so a fetch-edit-update cycle never drops server-side settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Proxy chain: an ordered list of hops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hops: Vec<HopConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A hop groups candidate nodes behind a selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HopConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub addr: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutherConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub auths: Vec<AuthConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// Address matcher list shared by admissions and bypasses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub whitelist: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type AdmissionConfig = MatcherConfig;
pub type BypassConfig = MatcherConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<NameserverConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameserverConfig {
    pub addr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub chain: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Static hostname mappings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostsConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<HostMappingConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMappingConfig {
    pub ip: String,
    pub hostname: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<IngressRuleConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressRuleConfig {
    pub hostname: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouterRouteConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterRouteConfig {
    pub net: String,
    pub gateway: String,
}

/// Traffic, connection or request-rate limiter. The `limits` entries are
/// GOST limit expressions such as `"$ 100MB 100MB"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub limits: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Plugin-backed objects (service discovery, observers, recorders) whose
/// bodies are opaque to the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type SdConfig = PluginConfig;
pub type ObserverConfig = PluginConfig;
pub type RecorderConfig = PluginConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<super::LogConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

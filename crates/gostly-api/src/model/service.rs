// ── Service resource, status and live counters ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GOST service (listener + handler pair) -- `POST /config/services`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<HandlerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listener: Option<ListenerConfig>,
    /// Runtime status. Only present in `GET /config` responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
    /// Forwarder, admissions, bypasses, limiters, metadata and anything
    /// else the server returns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceConfig {
    /// Live counters, if the server reported any.
    pub fn stats(&self) -> Option<&ServiceStats> {
        self.status.as_ref()?.stats.as_ref()
    }

    /// Server-side creation time; distinguishes a recreated service from
    /// a long-lived one with the same name.
    pub fn create_time(&self) -> Option<i64> {
        self.status.as_ref().map(|s| s.create_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Runtime status block attached to each service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Unix seconds.
    pub create_time: i64,
    pub state: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ServiceEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ServiceStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEvent {
    pub time: i64,
    pub msg: String,
}

/// Cumulative per-service counters.
///
/// `time` and the three rate fields are not part of the wire format:
/// they are filled in client-side after each fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceStats {
    pub total_conns: u64,
    pub current_conns: u64,
    pub total_errs: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,

    /// When these counters were captured.
    #[serde(skip)]
    pub time: Option<DateTime<Utc>>,
    /// New connections per second since the previous capture.
    #[serde(skip)]
    pub request_rate: f64,
    #[serde(skip)]
    pub input_rate_bytes: f64,
    #[serde(skip)]
    pub output_rate_bytes: f64,
}

//! Wire types for the GOST configuration API.
//!
//! [`Config`] is the full snapshot returned by `GET /config`. Resource lists
//! are ordered as the server returns them and keyed by `name`.

mod resources;
mod service;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use resources::*;
pub use service::*;

use crate::resource::ResourceKind;

/// A configuration object type with a fixed REST collection.
///
/// Types shared by several collections (e.g. [`LimiterConfig`] for
/// limiters, climiters and rlimiters) do not implement this; callers
/// name the kind explicitly instead.
pub trait Resource: Serialize + Send + Sync {
    const KIND: ResourceKind;

    fn name(&self) -> &str;
}

macro_rules! impl_resource {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Resource for $ty {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_resource! {
    ServiceConfig => Service,
    ChainConfig => Chain,
    HopConfig => Hop,
    AutherConfig => Auther,
    ResolverConfig => Resolver,
    HostsConfig => Hosts,
    IngressConfig => Ingress,
    RouterConfig => Router,
    LoggerConfig => Logger,
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Full configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<ChainConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hops: Vec<HopConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authers: Vec<AutherConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub admissions: Vec<AdmissionConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bypasses: Vec<BypassConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resolvers: Vec<ResolverConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<HostsConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingresses: Vec<IngressConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routers: Vec<RouterConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sds: Vec<SdConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub limiters: Vec<LimiterConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub climiters: Vec<LimiterConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rlimiters: Vec<LimiterConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observers: Vec<ObserverConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recorders: Vec<RecorderConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub loggers: Vec<LoggerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiling: Option<ProfilingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

impl Config {
    /// Look up a service by name.
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Names of every object in the collection for `kind`, in server order.
    pub fn names(&self, kind: ResourceKind) -> Vec<&str> {
        macro_rules! names {
            ($list:expr) => {
                $list.iter().map(|r| r.name.as_str()).collect()
            };
        }

        match kind {
            ResourceKind::Service => names!(self.services),
            ResourceKind::Chain => names!(self.chains),
            ResourceKind::Hop => names!(self.hops),
            ResourceKind::Auther => names!(self.authers),
            ResourceKind::Admission => names!(self.admissions),
            ResourceKind::Bypass => names!(self.bypasses),
            ResourceKind::Resolver => names!(self.resolvers),
            ResourceKind::Hosts => names!(self.hosts),
            ResourceKind::Ingress => names!(self.ingresses),
            ResourceKind::Router => names!(self.routers),
            ResourceKind::Sd => names!(self.sds),
            ResourceKind::Limiter => names!(self.limiters),
            ResourceKind::Climiter => names!(self.climiters),
            ResourceKind::Rlimiter => names!(self.rlimiters),
            ResourceKind::Observer => names!(self.observers),
            ResourceKind::Recorder => names!(self.recorders),
            ResourceKind::Logger => names!(self.loggers),
        }
    }
}

// ── Global settings ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TlsConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cert_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub common_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub addr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path_prefix: String,
    #[serde(rename = "accesslog", skip_serializing_if = "std::ops::Not::not")]
    pub access_log: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auther: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub addr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auther: String,
}

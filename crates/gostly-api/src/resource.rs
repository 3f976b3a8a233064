// ── Resource kinds and their REST collection paths ──

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Every configuration object type the GOST API exposes under `/config`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceKind {
    Service,
    Chain,
    Hop,
    Auther,
    Admission,
    Bypass,
    Resolver,
    Hosts,
    Ingress,
    Router,
    Sd,
    Limiter,
    Climiter,
    Rlimiter,
    Observer,
    Recorder,
    Logger,
}

impl ResourceKind {
    /// Collection path relative to the `/config` endpoint.
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::Service => "/services",
            Self::Chain => "/chains",
            Self::Hop => "/hops",
            Self::Auther => "/authers",
            Self::Admission => "/admissions",
            Self::Bypass => "/bypasses",
            Self::Resolver => "/resolvers",
            Self::Hosts => "/hosts",
            Self::Ingress => "/ingresses",
            Self::Router => "/routers",
            Self::Sd => "/sds",
            Self::Limiter => "/limiters",
            Self::Climiter => "/climiters",
            Self::Rlimiter => "/rlimiters",
            Self::Observer => "/observers",
            Self::Recorder => "/recorders",
            Self::Logger => "/loggers",
        }
    }
}

/// Serialization format for `POST /config` (server-side persistence).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn collection_paths_are_unique() {
        let paths: HashSet<_> = ResourceKind::iter().map(ResourceKind::collection_path).collect();
        assert_eq!(paths.len(), ResourceKind::iter().count());
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!(ResourceKind::from_str("Service").unwrap(), ResourceKind::Service);
        assert_eq!(ResourceKind::from_str("hosts").unwrap(), ResourceKind::Hosts);
        assert!(ResourceKind::from_str("widget").is_err());
    }

    #[test]
    fn bypass_pluralizes_with_es() {
        assert_eq!(ResourceKind::Bypass.collection_path(), "/bypasses");
        assert_eq!(ResourceKind::Ingress.collection_path(), "/ingresses");
    }
}

// GOST configuration API HTTP client
//
// Wraps `reqwest::Client` with base-URL normalization, optional basic
// auth, and `{code, msg}` error envelope decoding. Every call is a single
// attempt; retry policy belongs to the caller.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::model::Config;
use crate::options::{BasicAuth, ClientOptions};
use crate::resource::{ConfigFormat, ResourceKind};

const CONFIG_PATH: &str = "/config";

/// Error envelope returned by the GOST API on failure.
#[derive(Deserialize)]
struct ErrorResponse {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Async client for one GOST API endpoint.
///
/// Constructed with an empty URL it becomes a no-op stub: mutations
/// succeed without touching the network and [`get_config`](Self::get_config)
/// returns an empty snapshot. This models "no server configured yet".
#[derive(Debug, Clone)]
pub struct Client {
    remote: Option<Remote>,
}

#[derive(Debug, Clone)]
struct Remote {
    http: reqwest::Client,
    /// Scheme-qualified, no trailing slash.
    base_url: String,
    auth: Option<BasicAuth>,
}

impl Client {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `url` (e.g. `"127.0.0.1:18080"` or
    /// `"https://gost.example.com/api/"`).
    pub fn new(url: &str, options: &ClientOptions) -> Result<Self, Error> {
        let Some(base_url) = normalize_base_url(url) else {
            return Ok(Self::noop());
        };
        Url::parse(&base_url)?;

        Ok(Self {
            remote: Some(Remote {
                http: options.build_http()?,
                base_url,
                auth: options.auth.clone(),
            }),
        })
    }

    /// A client that never performs I/O.
    pub fn noop() -> Self {
        Self { remote: None }
    }

    /// Whether this is the no-op stub.
    pub fn is_noop(&self) -> bool {
        self.remote.is_none()
    }

    /// The effective base URL, `None` for the no-op stub.
    pub fn base_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.base_url.as_str())
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// `GET /config` -- the full configuration snapshot.
    pub async fn get_config(&self) -> Result<Config, Error> {
        let Some(remote) = &self.remote else {
            return Ok(Config::default());
        };

        let url = format!("{}{CONFIG_PATH}", remote.base_url);
        debug!("GET {url}");

        let resp = remote.send(remote.http.get(url)).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// `POST /config?format=..[&path=..]` -- ask the server to persist its
    /// running configuration.
    pub async fn save_config(&self, format: ConfigFormat, path: Option<&str>) -> Result<(), Error> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };

        let mut url = Url::parse(&format!("{}{CONFIG_PATH}", remote.base_url))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", format.as_ref());
            if let Some(path) = path.filter(|p| !p.is_empty()) {
                query.append_pair("path", path);
            }
        }
        debug!("POST {url}");

        remote.send(remote.http.post(url)).await?;
        Ok(())
    }

    // ── Resource CRUD ────────────────────────────────────────────────

    /// `POST /config/<collection>` with a JSON body.
    pub async fn create(&self, kind: ResourceKind, body: Vec<u8>) -> Result<(), Error> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };

        let url = remote.endpoint(kind, None)?;
        debug!("POST {url}");

        remote
            .send(json_body(remote.http.post(url), body))
            .await?;
        Ok(())
    }

    /// `PUT /config/<collection>/<name>` with a JSON body.
    pub async fn update(&self, kind: ResourceKind, name: &str, body: Vec<u8>) -> Result<(), Error> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };

        let url = remote.endpoint(kind, Some(name))?;
        debug!("PUT {url}");

        remote.send(json_body(remote.http.put(url), body)).await?;
        Ok(())
    }

    /// `DELETE /config/<collection>/<name>`.
    pub async fn delete(&self, kind: ResourceKind, name: &str) -> Result<(), Error> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };

        let url = remote.endpoint(kind, Some(name))?;
        debug!("DELETE {url}");

        remote.send(remote.http.delete(url)).await?;
        Ok(())
    }
}

impl Remote {
    /// `base + /config + collection [+ /name]`, with `name` percent-encoded.
    fn endpoint(&self, kind: ResourceKind, name: Option<&str>) -> Result<Url, Error> {
        let mut url = Url::parse(&format!(
            "{}{CONFIG_PATH}{}",
            self.base_url,
            kind.collection_path()
        ))?;
        if let Some(name) = name {
            url.path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
                .push(name);
        }
        Ok(url)
    }

    /// Shared request primitive: inject basic auth, send, and turn any
    /// non-200 status into [`Error::Api`].
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let builder = match &self.auth {
            Some(auth) => builder.basic_auth(&auth.username, Some(auth.password.expose_secret())),
            None => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status();
        if status == StatusCode::OK {
            Ok(resp)
        } else {
            Err(parse_error(status, resp).await)
        }
    }
}

fn json_body(builder: reqwest::RequestBuilder, body: Vec<u8>) -> reqwest::RequestBuilder {
    builder
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        return Error::Api {
            status: status.as_u16(),
            code: err.code,
            message: err.msg,
        };
    }

    let raw = raw.trim();
    Error::Api {
        status: status.as_u16(),
        code: i64::from(status.as_u16()),
        message: if raw.is_empty() {
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            raw.to_owned()
        },
    }
}

/// Prefix `http://` when no scheme is given and strip trailing slashes.
/// Returns `None` for an empty URL.
pub(crate) fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    Some(with_scheme.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        assert_eq!(
            normalize_base_url("example.com:8080").as_deref(),
            Some("http://example.com:8080")
        );
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(normalize_base_url("http://x/").as_deref(), Some("http://x"));
        assert_eq!(
            normalize_base_url("https://gost.local/api//").as_deref(),
            Some("https://gost.local/api")
        );
    }

    #[test]
    fn empty_url_is_none() {
        assert!(normalize_base_url("").is_none());
        assert!(normalize_base_url("   ").is_none());
    }

    #[test]
    fn client_exposes_normalized_base() {
        let client = Client::new("example.com:8080", &ClientOptions::default()).unwrap();
        assert_eq!(client.base_url(), Some("http://example.com:8080"));
        assert!(!client.is_noop());
    }

    #[test]
    fn empty_url_builds_noop_client() {
        let client = Client::new("", &ClientOptions::default()).unwrap();
        assert!(client.is_noop());
        assert!(client.base_url().is_none());
    }

    #[test]
    fn resource_names_are_percent_encoded() {
        let client = Client::new("http://x:1", &ClientOptions::default()).unwrap();
        let remote = client.remote.as_ref().unwrap();
        let url = remote.endpoint(ResourceKind::Service, Some("a b/c")).unwrap();
        assert_eq!(url.as_str(), "http://x:1/config/services/a%20b%2Fc");
    }
}

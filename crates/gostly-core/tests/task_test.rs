#![allow(clippy::unwrap_used)]
// Task and polling tests against a wiremock GOST API.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gostly_core::{
    Client, Config, ConfigFormat, RefreshConfig, ResourceKind, ResourceOp, Runner, SaveConfig,
    ServerConfig, ServiceConfig, Session,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Runner) {
    let server = MockServer::start().await;
    let client = Client::new(&server.uri(), &Default::default()).unwrap();
    (server, Runner::new(Session::new(client)))
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "msg": "OK" }))
}

fn snapshot(service: &str, total_conns: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "services": [{
            "name": service,
            "addr": ":8080",
            "status": {
                "createTime": 1_700_000_000,
                "state": "ready",
                "stats": { "totalConns": total_conns, "inputBytes": 0, "outputBytes": 0 }
            }
        }]
    }))
}

async fn mount_config(server: &MockServer, response: ResponseTemplate) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Wait until the session's snapshot satisfies `pred`.
async fn wait_for(session: &Session, pred: impl Fn(&Config) -> bool) {
    let mut rx = session.subscribe_config();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
}

fn never() -> CancellationToken {
    CancellationToken::new()
}

// ── Resource mutations ──────────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_payload() {
    let (server, runner) = setup().await;
    let payload = json!({ "name": "web", "addr": ":8080" });

    Mock::given(method("POST"))
        .and(path("/config/services"))
        .and(body_json(&payload))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let op = ResourceOp::create(ResourceKind::Service, "web", Some(payload));
    runner.exec(&op, &never()).await.unwrap();
}

#[tokio::test]
async fn test_typed_create_uses_resource_kind() {
    let (server, runner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/config/services"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let op = ResourceOp::create_resource(Some(ServiceConfig {
        name: "web".into(),
        addr: ":8080".into(),
        ..ServiceConfig::default()
    }));
    runner.exec(&op, &never()).await.unwrap();
}

#[tokio::test]
async fn test_update_targets_old_name() {
    let (server, runner) = setup().await;
    let payload = json!({ "name": "renamed", "mappings": [] });

    Mock::given(method("PUT"))
        .and(path("/config/hosts/old"))
        .and(body_json(&payload))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let op = ResourceOp::update(ResourceKind::Hosts, "old", Some(payload));
    runner.exec(&op, &never()).await.unwrap();
}

#[tokio::test]
async fn test_delete_hits_named_item() {
    let (server, runner) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/config/chains/chain-0"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    runner
        .exec(&ResourceOp::delete(ResourceKind::Chain, "chain-0"), &never())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_name_or_missing_payload_is_noop() {
    let (server, runner) = setup().await;

    Mock::given(any())
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    runner
        .exec(&ResourceOp::delete(ResourceKind::Service, ""), &never())
        .await
        .unwrap();
    runner
        .exec(
            &ResourceOp::update(ResourceKind::Service, "", Some(json!({}))),
            &never(),
        )
        .await
        .unwrap();
    runner
        .exec(
            &ResourceOp::<serde_json::Value>::create(ResourceKind::Service, "x", None),
            &never(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_is_returned_and_published() {
    let (server, runner) = setup().await;
    let mut rx = runner.subscribe();

    Mock::given(method("DELETE"))
        .and(path("/config/services/ghost"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "code": 404, "msg": "not found" })),
        )
        .mount(&server)
        .await;

    let err = runner
        .exec(&ResourceOp::delete(ResourceKind::Service, "ghost"), &never())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "404 not found");
    assert!(err.is_not_found());

    let event = rx.recv().await.unwrap();
    assert_eq!(event.task.to_string(), "delete_service");
    assert!(event.error.unwrap().is_not_found());
}

#[tokio::test]
async fn test_save_config_passes_format_and_path() {
    let (server, runner) = setup().await;

    Mock::given(method("POST"))
        .and(path("/config"))
        .and(query_param("format", "json"))
        .and(query_param("path", "/etc/gost/gost.json"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let save = SaveConfig::new(ConfigFormat::Json, Some("/etc/gost/gost.json".into()));
    runner.exec(&save, &never()).await.unwrap();
}

// ── Snapshot refresh ────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_installs_stamped_snapshot() {
    let (server, runner) = setup().await;
    mount_config(&server, snapshot("web", 10)).await;

    runner.exec(&RefreshConfig, &never()).await.unwrap();

    let cfg = runner.session().config();
    let stats = cfg.service("web").unwrap().stats().unwrap();
    assert_eq!(stats.total_conns, 10);
    assert!(stats.time.is_some());
}

#[tokio::test]
async fn test_refresh_derives_rates_from_previous_snapshot() {
    let (server, runner) = setup().await;

    mount_config(&server, snapshot("web", 100)).await;
    runner.exec(&RefreshConfig, &never()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    mount_config(&server, snapshot("web", 150)).await;
    runner.exec(&RefreshConfig, &never()).await.unwrap();

    let cfg = runner.session().config();
    assert!(cfg.service("web").unwrap().stats().unwrap().request_rate > 0.0);
}

#[tokio::test]
async fn test_counter_reset_gives_zero_rate() {
    let (server, runner) = setup().await;

    mount_config(&server, snapshot("web", 500)).await;
    runner.exec(&RefreshConfig, &never()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    mount_config(&server, snapshot("web", 3)).await;
    runner.exec(&RefreshConfig, &never()).await.unwrap();

    let cfg = runner.session().config();
    let stats = cfg.service("web").unwrap().stats().unwrap();
    assert_eq!(stats.total_conns, 3);
    assert!(stats.request_rate.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let (server, runner) = setup().await;

    mount_config(&server, snapshot("web", 1)).await;
    runner.exec(&RefreshConfig, &never()).await.unwrap();

    mount_config(&server, ResponseTemplate::new(200).set_body_string("not json")).await;
    let err = runner.exec(&RefreshConfig, &never()).await.unwrap_err();
    assert!(matches!(
        err.api_error(),
        Some(gostly_api::Error::Deserialization { .. })
    ));

    assert!(runner.session().config().service("web").is_some());
}

// ── Server switching ────────────────────────────────────────────────

#[tokio::test]
async fn test_switch_server_moves_polling() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;
    mount_config(&server_a, snapshot("from-a", 1)).await;
    mount_config(&server_b, snapshot("from-b", 1)).await;

    let runner = Runner::new(Session::default());
    let profile = |name: &str, url: String| ServerConfig {
        name: name.into(),
        url,
        interval: Duration::from_millis(50),
        ..ServerConfig::default()
    };

    runner
        .switch_server(&profile("a", server_a.uri()))
        .await
        .unwrap();
    wait_for(runner.session(), |c| c.service("from-a").is_some()).await;
    assert!(runner.is_polling().await);

    runner
        .switch_server(&profile("b", server_b.uri()))
        .await
        .unwrap();
    wait_for(runner.session(), |c| c.service("from-b").is_some()).await;
    assert!(runner.session().config().service("from-a").is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let hits_a = server_a.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(server_a.received_requests().await.unwrap().len(), hits_a);
    assert!(server_b.received_requests().await.unwrap().len() >= 2);

    runner.stop_polling().await;
    assert!(!runner.is_polling().await);
}

//! Keyed routing between a local and a default upstream.

use reqwest::StatusCode;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use gemini_relay::config::RoutingMode;

mod common;

const TARGET: &str = "/v1beta/models/gemini-pro:generateContent?alt=sse&note=a%20b";

struct Upstreams {
    local: MockServer,
    default: MockServer,
}

async fn upstreams() -> Upstreams {
    let local = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("local"))
        .mount(&local)
        .await;

    let default = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("default"))
        .mount(&default)
        .await;

    Upstreams { local, default }
}

fn keyed_config(upstreams: &Upstreams) -> gemini_relay::ProxyConfig {
    let mut config = common::config_for(&upstreams.default.uri());
    config.upstream.mode = RoutingMode::KeyedRouting;
    config.upstream.local_api_key = Some("secret".into());
    config.upstream.local_base_url = Some(upstreams.local.uri());
    config
}

#[tokio::test]
async fn matching_key_goes_local_with_path_and_query_intact() {
    let upstreams = upstreams().await;
    let relay = common::spawn_relay(keyed_config(&upstreams)).await;

    let res = common::client()
        .post(relay.url(TARGET))
        .header("x-api-key", "secret")
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    common::assert_cors(res.headers());
    assert_eq!(res.text().await.unwrap(), "local");

    let received = upstreams.local.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/v1beta/models/gemini-pro:generateContent");
    assert_eq!(received[0].url.query(), Some("alt=sse&note=a%20b"));
    assert!(upstreams.default.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_or_wrong_key_goes_default() {
    let upstreams = upstreams().await;
    let relay = common::spawn_relay(keyed_config(&upstreams)).await;
    let client = common::client();

    let res = client.post(relay.url(TARGET)).body("{}").send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "default");

    let res = client
        .post(relay.url(TARGET))
        .header("x-api-key", "not-the-secret")
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "default");

    let received = upstreams.default.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].headers["x-api-key"], "not-the-secret");
    assert!(received.iter().all(|r| r.url.query_pairs().all(|(k, _)| k != "key")));
    assert!(upstreams.local.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn edge_headers_are_stripped_and_the_rest_forwarded() {
    let upstreams = upstreams().await;
    let relay = common::spawn_relay(keyed_config(&upstreams)).await;

    let res = common::client()
        .post(relay.url(TARGET))
        .header("x-api-key", "secret")
        .header("content-type", "application/json")
        .header("x-goog-api-client", "genai-js/0.21.0")
        .header("cf-connecting-ip", "198.51.100.23")
        .header("cf-ipcountry", "NL")
        .header("cf-ray", "8a1b2c3d4e5f-AMS")
        .header("cf-worker", "relay.example.workers.dev")
        .header("x-real-ip", "198.51.100.23")
        .body(r#"{"contents":[]}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = upstreams.local.received_requests().await.unwrap();
    let headers = &received[0].headers;

    for stripped in ["cf-connecting-ip", "cf-ipcountry", "cf-ray", "cf-worker", "x-real-ip"] {
        assert!(headers.get(stripped).is_none(), "{stripped} leaked upstream");
    }
    assert_eq!(headers["x-api-key"], "secret");
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["x-goog-api-client"], "genai-js/0.21.0");
    assert_eq!(received[0].body, br#"{"contents":[]}"#);
}

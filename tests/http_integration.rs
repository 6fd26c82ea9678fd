// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport using wiremock.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use novastar_h::discovery::{ScanOptions, scan_network};
use novastar_h::protocol::{Codec, HttpClient, HttpConfig, Transport, payload};
use novastar_h::{Coordinator, CoordinatorConfig, Device, Target};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn config_for(server: &MockServer) -> HttpConfig {
    let address = server.address();
    HttpConfig::new(address.ip().to_string())
        .with_port(address.port())
        .with_timeout(Duration::from_secs(2))
}

fn client_for(server: &MockServer) -> HttpClient {
    config_for(server).into_client().unwrap()
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": 0, "msg": "ok", "body": body}))
}

fn rejected() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": 7, "msg": "unsupported"}))
}

async fn answer(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/open/api/{endpoint}")))
        .respond_with(ok(body))
        .mount(server)
        .await;
}

async fn bodies_sent_to(server: &MockServer, endpoint: &str) -> Vec<Value> {
    let wanted = format!("/open/api/{endpoint}");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == wanted)
        .map(|request| request.body_json::<Value>().unwrap())
        .collect()
}

// ============================================================================
// HttpClient Tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn request_is_a_signed_envelope() {
        let server = MockServer::start().await;
        answer(&server, "device/readDetail", json!({"deviceId": 0})).await;

        let client = config_for(&server)
            .with_credentials("project", "secret")
            .into_client()
            .unwrap();
        let reply = client
            .send("device/readDetail", &payload(json!({"deviceId": 0})))
            .await;
        assert_eq!(reply, Some(json!({"deviceId": 0})));

        let sent = bodies_sent_to(&server, "device/readDetail").await;
        let envelope = sent[0].as_object().unwrap();
        assert_eq!(envelope["body"], json!({"deviceId": 0}));
        assert_eq!(envelope["pId"], json!("project"));
        assert!(envelope["sign"].as_str().is_some_and(|s| !s.is_empty()));
        let timestamp = envelope["timeStamp"].as_str().unwrap();
        assert!(timestamp.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn non_200_is_no_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open/api/screen/readList"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.send("screen/readList", &payload(json!({}))).await.is_none());
    }

    #[tokio::test]
    async fn vendor_error_is_no_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open/api/preset/play"))
            .respond_with(rejected())
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.send("preset/play", &payload(json!({}))).await.is_none());
    }

    #[tokio::test]
    async fn data_key_is_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open/api/screen/readList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {},
                "data": {"screens": [{"screenId": 0}]},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = client.send("screen/readList", &payload(json!({}))).await;
        assert_eq!(reply, Some(json!({"screens": [{"screenId": 0}]})));
    }

    #[tokio::test]
    async fn missing_body_is_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open/api/screen/writeFreeze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 0})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = client.send("screen/writeFreeze", &payload(json!({}))).await;
        assert_eq!(reply, Some(json!({})));
    }

    #[tokio::test]
    async fn encrypted_round_trip() {
        let server = MockServer::start().await;
        let codec = Codec::new("project", "secret-key", true);
        let reply_body = codec
            .encrypt(&payload(json!({"brightness": 42})))
            .unwrap();
        answer(&server, "screen/readDetail", Value::String(reply_body)).await;

        let client = config_for(&server)
            .with_credentials("project", "secret-key")
            .with_encryption(true)
            .into_client()
            .unwrap();
        let reply = client
            .send("screen/readDetail", &payload(json!({"screenId": 0, "deviceId": 0})))
            .await;
        assert_eq!(reply, Some(json!({"brightness": 42})));

        let sent = bodies_sent_to(&server, "screen/readDetail").await;
        let ciphertext = sent[0]["body"].as_str().unwrap();
        assert_eq!(
            codec.decrypt(ciphertext).unwrap(),
            json!({"screenId": 0, "deviceId": 0})
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_no_result() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpConfig::new("127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_millis(500))
            .into_client()
            .unwrap();
        assert!(client.send("device/readDetail", &payload(json!({}))).await.is_none());
    }
}

// ============================================================================
// Device Tests
// ============================================================================

/// Answers `preset/readPlay` with the id last sent to `preset/play`.
struct PresetPlayer(Arc<AtomicI64>);

impl Respond for PresetPlayer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let envelope: Value = request.body_json().unwrap_or_default();
        if request.url.path().ends_with("preset/play") {
            let id = envelope["body"]["presetId"].as_i64().unwrap_or(-1);
            self.0.store(id, Ordering::SeqCst);
            return ok(json!({}));
        }
        ok(json!({"presetId": self.0.load(Ordering::SeqCst)}))
    }
}

async fn mount_processor(server: &MockServer, current: &Arc<AtomicI64>) {
    answer(server, "screen/readList", json!({"screens": [{"screenId": 0, "name": "Main"}]})).await;
    answer(
        server,
        "preset/readList",
        json!({"presets": [
            {"presetId": 1, "name": "Show A"},
            {"presetId": 2, "name": "Show B"},
        ]}),
    )
    .await;
    answer(server, "screen/readDetail", json!({"brightness": 55})).await;
    for endpoint in ["/open/api/preset/play", "/open/api/preset/readPlay"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(PresetPlayer(Arc::clone(current)))
            .mount(server)
            .await;
    }
}

mod device {
    use super::*;

    #[tokio::test]
    async fn preset_play_is_reported_by_next_poll() {
        let server = MockServer::start().await;
        let current = Arc::new(AtomicI64::new(1));
        mount_processor(&server, &current).await;

        let device = Device::http_config(config_for(&server)).build().unwrap();
        let target = Target::new(0, 0);

        let state = device.get_state(target).await.unwrap();
        assert_eq!(state.current_preset_id, 1);
        assert_eq!(state.brightness.value(), 55);
        assert_eq!(state.preset_labels(), vec!["Show A", "Show B"]);

        assert!(device.load_preset(target, 2).await);
        let plays = bodies_sent_to(&server, "preset/play").await;
        assert_eq!(plays[0]["body"], json!({"screenId": 0, "deviceId": 0, "presetId": 2}));

        let state = device.get_state(target).await.unwrap();
        assert_eq!(state.current_preset_id, 2);
        assert_eq!(state.current_preset_label().as_deref(), Some("Show B"));
    }

    #[tokio::test]
    async fn poll_fails_without_screen_list() {
        let server = MockServer::start().await;
        let device = Device::http_config(config_for(&server)).build().unwrap();
        assert!(device.get_state(Target::new(0, 0)).await.is_err());
    }

    #[tokio::test]
    async fn brightness_is_clamped_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open/api/screen/writeBrightness"))
            .and(body_partial_json(json!({"body": {"brightness": 100}})))
            .respond_with(ok(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let device = Device::http_config(config_for(&server)).build().unwrap();
        assert!(device.set_brightness(Target::new(0, 0), 150).await);
    }

    #[tokio::test]
    async fn audio_output_falls_through_to_screen_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open/api/audio/writeOutput"))
            .respond_with(rejected())
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/open/api/screen/writeAudioOutput"))
            .respond_with(ok(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let device = Device::http_config(config_for(&server)).build().unwrap();
        assert!(device.set_audio_output(Target::new(0, 0), 2).await);

        let sent = bodies_sent_to(&server, "screen/writeAudioOutput").await;
        assert_eq!(sent[0]["body"], json!({"screenId": 0, "deviceId": 0, "outputId": 2}));
    }

    #[tokio::test]
    async fn device_info_over_http() {
        let server = MockServer::start().await;
        answer(
            &server,
            "device/readDetail",
            json!({"deviceId": 1, "modelId": 15, "name": "Hall", "sn": "SN-9", "status": 1}),
        )
        .await;

        let device = Device::http_config(config_for(&server)).build().unwrap();
        assert!(device.can_connect().await);
        let info = device.device_info().await;
        assert_eq!(info.name, "Hall");
        assert_eq!(info.serial, "SN-9");
    }
}

// ============================================================================
// Coordinator and Discovery Tests
// ============================================================================

mod coordinator {
    use super::*;

    #[tokio::test]
    async fn connect_polls_and_selects_by_label() {
        let server = MockServer::start().await;
        let current = Arc::new(AtomicI64::new(1));
        mount_processor(&server, &current).await;

        let coordinator = Coordinator::connect(config_for(&server), CoordinatorConfig::new())
            .await
            .unwrap();
        assert_eq!(coordinator.current_preset_label().as_deref(), Some("Show A"));

        assert!(coordinator.select_preset_option("Show B").await);
        assert_eq!(coordinator.current_preset_label().as_deref(), Some("Show B"));

        coordinator.shutdown().await;
    }
}

mod discovery {
    use super::*;

    #[tokio::test]
    async fn scan_finds_processor() {
        let server = MockServer::start().await;
        answer(
            &server,
            "device/readDetail",
            json!({"deviceId": 0, "modelId": 0, "name": "", "sn": "SN-1"}),
        )
        .await;

        let options = ScanOptions::new()
            .with_port(server.address().port())
            .with_probe_timeout(Duration::from_secs(1));
        let found = scan_network(vec!["127.0.0.1".to_owned()], options).await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].host, "127.0.0.1");
        assert_eq!(found[0].serial, "SN-1");
        assert_eq!(found[0].name, "Novastar H Series");
    }

    #[tokio::test]
    async fn scan_skips_non_processors() {
        let server = MockServer::start().await;
        answer(&server, "device/readDetail", json!({"deviceId": 0})).await;

        let options = ScanOptions::new().with_port(server.address().port());
        let found = scan_network(vec!["127.0.0.1".to_owned()], options).await;
        assert!(found.is_empty());
    }
}

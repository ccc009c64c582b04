#![allow(clippy::unwrap_used)]
// Integration tests for `CameraLinkClient` against a wiremock camera.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use camlink_core::{
    CameraLinkClient, CaptureMode, CapturedImage, ClientOptions, CoreError, DeviceConfigPatch,
    LinkState, Timeouts,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn patch_for(server: &MockServer) -> DeviceConfigPatch {
    DeviceConfigPatch::new()
        .address("127.0.0.1")
        .port(server.address().port())
}

fn fast_client() -> CameraLinkClient {
    let fast = Duration::from_millis(300);
    CameraLinkClient::with_options(ClientOptions {
        timeouts: Timeouts {
            probe: fast,
            command: fast,
            capture: fast,
            discovery: fast,
        },
        connect_timeout: None,
    })
    .unwrap()
}

async fn mount_status(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// A client already connected to a fresh mock camera.
async fn connected() -> (MockServer, CameraLinkClient) {
    let server = MockServer::start().await;
    mount_status(&server, "{}").await;
    let client = CameraLinkClient::new().unwrap();
    assert!(client.connect(patch_for(&server)).await);
    (server, client)
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ── Connect ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_success_caches_stream_url() {
    let server = MockServer::start().await;
    mount_status(&server, r#"{"rssi":-65}"#).await;
    let client = CameraLinkClient::new().unwrap();

    assert!(client.connect(patch_for(&server)).await);

    let port = server.address().port();
    let status = client.get_status();
    assert!(status.connected);
    assert!(!status.streaming);
    assert_eq!(status.address, "127.0.0.1");
    assert_eq!(status.signal_strength, 70);
    assert!(status.last_connected_at.is_some());
    assert_eq!(
        client.get_stream_url(),
        Some(format!("http://127.0.0.1:{port}/stream"))
    );
}

#[tokio::test]
async fn test_connect_custom_stream_path() {
    let server = MockServer::start().await;
    mount_status(&server, "ok").await;
    let client = CameraLinkClient::new().unwrap();

    assert!(
        client
            .connect(patch_for(&server).stream_path("/mjpeg/1"))
            .await
    );

    let port = server.address().port();
    assert_eq!(
        client.get_stream_url(),
        Some(format!("http://127.0.0.1:{port}/mjpeg/1"))
    );
    assert_eq!(client.get_status().signal_strength, 0);
}

#[tokio::test]
async fn test_connect_not_found_leaves_disconnected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let client = CameraLinkClient::new().unwrap();

    let result = client.try_connect(patch_for(&server)).await;

    assert!(
        matches!(result, Err(CoreError::Rejected { status: 404, .. })),
        "expected Rejected, got: {result:?}"
    );
    assert!(!client.get_status().connected);
    assert_eq!(client.get_stream_url(), None);
}

#[tokio::test]
async fn test_connect_unreachable() {
    let client = CameraLinkClient::new().unwrap();

    let ok = client
        .connect(DeviceConfigPatch::new().address("127.0.0.1").port(closed_port()))
        .await;

    assert!(!ok);
    assert_eq!(client.get_status().state(), LinkState::Disconnected);
}

#[tokio::test]
async fn test_connect_invalid_config_sends_nothing() {
    let client = CameraLinkClient::new().unwrap();

    let result = client
        .try_connect(DeviceConfigPatch::new().address("127.0.0.1").port(0))
        .await;

    assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    assert!(!client.get_status().connected);
}

#[tokio::test]
async fn test_reconnect_after_lost_connection() {
    let (server, client) = connected().await;
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "{}").await;

    assert!(!client.check_connection().await);
    assert!(!client.get_status().connected);

    assert!(client.reconnect().await);
    assert!(client.get_status().connected);
}

#[tokio::test]
async fn test_reconnect_without_config() {
    let client = CameraLinkClient::new().unwrap();
    assert!(!client.reconnect().await);
}

// ── Timeouts ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_default_probe_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(8)))
        .mount(&server)
        .await;
    let client = CameraLinkClient::new().unwrap();

    let started = Instant::now();
    let result = client.try_connect(patch_for(&server)).await;
    let elapsed = started.elapsed();

    assert!(result.as_ref().is_err_and(CoreError::is_timeout), "got: {result:?}");
    assert!(elapsed >= Duration::from_millis(4900), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(7), "elapsed {elapsed:?}");
    assert!(!client.get_status().connected);
}

#[tokio::test]
async fn test_custom_timeouts_apply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let client = fast_client();

    let started = Instant::now();
    assert!(!client.connect(patch_for(&server)).await);
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ── Streaming ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_streaming_requires_connection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/start-stream"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = CameraLinkClient::new().unwrap();

    let result = client.try_start_streaming().await;

    assert!(matches!(result, Err(CoreError::NotConnected)));
    assert!(!client.get_status().streaming);
}

#[tokio::test]
async fn test_start_and_stop_streaming() {
    let (server, client) = connected().await;
    for route in ["/start-stream", "/stop-stream"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    assert!(client.start_streaming().await);
    assert_eq!(client.get_status().state(), LinkState::Streaming);

    assert!(client.stop_streaming().await);
    assert_eq!(client.get_status().state(), LinkState::Connected);
}

#[tokio::test]
async fn test_stop_streaming_when_not_streaming() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/stop-stream"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client.stop_streaming().await);
    assert!(!client.get_status().streaming);
    assert!(client.get_status().connected);
}

#[tokio::test]
async fn test_start_streaming_rejected_keeps_connection() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/start-stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client.start_streaming().await);

    let status = client.get_status();
    assert!(status.connected);
    assert!(!status.streaming);
}

// ── Capture ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_capture_reference_returns_url() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .expect(1)
        .mount(&server)
        .await;

    let image = client.capture_photo(CaptureMode::Reference).await.unwrap();

    assert_eq!(
        image,
        CapturedImage::Reference(format!("{}/capture", server.uri()))
    );
}

#[tokio::test]
async fn test_capture_embedded_returns_data_uri() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/capture"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
        )
        .mount(&server)
        .await;

    let image = client.capture_photo(CaptureMode::Embedded).await.unwrap();

    assert_eq!(image.to_uri(), "data:image/jpeg;base64,/9j/");
}

#[tokio::test]
async fn test_capture_while_disconnected_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/capture"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = CameraLinkClient::new().unwrap();

    assert!(client.capture_photo(CaptureMode::Embedded).await.is_none());
}

#[tokio::test]
async fn test_capture_failure_keeps_connection() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/capture"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.capture_photo(CaptureMode::Reference).await.is_none());
    assert!(client.get_status().connected);
}

// ── Disconnect ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_disconnect_resets_state() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/start-stream"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    assert!(client.start_streaming().await);

    client.disconnect();

    let status = client.get_status();
    assert!(!status.connected);
    assert!(!status.streaming);
    assert_eq!(status.signal_strength, 0);
    assert_eq!(client.get_stream_url(), None);
    assert!(client.get_config().is_none());

    // Idempotent.
    client.disconnect();
    assert!(!client.get_status().connected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disconnect_cancels_in_flight_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;
    let client = CameraLinkClient::new().unwrap();

    let pending = {
        let client = client.clone();
        let patch = patch_for(&server);
        tokio::spawn(async move { client.try_connect(patch).await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let started = Instant::now();
    client.disconnect();
    let result = pending.await.unwrap();

    assert!(matches!(result, Err(CoreError::Cancelled { .. })), "got: {result:?}");
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!client.get_status().connected);
    assert!(client.get_config().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disconnect_cancels_in_flight_capture() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/capture"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.capture_photo(CaptureMode::Embedded).await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let started = Instant::now();
    client.disconnect();

    assert!(pending.await.unwrap().is_none());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!client.get_status().connected);
}

// ── Superseded operations ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_connect_supersedes_in_flight_connect() {
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&slow)
        .await;
    let fast = MockServer::start().await;
    mount_status(&fast, "{}").await;
    let client = CameraLinkClient::new().unwrap();

    let first = {
        let client = client.clone();
        let patch = patch_for(&slow);
        tokio::spawn(async move { client.connect(patch).await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let started = Instant::now();
    assert!(client.connect(patch_for(&fast)).await);
    assert!(!first.await.unwrap());
    assert!(started.elapsed() < Duration::from_secs(1));

    let port = fast.address().port();
    assert!(client.get_status().connected);
    assert_eq!(client.get_config().unwrap().port, port);
    assert_eq!(
        client.get_stream_url(),
        Some(format!("http://127.0.0.1:{port}/stream"))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_capture_supersedes_in_flight_start_streaming() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/start-stream"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .mount(&server)
        .await;

    let start = {
        let client = client.clone();
        tokio::spawn(async move { client.try_start_streaming().await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let image = client.capture_photo(CaptureMode::Reference).await;
    assert!(image.is_some());

    let started = Instant::now();
    let result = start.await.unwrap();
    assert!(
        matches!(result, Err(CoreError::Cancelled { .. })),
        "{result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(1));

    let status = client.get_status();
    assert!(status.connected);
    assert!(!status.streaming);
}

// ── Connectivity check ──────────────────────────────────────────────

#[tokio::test]
async fn test_check_connection_failure_keeps_config() {
    let (server, client) = connected().await;
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client.check_connection().await);

    assert!(!client.get_status().connected);
    assert_eq!(client.get_stream_url(), None);
    assert_eq!(
        client.get_config().unwrap().port,
        server.address().port()
    );
}

#[tokio::test]
async fn test_check_connection_refreshes_signal() {
    let (server, client) = connected().await;
    server.reset().await;
    mount_status(&server, r#"{"rssi":-55}"#).await;

    assert!(client.check_connection().await);
    assert_eq!(client.get_status().signal_strength, 90);
}

#[tokio::test]
async fn test_check_connection_while_disconnected() {
    let client = CameraLinkClient::new().unwrap();
    let result = client.try_check_connection().await;
    assert!(matches!(result, Err(CoreError::NotConnected)));
}

// ── Config updates ──────────────────────────────────────────────────

#[tokio::test]
async fn test_update_config_recomputes_stream_url() {
    let (server, client) = connected().await;
    let port = server.address().port();

    client.update_config(&DeviceConfigPatch::new().stream_path("/live"));

    assert_eq!(
        client.get_stream_url(),
        Some(format!("http://127.0.0.1:{port}/live"))
    );
}

#[tokio::test]
async fn test_update_config_without_session_is_noop() {
    let client = CameraLinkClient::new().unwrap();

    client.update_config(&DeviceConfigPatch::new().port(8080));

    assert!(client.get_config().is_none());
    assert_eq!(client.get_stream_url(), None);
}

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let server = MockServer::start().await;
    mount_status(&server, "{}").await;
    let client = CameraLinkClient::new().unwrap();
    let mut rx = client.subscribe();

    assert!(client.connect(patch_for(&server)).await);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_connected());

    client.disconnect();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_connected());
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_scan_preserves_order_and_isolates_slow_candidates() {
    let first = MockServer::start().await;
    let slow = MockServer::start().await;
    let last = MockServer::start().await;
    mount_status(&first, "{}").await;
    mount_status(&last, "{}").await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&slow)
        .await;

    let candidate = |s: &MockServer| format!("127.0.0.1:{}", s.address().port());
    let candidates = vec![
        candidate(&last),
        candidate(&slow),
        format!("127.0.0.1:{}", closed_port()),
        candidate(&first),
    ];
    let client = fast_client();

    let started = Instant::now();
    let found = client.scan_candidates(&candidates, 80).await;

    assert_eq!(found, vec![candidate(&last), candidate(&first)]);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_scan_empty_when_nothing_answers() {
    let client = fast_client();
    let candidates = vec![format!("127.0.0.1:{}", closed_port())];

    assert!(client.scan_candidates(&candidates, 80).await.is_empty());
}

#[tokio::test]
async fn test_scan_does_not_touch_session() {
    let (server, client) = connected().await;
    let before = client.get_status();

    let candidates = vec![format!("127.0.0.1:{}", server.address().port())];
    let found = client.scan_candidates(&candidates, 80).await;

    assert_eq!(found.len(), 1);
    assert_eq!(client.get_status(), before);
}

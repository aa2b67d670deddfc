//! End-to-end tests for the pendant HTTP service.
//!
//! These tests start the **real** server on an OS-assigned ephemeral port on
//! loopback, make actual HTTP requests via `reqwest`, and check both the
//! response bodies and what reached the host application.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, mpsc};
use std::time::{Duration, Instant};

use pendant_core::{
    CapabilityError, ControlState, ControlStateListener, HostBridge, HostCall, MachineHost,
    PendantConfig, PendantSettings,
};
use pendant_web::{PendantServer, ServerConfig, ServerError};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Host double that records every capability call.
#[derive(Default, Clone)]
struct MockHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    fail_homing: bool,
}

impl MockHost {
    fn record(&self, call: HostCall) -> Result<(), CapabilityError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl MachineHost for MockHost {
    fn send_command(&mut self, command: &str) -> Result<(), CapabilityError> {
        self.record(HostCall::SendCommand(command.to_owned()))
    }

    fn adjust_manual_location(
        &mut self,
        dir_x: i32,
        dir_y: i32,
        dir_z: i32,
        step_size: f64,
    ) -> Result<(), CapabilityError> {
        self.record(HostCall::AdjustManualLocation {
            dir_x,
            dir_y,
            dir_z,
            step_size,
        })
    }

    fn home_machine(&mut self) -> Result<(), CapabilityError> {
        if self.fail_homing {
            return Err(CapabilityError::new("homing not enabled"));
        }
        self.record(HostCall::HomeMachine)
    }

    fn clear_alarm_lock(&mut self) -> Result<(), CapabilityError> {
        self.record(HostCall::ClearAlarmLock)
    }

    fn toggle_check_mode(&mut self) -> Result<(), CapabilityError> {
        self.record(HostCall::ToggleCheckMode)
    }
}

/// Host whose homing cycle hangs until released.
struct StallingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    release: mpsc::Receiver<()>,
}

impl StallingHost {
    fn new() -> (Self, mpsc::Sender<()>) {
        let (release_tx, release) = mpsc::channel();
        let host = Self {
            calls: Arc::default(),
            release,
        };
        (host, release_tx)
    }

    fn record(&self, call: HostCall) -> Result<(), CapabilityError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl MachineHost for StallingHost {
    fn send_command(&mut self, command: &str) -> Result<(), CapabilityError> {
        self.record(HostCall::SendCommand(command.to_owned()))
    }

    fn adjust_manual_location(
        &mut self,
        dir_x: i32,
        dir_y: i32,
        dir_z: i32,
        step_size: f64,
    ) -> Result<(), CapabilityError> {
        self.record(HostCall::AdjustManualLocation {
            dir_x,
            dir_y,
            dir_z,
            step_size,
        })
    }

    fn home_machine(&mut self) -> Result<(), CapabilityError> {
        // Blocks until released or the sender is dropped.
        let _ = self.release.recv();
        Ok(())
    }

    fn clear_alarm_lock(&mut self) -> Result<(), CapabilityError> {
        self.record(HostCall::ClearAlarmLock)
    }

    fn toggle_check_mode(&mut self) -> Result<(), CapabilityError> {
        self.record(HostCall::ToggleCheckMode)
    }
}

fn loopback_config() -> ServerConfig {
    ServerConfig {
        bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
    }
}

fn server_with(host: MockHost) -> PendantServer {
    let bridge = HostBridge::spawn(host).expect("spawn host thread");
    PendantServer::new(
        loopback_config(),
        PendantSettings::new(PendantConfig::default()),
        bridge,
    )
}

/// Start `server` and return the first advertised URL.
async fn start(server: &PendantServer) -> String {
    let urls = server.start().await.expect("server should start");
    urls[0].url().to_owned()
}

async fn get(url: &str) -> (u16, String) {
    let resp = reqwest::get(url).await.expect("request failed");
    let status = resp.status().as_u16();
    let body = resp.text().await.expect("failed to read body");
    (status, body)
}

// ── full session ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn pendant_session_round_trip() {
    let host = MockHost::default();
    let calls = Arc::clone(&host.calls);
    let server = server_with(host);
    let url = start(&server).await;
    assert!(url.starts_with("http://127.0.0.1:"));

    // Initial state.
    let (status, body) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "COMM_DISCONNECTED");

    // The host pushes a state change through the listener.
    server
        .control_state_listener()
        .control_state_changed(ControlState::CommIdle);

    // Pendant page.
    let (status, page) = get(&url).await;
    assert_eq!(status, 200);
    assert!(page.contains("/sendGcode"));

    // Raw command forwarding.
    let (status, body) = get(&format!("{url}/sendGcode?gCode=MyGcode")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "COMM_IDLE");
    assert_eq!(
        calls.lock().unwrap().last(),
        Some(&HostCall::SendCommand("MyGcode".into()))
    );

    // Privileged tokens.
    for token in ["$H", "$X", "$C"] {
        let (status, body) = get(&format!("{url}/sendGcode?gCode={token}")).await;
        assert_eq!(status, 200);
        assert_eq!(body, "COMM_IDLE");
    }

    // Jogging.
    let (status, body) = get(&format!(
        "{url}/adjustManualLocation?dirX=1&dirY=2&dirZ=3&stepSize=4.0"
    ))
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, "COMM_IDLE");

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            HostCall::SendCommand("MyGcode".into()),
            HostCall::HomeMachine,
            HostCall::ClearAlarmLock,
            HostCall::ToggleCheckMode,
            HostCall::AdjustManualLocation {
                dir_x: 1,
                dir_y: 2,
                dir_z: 3,
                step_size: 4.0,
            },
        ]
    );

    // State follows the host.
    server.update_controls_for_state(ControlState::CommSending);
    let (_, body) = get(&format!("{url}/getControlState")).await;
    assert_eq!(body, "COMM_SENDING");
    assert!(!server.is_manual_control_enabled());

    // Config, under both paths, always fresh.
    let (status, body) = get(&format!("{url}/UGSPendantConfig.json")).await;
    assert_eq!(status, 200);
    assert!(body.contains("shortCutButtonList"));

    server.settings().add_step_size_option(
        "newStepSizeOptionValue",
        "newStepSizeOptionLabel",
        false,
    );
    let (_, body) = get(&format!("{url}/config")).await;
    assert!(body.contains("newStepSizeOptionValue"));

    server.stop().await;
    assert!(server.is_stopped());
    assert!(
        reqwest::get(format!("{url}/getControlState")).await.is_err(),
        "stopped server must not answer"
    );
}

// ── content types ────────────────────────────────────────────────────────────

#[tokio::test]
async fn config_is_json_and_state_is_plain_text() {
    let server = server_with(MockHost::default());
    let url = start(&server).await;

    let resp = reqwest::get(format!("{url}/config")).await.expect("request");
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    assert!(content_type.contains("application/json"), "got {content_type}");
    let json: serde_json::Value = resp.json().await.expect("invalid JSON");
    assert!(json["stepSizeList"].is_array());
    assert_eq!(json["shortCutButtonList"][0]["label"], "Return to Zero");

    let resp = reqwest::get(format!("{url}/getControlState"))
        .await
        .expect("request");
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    assert!(content_type.contains("text/plain"), "got {content_type}");

    let (status, _) = get(&format!("{url}/no/such/route")).await;
    assert_eq!(status, 404);

    server.stop().await;
}

// ── request-level failures ───────────────────────────────────────────────────

#[tokio::test]
async fn malformed_requests_are_rejected_without_reaching_host() {
    let host = MockHost::default();
    let calls = Arc::clone(&host.calls);
    let server = server_with(host);
    let url = start(&server).await;

    for query in [
        "dirX=1&dirY=2&stepSize=4.0",
        "dirX=one&dirY=2&dirZ=3&stepSize=4.0",
        "dirX=1&dirY=2&dirZ=3&stepSize=far",
    ] {
        let (status, _) = get(&format!("{url}/adjustManualLocation?{query}")).await;
        assert_eq!(status, 400, "query {query:?} should be rejected");
    }

    let (status, _) = get(&format!("{url}/sendGcode")).await;
    assert_eq!(status, 400);

    assert!(calls.lock().unwrap().is_empty());

    // The server keeps serving.
    let (status, _) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);

    server.stop().await;
}

#[tokio::test]
async fn failing_privileged_action_is_a_server_error() {
    let host = MockHost {
        fail_homing: true,
        ..MockHost::default()
    };
    let calls = Arc::clone(&host.calls);
    let server = server_with(host);
    let url = start(&server).await;

    let (status, body) = get(&format!("{url}/sendGcode?gCode=$H")).await;
    assert_eq!(status, 500);
    assert!(body.contains("homing not enabled"), "body: {body}");

    // Other requests are unaffected.
    let (status, _) = get(&format!("{url}/sendGcode?gCode=$X")).await;
    assert_eq!(status, 200);
    assert_eq!(*calls.lock().unwrap(), vec![HostCall::ClearAlarmLock]);

    server.stop().await;
}

#[tokio::test]
async fn missing_host_is_service_unavailable() {
    let (bridge, mailbox) = HostBridge::channel();
    drop(mailbox);
    let server = PendantServer::new(loopback_config(), PendantSettings::default(), bridge);
    let url = start(&server).await;

    let (status, _) = get(&format!("{url}/sendGcode?gCode=G0")).await;
    assert_eq!(status, 503);

    server.stop().await;
}

// ── lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lifecycle_misuse_keeps_state_consistent() {
    let server = server_with(MockHost::default());
    assert!(server.is_stopped());

    // Stopping a stopped server is a no-op.
    server.stop().await;
    assert!(server.is_stopped());

    let url = start(&server).await;
    assert!(!server.is_stopped());
    let addr = server.local_addr().await.expect("running server has an address");

    let err = server.start().await.unwrap_err();
    assert!(matches!(err, ServerError::AlreadyRunning { addr: a } if a == addr));
    assert!(!server.is_stopped());
    let (status, _) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);

    server.stop().await;
    assert!(server.is_stopped());
    assert!(server.local_addr().await.is_none());

    // Restart works after a stop.
    let url = start(&server).await;
    let (status, _) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);
    server.stop().await;
}

#[tokio::test]
async fn port_in_use_fails_start() {
    let first = server_with(MockHost::default());
    first.start().await.expect("first server starts");
    let taken = first.local_addr().await.expect("addr").port();

    let second = server_with(MockHost::default());
    second.set_port(taken);
    let err = second.start().await.unwrap_err();
    assert!(matches!(err, ServerError::Bind { .. }), "got {err:?}");
    assert!(second.is_stopped());

    first.stop().await;
}

#[tokio::test]
async fn port_can_be_set_in_any_state() {
    let server = server_with(MockHost::default());
    server.set_port(999);
    assert_eq!(server.port(), 999);

    server.set_port(0);
    let url = start(&server).await;
    let bound = server.local_addr().await.expect("addr");

    server.set_port(999);
    assert_eq!(server.port(), 999);

    // No hot rebinding: the running socket stays where it was.
    assert_eq!(server.local_addr().await, Some(bound));
    let (status, _) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);

    server.stop().await;
}

#[tokio::test]
async fn default_url_list_uses_port_8080() {
    let bridge = HostBridge::spawn(MockHost::default()).expect("spawn host");
    let server = PendantServer::new(ServerConfig::default(), PendantSettings::default(), bridge);

    let urls = server.url_list().await.expect("resolve urls");
    let first = urls[0].url();
    assert!(first.starts_with("http://"));
    assert!(first.contains("8080"));
}

#[tokio::test]
async fn stop_releases_port_when_requests_hang() {
    let (host, release) = StallingHost::new();
    let bridge = HostBridge::spawn(host)
        .expect("spawn host")
        .with_timeout(Duration::from_secs(30));
    let server = PendantServer::new(loopback_config(), PendantSettings::default(), bridge);
    let url = start(&server).await;
    let port = server.local_addr().await.expect("addr").port();

    let hung = tokio::spawn(reqwest::get(format!("{url}/sendGcode?gCode=$H")));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Outlives the shutdown grace period, so the serve task is aborted.
    server.stop().await;
    assert!(server.is_stopped());

    server.set_port(port);
    let url = start(&server).await;
    let (status, _) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);

    hung.abort();
    drop(release);
    server.stop().await;
}

// ── stalled host ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stalled_host_call_times_out_and_abandoned_calls_never_run() {
    let (host, release) = StallingHost::new();
    let calls = Arc::clone(&host.calls);
    let bridge = HostBridge::spawn(host)
        .expect("spawn host")
        .with_timeout(Duration::from_millis(300));
    let server = PendantServer::new(loopback_config(), PendantSettings::default(), bridge);
    let url = start(&server).await;

    let started = Instant::now();
    let (status, body) = get(&format!("{url}/sendGcode?gCode=$H")).await;
    assert_eq!(status, 504);
    assert!(body.contains("home_machine"), "body: {body}");

    // A second connection is queued behind the stalled call but still gets
    // an answer within the time limit.
    let (status, _) = get(&format!("{url}/sendGcode?gCode=G0X1")).await;
    assert_eq!(status, 504);
    assert!(started.elapsed() < Duration::from_secs(5));

    // State reads never wait on the host.
    let (status, body) = get(&format!("{url}/getControlState")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "COMM_DISCONNECTED");

    // Once the host recovers, the abandoned command is skipped.
    release.send(()).expect("host is waiting");
    let (status, _) = get(&format!("{url}/sendGcode?gCode=$X")).await;
    assert_eq!(status, 200);
    assert_eq!(*calls.lock().unwrap(), vec![HostCall::ClearAlarmLock]);

    server.stop().await;
}

// ── status and urls ──────────────────────────────────────────────────────────

#[tokio::test]
async fn control_status_reports_server_side_gating() {
    let server = server_with(MockHost::default());
    let url = start(&server).await;

    for (state, enabled) in [
        (ControlState::CommDisconnected, false),
        (ControlState::CommSendingPaused, true),
        (ControlState::CommSending, false),
        (ControlState::FileSelected, true),
    ] {
        server.update_controls_for_state(state);
        let json: serde_json::Value = reqwest::get(format!("{url}/getControlStatus"))
            .await
            .expect("request")
            .json()
            .await
            .expect("invalid JSON");
        assert_eq!(json["state"], state.as_str());
        assert_eq!(json["manualControlEnabled"], enabled);
    }

    server.stop().await;
}

#[tokio::test]
async fn url_list_needs_an_assigned_port() {
    let server = server_with(MockHost::default());
    let err = server.url_list().await.unwrap_err();
    assert!(matches!(err, ServerError::PortUnassigned), "got {err:?}");

    start(&server).await;
    let bound = server.local_addr().await.expect("addr").port();
    let urls = server.url_list().await.expect("running server has urls");
    assert_eq!(urls[0].url(), format!("http://127.0.0.1:{bound}"));

    server.stop().await;
}

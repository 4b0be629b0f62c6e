//! End-to-end tests driving a live in-process coordinator over HTTP and
//! WebSocket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use marquee_coordinator::{Server, catalog::VideoEntry};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn test_catalog() -> Vec<VideoEntry> {
    ["1", "2", "3"]
        .iter()
        .map(|id| VideoEntry {
            id: id.to_string(),
            title: Some(format!("Video {}", id)),
        })
        .collect()
}

/// Start a coordinator on `port` and wait until it answers health checks.
async fn start_server(port: u16, auth_password: Option<String>) {
    let server = Server::new(test_catalog(), auth_password);
    tokio::spawn(async move {
        if let Err(e) = server.run("127.0.0.1".to_string(), port).await {
            eprintln!("test server error: {}", e);
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client
            .get(format!("http://127.0.0.1:{}/api/health", port))
            .send()
            .await
        {
            if resp.status() == 200 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("test server on port {} did not come up", port);
}

async fn connect_ws(port: u16, client_type: &str, client_id: &str) -> WsStream {
    let (mut ws, _response) = connect_async(format!("ws://127.0.0.1:{}/ws", port))
        .await
        .expect("WebSocket connect failed");
    let handshake = format!(
        r#"{{"type":"connection","clientType":"{}","clientId":"{}"}}"#,
        client_type, client_id
    );
    ws.send(Message::Text(handshake.into()))
        .await
        .expect("handshake send failed");
    ws
}

/// Next text frame as JSON, or None if the connection closed.
async fn recv_json(ws: &mut WsStream) -> Option<serde_json::Value> {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")?;
        match frame {
            Ok(Message::Text(text)) => {
                return Some(serde_json::from_str(&text).expect("frame is not JSON"));
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// True when nothing arrives on `ws` for a short grace period.
async fn assert_silent(ws: &mut WsStream) {
    let result = timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected no frame, got {:?}", result);
}

#[tokio::test]
async fn test_health_endpoint() {
    // given:
    let port = 19180;
    start_server(port, None).await;

    // when:
    let resp = reqwest::get(format!("http://127.0.0.1:{}/api/health", port))
        .await
        .unwrap();

    // then:
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_videos_snapshot_starts_stopped() {
    let port = 19181;
    start_server(port, None).await;

    let body: serde_json::Value = reqwest::get(format!("http://127.0.0.1:{}/api/videos", port))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let videos = body.as_array().unwrap();
    assert_eq!(videos.len(), 3);
    assert!(videos.iter().all(|v| v["isPlaying"] == false));
    assert_eq!(videos[0]["title"], "Video 1");
}

#[tokio::test]
async fn test_http_command_updates_table() {
    // given:
    let port = 19182;
    start_server(port, None).await;
    let client = reqwest::Client::new();

    // when: a command arrives over the HTTP surface
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/command", port))
        .json(&serde_json::json!({"action": "start", "id": "2"}))
        .send()
        .await
        .unwrap();

    // then:
    assert_eq!(resp.status(), 204);

    let body: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/videos", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let two = body
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == "2")
        .unwrap()
        .clone();
    assert_eq!(two["isPlaying"], true);
}

#[tokio::test]
async fn test_duplicate_player_connection_closed() {
    // given: a registered player
    let port = 19183;
    start_server(port, None).await;
    let _player = connect_ws(port, "player", "device-1").await;

    // when: a second player handshakes
    let mut duplicate = connect_ws(port, "player", "device-2").await;

    // then: its transport is closed without receiving anything
    let frame = recv_json(&mut duplicate).await;
    assert!(frame.is_none(), "duplicate player should be disconnected");
}

#[tokio::test]
async fn test_full_relay_scenario() {
    // given: a player and two observers; both observers got a snapshot
    let port = 19184;
    start_server(port, None).await;
    let mut player = connect_ws(port, "player", "device-1").await;
    let mut observer_a = connect_ws(port, "observer", "a").await;
    let mut observer_b = connect_ws(port, "observer", "b").await;

    let snapshot = recv_json(&mut observer_a).await.unwrap();
    assert_eq!(snapshot["type"], "snapshot");
    assert_eq!(snapshot["videos"].as_array().unwrap().len(), 3);
    recv_json(&mut observer_b).await.unwrap();

    // when: observer A starts video "3"
    observer_a
        .send(Message::Text(
            r#"{"type":"command","action":"start","id":"3","clientType":"observer"}"#.into(),
        ))
        .await
        .unwrap();

    // then: the player receives the command
    let forwarded = recv_json(&mut player).await.unwrap();
    assert_eq!(forwarded["type"], "command");
    assert_eq!(forwarded["action"], "start");
    assert_eq!(forwarded["id"], "3");

    // observer B is notified, A is not
    let notify = recv_json(&mut observer_b).await.unwrap();
    assert_eq!(notify["type"], "notify");
    assert_eq!(notify["id"], "3");
    assert_eq!(notify["action"], "start");
    assert_silent(&mut observer_a).await;

    // and the table shows the optimistic update
    let body: serde_json::Value = reqwest::get(format!("http://127.0.0.1:{}/api/videos", port))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let three = body
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == "3")
        .unwrap()
        .clone();
    assert_eq!(three["isPlaying"], true);

    // when: the player reports the video stopped (process exited)
    player
        .send(Message::Text(
            r#"{"type":"command","action":"stop","id":"3","clientType":"player"}"#.into(),
        ))
        .await
        .unwrap();

    // then: ALL observers are notified, the original sender included
    for observer in [&mut observer_a, &mut observer_b] {
        let notify = recv_json(observer).await.unwrap();
        assert_eq!(notify["type"], "notify");
        assert_eq!(notify["id"], "3");
        assert_eq!(notify["action"], "stop");
    }

    // and the table is corrected
    let body: serde_json::Value = reqwest::get(format!("http://127.0.0.1:{}/api/videos", port))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let three = body
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == "3")
        .unwrap()
        .clone();
    assert_eq!(three["isPlaying"], false);
}

#[tokio::test]
async fn test_late_observer_gets_current_state() {
    // given: video "1" started before the observer exists
    let port = 19185;
    start_server(port, None).await;
    let client = reqwest::Client::new();
    client
        .post(format!("http://127.0.0.1:{}/api/command", port))
        .json(&serde_json::json!({"action": "start", "id": "1"}))
        .send()
        .await
        .unwrap();

    // when: an observer joins afterwards
    let mut observer = connect_ws(port, "observer", "late").await;

    // then: its snapshot already reflects the earlier command
    let snapshot = recv_json(&mut observer).await.unwrap();
    let videos = snapshot["videos"].as_array().unwrap();
    let one = videos.iter().find(|v| v["id"] == "1").unwrap();
    assert_eq!(one["isPlaying"], true);
}

#[tokio::test]
async fn test_malformed_ws_message_is_dropped() {
    // given:
    let port = 19186;
    start_server(port, None).await;
    let mut player = connect_ws(port, "player", "device-1").await;
    let mut observer = connect_ws(port, "observer", "a").await;
    recv_json(&mut observer).await.unwrap();

    // when: garbage and an unknown action arrive from the observer
    observer
        .send(Message::Text("not json".into()))
        .await
        .unwrap();
    observer
        .send(Message::Text(
            r#"{"type":"command","action":"rewind","id":"1","clientType":"observer"}"#.into(),
        ))
        .await
        .unwrap();

    // then: nothing reaches the player and no state changed
    assert_silent(&mut player).await;
    let body: serde_json::Value = reqwest::get(format!("http://127.0.0.1:{}/api/videos", port))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.as_array().unwrap().iter().all(|v| v["isPlaying"] == false));
}

#[tokio::test]
async fn test_auth_protects_http_surface() {
    // given: a coordinator with a password configured
    let port = 19187;
    start_server(port, Some("hunter2".to_string())).await;
    let client = reqwest::Client::new();

    // then: the table is unreachable without a token
    let resp = client
        .get(format!("http://127.0.0.1:{}/api/videos", port))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // and the wrong password earns nothing
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/auth", port))
        .json(&serde_json::json!({"password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // when: the right password is presented
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/auth", port))
        .json(&serde_json::json!({"password": "hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let token = resp.json::<serde_json::Value>().await.unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    // then: the token unlocks the endpoints
    let resp = client
        .get(format!("http://127.0.0.1:{}/api/videos", port))
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_observer_reconnect_replaces_old_socket() {
    // given: an observer connected as "kiosk"
    let port = 19188;
    start_server(port, None).await;
    let mut first = connect_ws(port, "observer", "kiosk").await;
    recv_json(&mut first).await.unwrap();

    // when: the same identity reconnects
    let mut second = connect_ws(port, "observer", "kiosk").await;
    recv_json(&mut second).await.unwrap();

    // and a state change is broadcast
    let client = reqwest::Client::new();
    client
        .post(format!("http://127.0.0.1:{}/api/command", port))
        .json(&serde_json::json!({"action": "start", "id": "1"}))
        .send()
        .await
        .unwrap();

    // then: the replacement socket receives it
    let notify = recv_json(&mut second).await.unwrap();
    assert_eq!(notify["type"], "notify");
    assert_eq!(notify["id"], "1");
}

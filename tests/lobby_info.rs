mod support;

use dodge_arena::interface_adapters::http::LobbyInfoResponse;
use tokio_tungstenite::{connect_async, tungstenite};

#[tokio::test]
async fn when_lobby_info_is_requested_then_the_shareable_code_is_returned() {
    let base_url = support::ensure_server();
    let res = reqwest::get(format!("{base_url}/lobby"))
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let info: LobbyInfoResponse = res.json().await.expect("lobby info json");
    assert!(!info.lobby_code.is_empty());
    assert_eq!(info.players, 0);
}

#[tokio::test]
async fn when_socket_names_an_unknown_lobby_then_upgrade_is_refused_with_404() {
    let base_url = support::ensure_server();
    let ws_url = base_url.replacen("http://", "ws://", 1);
    let err = connect_async(format!("{ws_url}/ws?lobby=nope&peer_id=p1&name=x"))
        .await
        .expect_err("unknown lobby must be refused");
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status().as_u16(), 404),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn when_peer_id_is_missing_then_upgrade_is_refused_with_400() {
    let base_url = support::ensure_server();
    let info: LobbyInfoResponse = reqwest::get(format!("{base_url}/lobby"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("lobby info json");
    let ws_url = base_url.replacen("http://", "ws://", 1);
    let err = connect_async(format!("{ws_url}/ws?lobby={}", info.lobby_code))
        .await
        .expect_err("missing peer id must be refused");
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status().as_u16(), 400),
        other => panic!("unexpected error: {other:?}"),
    }
}

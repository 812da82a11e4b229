mod support;

use dodge_arena::domain::Team;
use dodge_arena::interface_adapters::net::{PeerConnection, connect};
use dodge_arena::use_cases::{HostNotice, PeerMirror};
use support::{TestHost, start_host, wait_for, wait_for_host_lost};

async fn open(host: &TestHost, peer_id: &str, name: &str) -> (PeerConnection, PeerMirror) {
    let mut mirror = PeerMirror::new(peer_id, name);
    let mut conn = connect(&host.ws_url, &host.lobby_code, peer_id, name, 64)
        .await
        .expect("peer connects");
    conn.send(&mirror.on_open()).await.expect("send request");
    let data = wait_for(&mut conn, |n| matches!(n, HostNotice::InitialData { .. })).await;
    mirror.apply(data);
    (conn, mirror)
}

async fn join(conn: &PeerConnection, mirror: &mut PeerMirror, team: Team) {
    for request in mirror.join(team).expect("first join") {
        conn.send(&request).await.expect("send join request");
    }
}

#[tokio::test]
async fn when_peer_opens_a_connection_then_host_sends_initial_data() {
    let host = start_host();
    let (_conn, mirror) = open(&host, &support::new_peer_id(), "Ann").await;

    assert!(mirror.is_paused());
    assert_eq!(mirror.available_colors().len(), 8);
    assert_eq!(mirror.selected_color(), Some("Blue"));
    assert!(mirror.rosters().is_empty());
}

#[tokio::test]
async fn when_peer_joins_a_team_then_other_peers_see_the_color_and_roster() {
    let host = start_host();
    let ann_id = support::new_peer_id();
    let (ann_conn, mut ann) = open(&host, &ann_id, "Ann").await;
    let (mut bob_conn, _bob) = open(&host, &support::new_peer_id(), "Bob").await;

    join(&ann_conn, &mut ann, Team::Red).await;

    let used = wait_for(&mut bob_conn, |n| matches!(n, HostNotice::ColorUsed { .. })).await;
    assert_eq!(
        used,
        HostNotice::ColorUsed {
            color: "Blue".into(),
            index: 0
        }
    );
    let update = wait_for(&mut bob_conn, |n| matches!(n, HostNotice::TeamUpdate(_))).await;
    let HostNotice::TeamUpdate(rosters) = update else {
        unreachable!()
    };
    assert_eq!(rosters.red.len(), 1);
    assert_eq!(rosters.red[0].peer_id, ann_id);
}

#[tokio::test]
async fn when_start_is_clicked_without_players_then_host_rejects_it() {
    let host = start_host();
    let (mut conn, mirror) = open(&host, &support::new_peer_id(), "Ann").await;

    conn.send(&mirror.pause_clicked()).await.expect("send pause");
    let notice = wait_for(&mut conn, |n| *n == HostNotice::StartRejected).await;
    assert_eq!(notice, HostNotice::StartRejected);
}

#[tokio::test]
async fn when_a_joined_player_starts_the_match_then_snapshots_follow() {
    let host = start_host();
    let ann_id = support::new_peer_id();
    let (mut conn, mut ann) = open(&host, &ann_id, "Ann").await;
    join(&conn, &mut ann, Team::Blue).await;

    conn.send(&ann.pause_clicked()).await.expect("send start");
    wait_for(&mut conn, |n| *n == HostNotice::GameStarted).await;

    // The first running tick arrives after the one second player poll.
    let state = wait_for(&mut conn, |n| match n {
        HostNotice::GameState(s) => !s.paused && s.players.contains_key(&ann_id),
        _ => false,
    })
    .await;
    let HostNotice::GameState(snapshot) = state else {
        unreachable!()
    };
    assert_eq!(snapshot.players[&ann_id].lives, 3);
}

#[tokio::test]
async fn when_a_peer_disconnects_then_others_see_it_leave_and_its_color_return() {
    let host = start_host();
    let ann_id = support::new_peer_id();
    let (ann_conn, mut ann) = open(&host, &ann_id, "Ann").await;
    let (mut bob_conn, _bob) = open(&host, &support::new_peer_id(), "Bob").await;
    join(&ann_conn, &mut ann, Team::Red).await;
    wait_for(&mut bob_conn, |n| matches!(n, HostNotice::TeamUpdate(r) if !r.red.is_empty())).await;

    drop(ann_conn);

    let left = wait_for(&mut bob_conn, |n| matches!(n, HostNotice::PlayerLeft { .. })).await;
    assert_eq!(left, HostNotice::PlayerLeft { id: ann_id });
    let back = wait_for(&mut bob_conn, |n| matches!(n, HostNotice::ColorAvailable { .. })).await;
    assert_eq!(
        back,
        HostNotice::ColorAvailable {
            color: "Blue".into()
        }
    );
}

#[tokio::test]
async fn when_the_same_peer_reconnects_then_the_old_socket_is_replaced() {
    let host = start_host();
    let peer_id = support::new_peer_id();
    let (mut first, _) = open(&host, &peer_id, "Ann").await;
    let (mut second, mirror) = open(&host, &peer_id, "Ann").await;

    wait_for_host_lost(&mut first).await;

    // The newer socket keeps working.
    second.send(&mirror.pause_clicked()).await.expect("send pause");
    wait_for(&mut second, |n| *n == HostNotice::StartRejected).await;
}

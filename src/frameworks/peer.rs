// Framework bootstrap for the peer runtime: connect, join, and drive a simple autopilot.

use crate::domain::{ControlFlags, Snapshot, Team};
use crate::frameworks::config;
use crate::interface_adapters::net::{NetError, PeerEvent, connect};
use crate::interface_adapters::utils::ids::new_peer_id;
use crate::use_cases::{HostNotice, MirrorView, PeerMirror};

use std::io::Result;

#[derive(Debug, Clone)]
pub struct PeerOptions {
    pub host_url: String,
    pub lobby_code: String,
    pub name: String,
    pub team: Team,
    pub autostart: bool,
}

pub async fn run_with_config() -> Result<()> {
    let Some(lobby_code) = config::lobby_code() else {
        tracing::error!("ARENA_LOBBY_CODE must be set in peer mode");
        return Err(std::io::Error::other("missing lobby code"));
    };
    let options = PeerOptions {
        host_url: config::host_url(),
        lobby_code,
        name: config::player_name(),
        team: config::team().unwrap_or(Team::Red),
        autostart: config::autostart(),
    };
    run_peer(options).await.map_err(std::io::Error::other)
}

/// Runs one peer session until the host goes away.
pub async fn run_peer(options: PeerOptions) -> std::result::Result<(), NetError> {
    let peer_id = new_peer_id();
    let mut mirror = PeerMirror::new(&peer_id, &options.name);
    let mut conn = connect(
        &options.host_url,
        &options.lobby_code,
        &peer_id,
        &options.name,
        config::PEER_OUTBOUND_CAPACITY,
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "failed to connect"))?;

    conn.send(&mirror.on_open()).await?;

    let mut last_flags = ControlFlags::default();
    while let Some(event) = conn.next_event().await {
        let notice = match event {
            PeerEvent::Notice(notice) => notice,
            PeerEvent::HostLost => {
                mirror.on_host_lost();
                return Err(NetError::HostClosed);
            }
        };
        let first_data = matches!(notice, HostNotice::InitialData { .. });
        let game_over = matches!(notice, HostNotice::GameOver { .. });
        mirror.apply(notice);

        if first_data && !mirror.me().has_joined_team {
            match mirror.join(options.team) {
                Ok(requests) => {
                    for request in &requests {
                        conn.send(request).await?;
                    }
                    if options.autostart && mirror.is_paused() {
                        conn.send(&mirror.pause_clicked()).await?;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to join team"),
            }
        }

        if game_over && !mirror.me().ready {
            // Ready up straight away so the next match starts when everyone agrees.
            let request = mirror.toggle_ready();
            conn.send(&request).await?;
        }

        if matches!(mirror.view(), MirrorView::Game) {
            let flags = mirror
                .snapshot()
                .map(|s| steer(s, &mirror.me().id))
                .unwrap_or_default();
            if flags != last_flags {
                if let Some(request) = mirror.input(flags) {
                    conn.send(&request).await?;
                }
                last_flags = flags;
            }
        }
    }

    Ok(())
}

// Enemies closer than this are fled from; otherwise head for the nearest coin.
const DANGER_RADIUS: f32 = 150.0;

/// Picks directional keys for `me` from the latest snapshot.
pub fn steer(snapshot: &Snapshot, me: &str) -> ControlFlags {
    let Some(player) = snapshot.players.get(me) else {
        return ControlFlags::default();
    };
    let (px, py) = (
        player.x + player.width / 2.0,
        player.y + player.height / 2.0,
    );

    let nearest = |points: &mut dyn Iterator<Item = (f32, f32)>| {
        points
            .map(|(x, y)| (x - px, y - py))
            .min_by(|a, b| a.0.hypot(a.1).total_cmp(&b.0.hypot(b.1)))
    };

    let threat = nearest(
        &mut snapshot
            .enemies
            .iter()
            .map(|e| (e.x + e.width / 2.0, e.y + e.height / 2.0)),
    )
    .filter(|(dx, dy)| dx.hypot(*dy) < DANGER_RADIUS);

    let (dx, dy) = match threat {
        Some((dx, dy)) => (-dx, -dy),
        None => match nearest(
            &mut snapshot
                .coins
                .iter()
                .map(|c| (c.x + c.width / 2.0, c.y + c.height / 2.0)),
        ) {
            Some(target) => target,
            None => return ControlFlags::default(),
        },
    };

    ControlFlags {
        left: dx < -1.0,
        right: dx > 1.0,
        up: dy < -1.0,
        down: dy > 1.0,
        action: false,
    }
}

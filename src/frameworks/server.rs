// Framework bootstrap for the host runtime.

use crate::domain::{GameConfig, Team};
use crate::frameworks::{config, peer};
use crate::interface_adapters::http::lobby_info_handler;
use crate::interface_adapters::net::{ChannelLink, agent_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::timing::{IntervalScheduler, SystemClock};
use crate::interface_adapters::utils::ids::new_peer_id;
use crate::use_cases::game::host_task;
use crate::use_cases::{GameSession, Host, SessionTiming};

use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, mpsc, watch};

pub(crate) fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Everything the host needs besides the listener.
#[derive(Debug, Clone)]
pub struct HostOptions {
    // Doubles as the host's own peer id.
    pub lobby_code: String,
    pub player_name: String,
    pub game_config: GameConfig,
    // The host-local participant joins this team on startup when set.
    pub local_team: Option<Team>,
}

impl HostOptions {
    pub fn from_env() -> Result<Self> {
        let path = config::game_config_path();
        let game_config = config::load_game_config(path.as_deref().map(Path::new))
            .map_err(std::io::Error::other)?;
        Ok(Self {
            lobby_code: new_peer_id(),
            player_name: config::player_name(),
            game_config,
            local_team: config::team(),
        })
    }
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    serve(listener, HostOptions::from_env()?, std::future::pending()).await
}

pub async fn serve(
    listener: tokio::net::TcpListener,
    options: HostOptions,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let address = listener.local_addr()?;
    let lobby_code = options.lobby_code.clone();
    // build state
    let (state, stop_host) = build_state(options)?;

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/agent", get(agent_handler))
        .route("/lobby", get(lobby_info_handler))
        .with_state(state);

    tracing::info!(%address, lobby = %lobby_code, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });
    stop_host.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    if config::mode() == config::Mode::Peer {
        return peer::run_with_config().await;
    }

    let address: SocketAddr = format!("{}:{}", config::bind_addr(), config::http_port())
        .parse()
        .map_err(std::io::Error::other)?;

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    let options = HostOptions::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "invalid game config");
    })?;
    serve(listener, options, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
    })
    .await
}

fn build_state(options: HostOptions) -> Result<(Arc<AppState>, Arc<Notify>)> {
    let timing = SessionTiming {
        tick_interval: config::TICK_INTERVAL,
        poll_interval: config::PLAYER_POLL_INTERVAL,
    };
    let session = GameSession::new(
        options.game_config,
        timing,
        SystemClock::new(),
        IntervalScheduler::new(),
    )
    .map_err(|e| std::io::Error::other(format!("failed to initialize session: {e}")))?;

    let mut host: Host<_, _, ChannelLink> =
        Host::new(options.lobby_code.clone(), options.player_name, session);
    if let Some(team) = options.local_team {
        // The local participant takes the first free color, like a fresh selector.
        let color = host.lobby().colors().available().first().cloned();
        match color.map(|color| host.join_local(team, &color)) {
            Some(Ok(())) => tracing::info!(team = %team, "host joined team"),
            Some(Err(e)) => tracing::warn!(error = %e, "host failed to join team"),
            None => tracing::warn!("no color left for the host"),
        }
    }

    // All socket events go to the single host task.
    let (events_tx, events_rx) = mpsc::channel(config::INPUT_CHANNEL_CAPACITY);
    let (status_tx, status_rx) = watch::channel(host.status());
    let (agent_tx, agent_rx) = watch::channel(None);
    let stop_host = Arc::new(Notify::new());

    tokio::spawn(host_task(
        host,
        events_rx,
        status_tx,
        agent_tx,
        stop_host.clone(),
    ));

    Ok((
        Arc::new(AppState {
            lobby_code: Arc::from(options.lobby_code.as_str()),
            events_tx,
            status_rx,
            agent_rx,
            outbound_capacity: config::PEER_OUTBOUND_CAPACITY,
        }),
        stop_host,
    ))
}

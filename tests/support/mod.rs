// Shared primitives for bootstrapping host servers across integration tests.
#![allow(dead_code)]

use dodge_arena::domain::GameConfig;
use dodge_arena::interface_adapters::net::{PeerConnection, PeerEvent};
use dodge_arena::use_cases::HostNotice;
use dodge_arena::HostOptions;
use std::{
    // `Arc` shares data between threads; `OnceLock` writes a value only once.
    sync::{Arc, OnceLock},
    // Sleep durations are used in readiness polling loops.
    time::Duration,
};

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the shared test server is running and return its base URL.
pub fn ensure_server() -> &'static str {
    // Run initialization exactly once even if multiple tests call this function.
    SERVER_READY.get_or_init(|| {
        // Local one-time slot where the server thread publishes its selected URL.
        let published_url = Arc::new(OnceLock::<String>::new());
        // Clone so the spawned thread can write into the same shared slot.
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            // Each server thread owns its own Tokio runtime.
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                // Start serving requests until the test process exits.
                dodge_arena::run(listener).await.expect("server failed");
            });
        });
        // Block until URL is published and the bound port starts accepting connections.
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication and then wait for the server socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        // Avoid a tight loop while waiting for the background thread.
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    // Strip the scheme so we can use host:port for raw TCP readiness checks.
    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

/// A dedicated host for tests that change session state.
pub struct TestHost {
    pub http_url: String,
    pub ws_url: String,
    pub lobby_code: String,
}

// Start a fresh host on its own thread and runtime; it lives until the process exits.
pub fn start_host() -> TestHost {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("test runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral test port");
            let addr = listener.local_addr().expect("get local addr");
            let options = HostOptions {
                lobby_code: uuid::Uuid::new_v4().to_string(),
                player_name: "Host".to_string(),
                game_config: GameConfig::default(),
                local_team: None,
            };
            // The listener is already bound, so early connects wait in the backlog.
            tx.send((addr, options.lobby_code.clone()))
                .expect("test waits for the address");
            dodge_arena::serve(listener, options, std::future::pending())
                .await
                .expect("server failed");
        });
    });

    let (addr, lobby_code) = rx.recv().expect("host thread publishes its address");
    TestHost {
        http_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}"),
        lobby_code,
    }
}

pub fn new_peer_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// Skip notices until one matches, failing after a few seconds.
pub async fn wait_for(
    conn: &mut PeerConnection,
    mut pred: impl FnMut(&HostNotice) -> bool,
) -> HostNotice {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match conn.next_event().await {
                Some(PeerEvent::Notice(notice)) if pred(&notice) => return notice,
                Some(PeerEvent::Notice(_)) => continue,
                other => panic!("connection ended while waiting: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for host notice")
}

// Wait for the terminal host-lost event.
pub async fn wait_for_host_lost(conn: &mut PeerConnection) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match conn.next_event().await {
                Some(PeerEvent::HostLost) | None => return,
                Some(PeerEvent::Notice(_)) => continue,
            }
        }
    })
    .await
    .expect("timed out waiting for host loss")
}

use super::agent::AgentView;
use super::host::Host;
use super::types::{HostEvent, LobbyStatus, PeerLink};
use crate::domain::{Clock, Scheduler};
use std::sync::Arc;
use tokio::sync::{Notify, mpsc, watch};
use tracing::info;

/// Single writer for the whole session: applies peer events and scheduler callbacks one at a
/// time, in arrival order.
pub async fn host_task<C, S, L>(
    mut host: Host<C, S, L>,
    mut events_rx: mpsc::Receiver<HostEvent<L>>,
    status_tx: watch::Sender<LobbyStatus>,
    agent_tx: watch::Sender<Option<AgentView>>,
    shutdown: Arc<Notify>,
) where
    C: Clock,
    S: Scheduler,
    L: PeerLink,
{
    info!(lobby = %host.lobby_code(), "host task started");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }
            event = events_rx.recv() => {
                match event {
                    Some(event) => host.handle_event(event),
                    // Every sender is gone; nothing can reach the session any more.
                    None => break,
                }
            }
            _ = host.session_mut().scheduler_mut().fired() => {
                host.on_timer();
                if agent_tx.receiver_count() > 0 {
                    let _ = agent_tx.send(host.agent_view());
                }
            }
        }

        status_tx.send_if_modified(|current| {
            let next = host.status();
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    host.session_mut().scheduler_mut().stop();
    info!(lobby = %host.lobby_code(), "host task stopped");
}

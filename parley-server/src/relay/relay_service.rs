use crate::relay::relay_command::RelayCommand;
use crate::relay::relay_output::RelayOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use parley_core::{ConnectionId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct RelayInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Connection bookkeeping shared between the WebSocket handlers and the
/// relay task. Holds the outbound sender for every live connection and the
/// command channel into the relay.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
    pub(crate) command_tx: mpsc::Sender<RelayCommand>,
}

impl RelayService {
    pub fn new(command_tx: mpsc::Sender<RelayCommand>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                connections: DashMap::new(),
            }),
            command_tx,
        }
    }

    pub fn command_sender(&self) -> mpsc::Sender<RelayCommand> {
        self.command_tx.clone()
    }

    pub fn add_connection(&self, connection: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(connection, tx);
    }

    pub fn remove_connection(&self, connection: &ConnectionId) {
        self.inner.connections.remove(connection);
    }

    fn send_event(&self, connection: ConnectionId, event: &ServerEvent) {
        let Some(tx) = self.inner.connections.get(&connection) else {
            warn!("Attempted to deliver to disconnected connection {}", connection);
            return;
        };

        match serde_json::to_string(event) {
            Ok(json) => {
                if let Err(e) = tx.send(Message::Text(json.into())) {
                    error!("Failed to queue WS message for {}: {:?}", connection, e);
                }
            }
            Err(e) => error!("Failed to serialize server event: {}", e),
        }
    }
}

#[async_trait]
impl RelayOutput for RelayService {
    async fn deliver(&self, connection: ConnectionId, event: ServerEvent) {
        self.send_event(connection, &event);
    }
}

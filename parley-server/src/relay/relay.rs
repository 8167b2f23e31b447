use crate::registry::{RegistryError, RoomRegistry};
use crate::relay::relay_command::RelayCommand;
use crate::relay::relay_output::RelayOutput;
use parley_core::{Participant, ParticipantId, RoomId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The relay event loop. A single task owns the registry, so every mutation
/// and the fan-out it triggers happen in command order; the per-room
/// notification ordering guarantee falls out of this ownership.
pub struct Relay {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn RelayOutput>,
}

impl Relay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, output: Arc<dyn RelayOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::CreateRoom { reply } => {
                let room = self.registry.create_room();
                info!("Created room {}", room);
                let _ = reply.send(room);
            }

            RelayCommand::ValidateRoom { room, reply } => {
                let _ = reply.send(self.registry.room_exists(&room));
            }

            RelayCommand::Join {
                room,
                participant,
                connection,
            } => match self.registry.join(&room, participant.clone(), connection) {
                Ok(members) => {
                    info!("{} joined room {}", participant, room);
                    self.broadcast_participants(&room, &members).await;
                }
                Err(RegistryError::RoomNotFound) => {
                    warn!("{} tried to join unknown room {}", participant, room);
                    self.output
                        .deliver(
                            connection,
                            ServerEvent::Error {
                                message: "Room not found".to_string(),
                            },
                        )
                        .await;
                }
            },

            RelayCommand::Signal {
                room,
                from,
                to,
                payload,
            } => self.forward_signal(&room, from, to, payload).await,

            RelayCommand::Leave { room, participant } => {
                if let Some(members) = self.registry.leave(&room, &participant) {
                    info!("{} left room {}", participant, room);
                    self.broadcast_participants(&room, &members).await;
                }
            }

            RelayCommand::Disconnect { connection } => {
                if let Some((room, members)) = self.registry.drop_connection(connection) {
                    info!("Connection {} dropped from room {}", connection, room);
                    self.broadcast_participants(&room, &members).await;
                }
            }
        }
    }

    /// Forwards a signal without inspecting its payload. A targeted signal
    /// for an absent recipient is dropped silently.
    async fn forward_signal(
        &self,
        room: &RoomId,
        from: ParticipantId,
        to: Option<ParticipantId>,
        payload: serde_json::Value,
    ) {
        match to {
            Some(to) => {
                let Some(connection) = self.registry.route(room, &to) else {
                    debug!("Dropping signal from {} to absent peer {}", from, to);
                    return;
                };
                self.output
                    .deliver(connection, ServerEvent::Signal { from, payload })
                    .await;
            }
            None => {
                for member in self.registry.members(room) {
                    if member.id == from {
                        continue;
                    }
                    self.output
                        .deliver(
                            member.connection,
                            ServerEvent::Signal {
                                from: from.clone(),
                                payload: payload.clone(),
                            },
                        )
                        .await;
                }
            }
        }
    }

    async fn broadcast_participants(&self, room: &RoomId, members: &[Participant]) {
        let participants: Vec<ParticipantId> = members.iter().map(|p| p.id.clone()).collect();
        let event = ServerEvent::Participants {
            room: room.clone(),
            participants,
        };

        for member in members {
            self.output.deliver(member.connection, event.clone()).await;
        }
    }
}

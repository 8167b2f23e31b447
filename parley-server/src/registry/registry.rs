use parley_core::{ConnectionId, Participant, ParticipantId, RoomId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Room not found")]
    RoomNotFound,
}

#[derive(Debug, Default)]
struct Room {
    participants: Vec<Participant>,
}

/// Process-wide table of active rooms and their members. Pure state with no
/// I/O; the relay task is its only owner, so mutations are serialized by
/// construction.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh empty room and returns its identifier. Never fails.
    pub fn create_room(&mut self) -> RoomId {
        let id = RoomId::new();
        self.rooms.insert(id.clone(), Room::default());
        id
    }

    pub fn room_exists(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    /// Adds a participant to a room and returns the updated member snapshot.
    /// A repeated join with the same participant id rebinds the connection
    /// instead of duplicating the entry.
    pub fn join(
        &mut self,
        room: &RoomId,
        participant: ParticipantId,
        connection: ConnectionId,
    ) -> Result<Vec<Participant>, RegistryError> {
        let entry = self.rooms.get_mut(room).ok_or(RegistryError::RoomNotFound)?;

        match entry.participants.iter_mut().find(|p| p.id == participant) {
            Some(existing) => existing.connection = connection,
            None => entry.participants.push(Participant {
                id: participant,
                connection,
            }),
        }

        Ok(entry.participants.clone())
    }

    /// Removes a participant. Returns the remaining member snapshot for
    /// fan-out, or `None` when the room or participant was already absent
    /// (a silent no-op). A room that empties out is deleted.
    pub fn leave(&mut self, room: &RoomId, participant: &ParticipantId) -> Option<Vec<Participant>> {
        let remaining = {
            let entry = self.rooms.get_mut(room)?;
            let before = entry.participants.len();
            entry.participants.retain(|p| &p.id != participant);
            if entry.participants.len() == before {
                return None;
            }
            entry.participants.clone()
        };

        if remaining.is_empty() {
            self.rooms.remove(room);
        }

        Some(remaining)
    }

    /// Removes the single participant bound to this connection, if any.
    /// Connection ids are unique across the whole registry, so at most one
    /// participant is affected.
    pub fn drop_connection(
        &mut self,
        connection: ConnectionId,
    ) -> Option<(RoomId, Vec<Participant>)> {
        let (room_id, participant) = self.rooms.iter().find_map(|(id, room)| {
            room.participants
                .iter()
                .find(|p| p.connection == connection)
                .map(|p| (id.clone(), p.id.clone()))
        })?;

        let remaining = self.leave(&room_id, &participant)?;
        Some((room_id, remaining))
    }

    pub fn members(&self, room: &RoomId) -> Vec<Participant> {
        self.rooms
            .get(room)
            .map(|r| r.participants.clone())
            .unwrap_or_default()
    }

    /// Connection lookup for targeted signal forwarding.
    pub fn route(&self, room: &RoomId, to: &ParticipantId) -> Option<ConnectionId> {
        self.rooms
            .get(room)?
            .participants
            .iter()
            .find(|p| &p.id == to)
            .map(|p| p.connection)
    }
}

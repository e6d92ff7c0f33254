use crate::{
    messages::{menu_item::MenuItem, roster::NetworkPeer},
    world::entity::entity_id::EntityId,
};

use super::error::HandlerError;

/// Payload carried by a raised event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    Index(usize),
    Peers(Vec<NetworkPeer>),
    MenuItem(MenuItem),
    Entity(EntityId),
    Collision { first: EntityId, second: EntityId },
    None,
}

impl EventData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventData::Index(_) => "Index",
            EventData::Peers(_) => "Peers",
            EventData::MenuItem(_) => "MenuItem",
            EventData::Entity(_) => "Entity",
            EventData::Collision { .. } => "Collision",
            EventData::None => "None",
        }
    }

    pub fn index(&self, event: &str) -> Result<usize, HandlerError> {
        match self {
            EventData::Index(index) => Ok(*index),
            other => Err(other.unexpected(event, "Index")),
        }
    }

    pub fn peers(&self, event: &str) -> Result<&[NetworkPeer], HandlerError> {
        match self {
            EventData::Peers(peers) => Ok(peers),
            other => Err(other.unexpected(event, "Peers")),
        }
    }

    pub fn menu_item(&self, event: &str) -> Result<&MenuItem, HandlerError> {
        match self {
            EventData::MenuItem(item) => Ok(item),
            other => Err(other.unexpected(event, "MenuItem")),
        }
    }

    pub fn entity(&self, event: &str) -> Result<EntityId, HandlerError> {
        match self {
            EventData::Entity(entity) => Ok(*entity),
            other => Err(other.unexpected(event, "Entity")),
        }
    }

    pub fn collision(&self, event: &str) -> Result<(EntityId, EntityId), HandlerError> {
        match self {
            EventData::Collision { first, second } => Ok((*first, *second)),
            other => Err(other.unexpected(event, "Collision")),
        }
    }

    fn unexpected(&self, event: &str, expected: &'static str) -> HandlerError {
        HandlerError::UnexpectedPayload {
            event: event.to_string(),
            expected,
            actual: self.kind_name(),
        }
    }
}

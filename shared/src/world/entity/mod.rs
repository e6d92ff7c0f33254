pub mod entity_id;
pub mod entity_registry;

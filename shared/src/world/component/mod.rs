pub mod component_kinds;
pub mod component_store;
pub mod components;
pub mod error;

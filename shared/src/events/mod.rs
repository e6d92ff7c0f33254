pub mod error;
pub mod event_bus;
pub mod event_data;
pub mod names;

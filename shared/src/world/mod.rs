pub mod component;
pub mod entity;

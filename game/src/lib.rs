//! # Thengill Game
//! The lobby, round rules and rendering of Thengill, built on the scene
//! runtime in `thengill-shared` and the peer sessions in `thengill-peer`.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod lobby;
pub mod scenes;
pub mod world;

mod render_system;
mod services;
mod summary;

pub use render_system::{render_items, RenderSystem, CAMERA_DISTANCE, CAMERA_HEIGHT};
pub use services::{GameServices, NetworkServices};
pub use summary::{RoundSummary, SummarySystem};

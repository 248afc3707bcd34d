//! Terminal front end for GovSync.
//!
//! Exposes the ratatui state, key handling and render pass behind
//! `govsync ui`.

pub mod app;
pub mod input;
pub mod render;
pub mod runner;

pub use app::AppState;
pub use input::{InputAction, handle_key_event};
pub use render::draw_ui;
pub use runner::run;

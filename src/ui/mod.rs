//! Rendering: egui widgets over [`crate::state::AppState`].

pub mod panels;
pub mod plot;

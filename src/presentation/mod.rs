//! Presentation layer handling terminal UI and user input.
//!
//! This module manages the terminal user interface using ratatui,
//! maps key presses onto wizard actions, and renders each screen.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;

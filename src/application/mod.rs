//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the wizard controller guards step transitions, and the app state tracks
//! what the user is editing.

pub mod controller;
pub mod state;

pub use controller::*;
pub use state::*;

//! signup-wizard - Terminal Sign-up Form Library
//!
//! A multi-step sign-up form with per-step validation and a step-tracking
//! store, rendered in the terminal.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;

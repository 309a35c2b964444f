//! Infrastructure layer providing external service integrations.
//!
//! Configuration loading, log routing and the analytics collaborators
//! the wizard reports submissions to.

pub mod analytics;
pub mod config;
pub mod logging;

pub use analytics::*;
pub use config::*;
pub use logging::*;

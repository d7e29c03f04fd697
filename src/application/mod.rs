//! Application layer managing the calculator session.
//!
//! This module coordinates between the domain layer and presentation layer,
//! managing the expression being built, results, history and settings.

pub mod state;
pub mod settings;

pub use state::*;
pub use settings::*;

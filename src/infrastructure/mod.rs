//! Infrastructure layer providing external service integrations.
//!
//! This module contains the file export of the calculation history.

pub mod persistence;

pub use persistence::*;

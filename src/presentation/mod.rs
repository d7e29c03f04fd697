//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the calculator with ratatui and maps crossterm key
//! events onto calculator operations.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;

//! tcalc - Terminal Calculator Library
//!
//! A calculator with a safe arithmetic expression evaluator, a capped
//! calculation history and a terminal front end, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;

//! Domain layer: the expression evaluator and the calculation history model.

pub mod models;
pub mod parser;
pub mod services;
pub mod errors;

pub use models::*;
pub use services::*;
pub use errors::*;

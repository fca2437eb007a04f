//! Shared types and models for the Almacen inventory and sales platform
//!
//! This crate contains the domain entities persisted by the backend together
//! with the common types and validation helpers used across modules.

pub mod allocation;
pub mod models;
pub mod types;
pub mod validation;

pub use allocation::*;
pub use models::*;
pub use types::*;
pub use validation::*;

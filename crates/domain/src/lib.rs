//! topic-poster domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `rotation`: Round-robin topic selection over an append-only post log
//! - `usecases`: Application use cases / business logic

pub mod model;
pub mod ports;
pub mod rotation;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use rotation::{RotationError, RotationTracker, select_next_topic};

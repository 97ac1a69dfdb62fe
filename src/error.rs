//! Error types for the physics kernel

use thiserror::Error;

use crate::types::{BodyRef, ColliderRef};

/// Physics kernel errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// Body handle is stale or was never issued by this world
    #[error("No body found: {0:?}")]
    BodyNotFound(BodyRef),

    /// Collider handle is stale or was never issued by this world
    #[error("No collider found: {0:?}")]
    ColliderNotFound(ColliderRef),

    /// Rejected world configuration
    #[error("Invalid world configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;

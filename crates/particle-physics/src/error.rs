//! Error types for particle-physics.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("{name} must be positive and finite, got {value}")]
    InvalidConstant { name: &'static str, value: f32 },
}

pub type Result<T> = std::result::Result<T, PhysicsError>;

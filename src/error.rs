use thiserror::Error;

/// Errors raised while building or driving a [`Simulation`](crate::Simulation).
///
/// Degenerate geometry (coincident bodies, zero normal speed) is never an
/// error; it is absorbed by epsilon guards inside the collision response.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("arena must have positive, finite dimensions (got {width} x {height})")]
    InvalidArena { width: f32, height: f32 },
    #[error("min radius {min} must be strictly positive")]
    InvalidRadius { min: f32 },
    #[error("min radius {min} exceeds max radius {max}")]
    InvalidRadiusRange { min: f32, max: f32 },
    #[error("bodies up to {diameter} across do not fit in a {width} x {height} arena")]
    BodyTooLarge { diameter: f32, width: f32, height: f32 },
    #[error("spawn point ({x}, {y}) lies outside the arena")]
    SpawnOutsideArena { x: f32, y: f32 },
    #[error("parameter `{name}` must be finite")]
    NonFinite { name: &'static str },
    #[error("speed modifier {0} must be finite and non-negative")]
    InvalidSpeedModifier(f32),
    #[error("body index {index} is outside the pool of {len} bodies")]
    UnknownBody { index: usize, len: usize },
}

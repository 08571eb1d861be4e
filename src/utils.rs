use crate::{body::Body, config::SimConfig};
use ultraviolet::Vec2;

/// Velocity every pooled body starts with.
pub const SPAWN_VELOCITY: Vec2 = Vec2 { x: 1.0, y: 0.0 };

/// Draws a radius uniformly from `[min, max]`.
pub fn random_radius(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

/// Allocates the full body pool for `config`.
/// - Every body starts inactive at the shared spawn point.
/// - Radii are drawn independently; mass follows the radius.
pub fn spawn_pool(config: &SimConfig, rng: &mut fastrand::Rng) -> Vec<Body> {
    let spawn = Vec2::new(config.spawn_x, config.spawn_y);

    (0..config.spawn_count)
        .map(|_| {
            let radius = random_radius(rng, config.min_radius, config.max_radius);
            Body::new(spawn, SPAWN_VELOCITY, radius)
        })
        .collect()
}

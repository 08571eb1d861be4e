//! Construction parameters for a [`Simulation`](crate::Simulation).
//!
//! The eight numeric parameters mirror what a host application collects on
//! its command line: arena size, radius range, pool size, gravity and the
//! shared spawn point. `rng_seed` is optional and only pins the radius draws.
//!
//! ```toml
//! arena_width = 1200.0
//! arena_height = 900.0
//! min_radius = 4.0
//! max_radius = 10.0
//! spawn_count = 1000
//! gravity = 200.0
//! spawn_x = 600.0
//! spawn_y = 100.0
//! rng_seed = 7
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Arena width in world units (x grows to the right).
    pub arena_width: f32,
    /// Arena height in world units (y grows downwards).
    pub arena_height: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Number of bodies pre-allocated in the pool.
    pub spawn_count: usize,
    /// Downward acceleration applied to every active body.
    pub gravity: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Seed for the radius generator. `None` seeds from the OS.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: 1200.0,
            arena_height: 900.0,
            min_radius: 4.0,
            max_radius: 10.0,
            spawn_count: 1000,
            gravity: 200.0,
            spawn_x: 600.0,
            spawn_y: 100.0,
            rng_seed: None,
        }
    }
}

impl SimConfig {
    /// Checks the parameters before any body is allocated.
    pub fn validate(&self) -> Result<(), SimError> {
        let finite = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("gravity", self.gravity),
            ("spawn_x", self.spawn_x),
            ("spawn_y", self.spawn_y),
        ];
        if let Some(&(name, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SimError::NonFinite { name });
        }

        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return Err(SimError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.min_radius <= 0.0 {
            return Err(SimError::InvalidRadius {
                min: self.min_radius,
            });
        }
        if self.min_radius > self.max_radius {
            return Err(SimError::InvalidRadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }

        let diameter = 2.0 * self.max_radius;
        if diameter > self.arena_width || diameter > self.arena_height {
            return Err(SimError::BodyTooLarge {
                diameter,
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        let inside_x = (0.0..=self.arena_width).contains(&self.spawn_x);
        let inside_y = (0.0..=self.arena_height).contains(&self.spawn_y);
        if !(inside_x && inside_y) {
            return Err(SimError::SpawnOutsideArena {
                x: self.spawn_x,
                y: self.spawn_y,
            });
        }

        Ok(())
    }
}

use ultraviolet::Vec2;

/// Fraction of the perpendicular velocity kept after a wall bounce.
pub const RESTITUTION: f32 = 0.8;

/// A disc falling inside the arena.
///
/// Mass always equals radius; both are fixed when the body is created.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Position vector.
    pub pos: Vec2,
    /// Velocity vector.
    pub vel: Vec2,
    radius: f32,
    mass: f32,
    active: bool,
}

impl Body {
    /// Creates an inactive body. Mass is taken from the radius.
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "body radius must be positive");
        Self {
            pos,
            vel,
            radius,
            mass: radius,
            active: false,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the body as simulated. There is no way back to inactive.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let r = Vec2::broadcast(self.radius);
        (self.pos - r, self.pos + r)
    }

    /// Applies gravity to the velocity, then moves the body.
    ///
    /// `speed_modifier` only scales the displacement, so the stored velocity
    /// is the same whether the simulation runs in slow motion or not.
    pub fn integrate(&mut self, gravity: f32, dt: f32, speed_modifier: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * (dt * speed_modifier);
    }

    /// Keeps the body inside a `width` x `height` arena anchored at the origin.
    ///
    /// Each axis is handled on its own, so a body pushed into a corner gets
    /// both corrections in the same call. Returns `true` if any wall was hit.
    pub fn resolve_boundary(&mut self, width: f32, height: f32) -> bool {
        let mut hit = false;

        if self.pos.x + self.radius > width {
            self.pos.x = width - self.radius;
            self.vel.x *= -RESTITUTION;
            hit = true;
        } else if self.pos.x - self.radius < 0.0 {
            self.pos.x = self.radius;
            self.vel.x *= -RESTITUTION;
            hit = true;
        }

        if self.pos.y + self.radius > height {
            self.pos.y = height - self.radius;
            self.vel.y *= -RESTITUTION;
            hit = true;
        } else if self.pos.y - self.radius < 0.0 {
            self.pos.y = self.radius;
            self.vel.y *= -RESTITUTION;
            hit = true;
        }

        hit
    }

    /// True when both velocity components are below `threshold` in magnitude.
    pub fn is_idle(&self, threshold: f32) -> bool {
        self.vel.x.abs() < threshold && self.vel.y.abs() < threshold
    }
}

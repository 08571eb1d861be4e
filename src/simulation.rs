use crate::{
    body::Body,
    config::SimConfig,
    error::SimError,
    quadtree::{Quadtree, Region},
    utils,
};

use broccoli::aabb::Rect;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use ultraviolet::Vec2;

/// Stand-in distance for bodies whose centers coincide.
pub const NORMAL_EPSILON: f32 = 1e-4;

/// Largest delta time a single step accepts, in seconds.
pub const MAX_DT: f32 = 0.25;

/// Runtime controls written by the host between steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimState {
    /// Scales displacement of every body. Velocities are left untouched.
    pub speed_modifier: f32,
    /// A paused simulation ignores `step` entirely.
    pub paused: bool,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            speed_modifier: 1.0,
            paused: false,
        }
    }
}

/// How collision candidates are gathered from the quadtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CandidateQuery {
    /// Only the nodes on the path to the body's deepest containing quadrant.
    #[default]
    Ancestors,
    /// Every quadrant the body's bounding box reaches, siblings included.
    Overlapping,
}

/// Manages the falling-disc simulation state and logic.
#[derive(Debug)]
pub struct Simulation {
    /// Number of completed (non-paused) steps.
    pub frame: usize,
    arena: Region,
    gravity: f32,
    /// Fixed-size pool; inactive entries are skipped everywhere.
    bodies: Vec<Body>,
    /// Lowest pool index that may still be inactive.
    next_spawn: usize,
    /// Rebuilt from scratch at the start of every step.
    quadtree: Quadtree,
    state: SimState,
    query: CandidateQuery,
    /// Reused candidate buffer for `step`.
    scratch: Vec<u32>,
}

impl Simulation {
    /// Validates `config` and allocates its body pool. No body is active yet.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let bodies = utils::spawn_pool(config, &mut rng);

        Self::with_bodies(config.arena_width, config.arena_height, config.gravity, bodies)
    }

    /// Builds a simulation around an existing pool.
    /// Bodies that are already active are simulated from the first step.
    pub fn with_bodies(
        width: f32,
        height: f32,
        gravity: f32,
        bodies: Vec<Body>,
    ) -> Result<Self, SimError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SimError::InvalidArena { width, height });
        }
        if !gravity.is_finite() {
            return Err(SimError::NonFinite { name: "gravity" });
        }

        let arena = Region::new(0.0, 0.0, width, height);
        info!(
            bodies = bodies.len(),
            width, height, gravity, "created simulation"
        );

        Ok(Self {
            frame: 0,
            arena,
            gravity,
            bodies,
            next_spawn: 0,
            quadtree: Quadtree::new(arena),
            state: SimState::default(),
            query: CandidateQuery::default(),
            scratch: Vec::new(),
        })
    }

    pub fn arena(&self) -> Region {
        self.arena
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable view of the pool. The pool itself cannot grow or shrink.
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// The index as built by the last step.
    pub fn quadtree(&self) -> &Quadtree {
        &self.quadtree
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn speed_modifier(&self) -> f32 {
        self.state.speed_modifier
    }

    pub fn set_speed_modifier(&mut self, speed_modifier: f32) -> Result<(), SimError> {
        if !speed_modifier.is_finite() || speed_modifier < 0.0 {
            return Err(SimError::InvalidSpeedModifier(speed_modifier));
        }
        self.state.speed_modifier = speed_modifier;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Flips the pause flag and returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.paused = !self.state.paused;
        self.state.paused
    }

    pub fn candidate_query(&self) -> CandidateQuery {
        self.query
    }

    pub fn set_candidate_query(&mut self, query: CandidateQuery) {
        self.query = query;
    }

    pub fn active_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_active()).count()
    }

    /// Activates the next inactive body of the pool and returns its index.
    /// Returns `None` once every body is active.
    pub fn activate_next(&mut self) -> Option<usize> {
        while self.next_spawn < self.bodies.len() && self.bodies[self.next_spawn].is_active() {
            self.next_spawn += 1;
        }

        let index = self.next_spawn;
        self.bodies.get_mut(index)?.activate();
        self.next_spawn += 1;
        debug!(index, "activated body");

        if self.is_exhausted() {
            debug!(pool = self.bodies.len(), "body pool exhausted");
        }
        Some(index)
    }

    /// True once [`activate_next`](Self::activate_next) has nothing left to activate.
    pub fn is_exhausted(&self) -> bool {
        self.bodies[self.next_spawn..].iter().all(Body::is_active)
    }

    /// Advances the simulation by `dt` seconds.
    /// 1. Rebuilds the quadtree from the active bodies.
    /// 2. Moves each active body and bounces it off the walls.
    /// 3. Resolves collisions between that body and its quadtree candidates.
    pub fn step(&mut self, dt: f32) {
        if self.state.paused {
            return;
        }
        let dt = Self::sanitize_dt(dt);

        self.rebuild_index();

        let mut candidates = std::mem::take(&mut self.scratch);
        for i in 0..self.bodies.len() {
            if !self.bodies[i].is_active() {
                continue;
            }

            let body = &mut self.bodies[i];
            body.integrate(self.gravity, dt, self.state.speed_modifier);
            body.resolve_boundary(self.arena.width, self.arena.height);

            candidates.clear();
            gather(&self.quadtree, self.query, &self.bodies[i], &mut candidates);

            for &j in &candidates {
                let j = j as usize;
                if j != i {
                    let (a, b) = pair_mut(&mut self.bodies, i, j);
                    resolve_pair(a, b);
                }
            }
        }
        self.scratch = candidates;

        self.frame += 1;
    }

    /// Clears the quadtree and inserts every active body.
    pub fn rebuild_index(&mut self) {
        self.quadtree.clear();
        for (i, body) in self.bodies.iter().enumerate() {
            if body.is_active() {
                self.quadtree.insert(i as u32, &self.bodies);
            }
        }
    }

    fn sanitize_dt(dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "rejected delta time, stepping with 0");
            0.0
        } else if dt > MAX_DT {
            warn!(dt, max = MAX_DT, "clamped delta time");
            MAX_DT
        } else {
            dt
        }
    }

    /// Collision candidates of body `index` from the current quadtree,
    /// without rebuilding it. Inactive bodies have no candidates.
    pub fn query_candidates(&self, index: usize) -> Result<Vec<u32>, SimError> {
        let body = self.bodies.get(index).ok_or(SimError::UnknownBody {
            index,
            len: self.bodies.len(),
        })?;

        let mut out = Vec::new();
        if body.is_active() {
            gather(&self.quadtree, self.query, body, &mut out);
            out.retain(|&j| j as usize != index);
        }
        Ok(out)
    }

    /// Every `(body, candidate)` pair of the current quadtree, in body order.
    /// Each active body is queried in parallel; nothing is mutated.
    pub fn candidate_pairs(&self) -> Vec<(u32, u32)> {
        (0..self.bodies.len())
            .into_par_iter()
            .filter(|&i| self.bodies[i].is_active())
            .flat_map_iter(|i| {
                let mut out = Vec::new();
                gather(&self.quadtree, self.query, &self.bodies[i], &mut out);
                out.into_iter()
                    .filter(move |&j| j as usize != i)
                    .map(move |j| (i as u32, j))
            })
            .collect()
    }

    /// Exact list of overlapping active pairs `(i, j)` with `i < j`, sorted.
    /// Uses the `broccoli` broad phase, independent of the quadtree.
    pub fn overlapping_pairs(&self) -> Vec<(u32, u32)> {
        let mut rects = self
            .bodies
            .iter()
            .enumerate()
            .filter(|(_, body)| body.is_active())
            .map(|(index, body)| {
                let (min, max) = body.bounds();
                (Rect::new(min.x, max.x, min.y, max.y), index)
            })
            .collect::<Vec<_>>();

        let mut pairs = Vec::new();
        let mut broccoli = broccoli::Tree::new(&mut rects);

        broccoli.find_colliding_pairs(|i, j| {
            let i = *i.unpack_inner();
            let j = *j.unpack_inner();

            if overlaps(&self.bodies[i], &self.bodies[j]) {
                pairs.push((i.min(j) as u32, i.max(j) as u32));
            }
        });

        pairs.sort_unstable();
        pairs
    }
}

fn gather(quadtree: &Quadtree, query: CandidateQuery, body: &Body, out: &mut Vec<u32>) {
    match query {
        CandidateQuery::Ancestors => quadtree.retrieve(body, out),
        CandidateQuery::Overlapping => quadtree.retrieve_overlapping(body, out),
    }
}

/// Two distinct mutable entries of `bodies`.
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// True if the discs of `a` and `b` intersect.
pub fn overlaps(a: &Body, b: &Body) -> bool {
    let r = a.radius() + b.radius();
    (a.pos - b.pos).mag_sq() < r * r
}

/// Resolves an elastic collision between two overlapping bodies.
///
/// Velocities are split along the center line (normal) and across it
/// (tangent). Tangential parts pass through; normal parts follow the 1D
/// elastic collision of the two masses. Positions are never corrected here,
/// the new velocities separate the bodies over the next steps.
///
/// Returns `false` without touching either body if they do not overlap or
/// are already separating along the normal.
pub fn resolve_pair(a: &mut Body, b: &mut Body) -> bool {
    let n = a.pos - b.pos;
    let mut d = n.mag();

    if d >= a.radius() + b.radius() {
        return false;
    }
    if d == 0.0 {
        d = NORMAL_EPSILON;
    }

    let normal = n / d;
    let tangent = Vec2::new(-normal.y, normal.x);

    let ua = a.vel.dot(normal);
    let ub = b.vel.dot(normal);

    // Already moving apart (or resting against each other).
    if ua - ub >= 0.0 {
        return false;
    }

    let ta = a.vel.dot(tangent);
    let tb = b.vel.dot(tangent);

    let (ma, mb) = (a.mass(), b.mass());
    let common = 2.0 * (ma * ua + mb * ub) / (ma + mb);

    a.vel = normal * (common - ua) + tangent * ta;
    b.vel = normal * (common - ub) + tangent * tb;

    true
}

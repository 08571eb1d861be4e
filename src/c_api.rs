use crate::{
    body::Body,
    config::SimConfig,
    quadtree::Region,
    simulation::Simulation,
};
use tracing::error;

/// Returns null if the parameters are rejected.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn Simulation_Create(
    arena_width: f32,
    arena_height: f32,
    min_radius: f32,
    max_radius: f32,
    spawn_count: usize,
    gravity: f32,
    spawn_x: f32,
    spawn_y: f32,
) -> *mut Simulation {
    let config = SimConfig {
        arena_width,
        arena_height,
        min_radius,
        max_radius,
        spawn_count,
        gravity,
        spawn_x,
        spawn_y,
        rng_seed: None,
    };

    match Simulation::new(&config) {
        Ok(sim) => Box::into_raw(Box::new(sim)),
        Err(err) => {
            error!(%err, "failed to create simulation");
            std::ptr::null_mut()
        }
    }
}

/// # Safety
/// `handle` must be null or come from `Simulation_Create` and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Step(handle: *mut Simulation, dt: f32) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.step(dt);
    }
}

/// Returns the activated index, or -1 when the pool is exhausted.
///
/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_ActivateNext(handle: *mut Simulation) -> isize {
    unsafe { handle.as_mut() }
        .and_then(|sim| sim.activate_next())
        .map_or(-1, |index| index as isize)
}

/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.bodies().len())
}

/// The pointer stays valid until the handle is destroyed.
///
/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodies(handle: *const Simulation) -> *const Body {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.bodies().as_ptr())
}

/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetSpeedModifier(handle: *const Simulation) -> f32 {
    unsafe { handle.as_ref() }.map_or(0.0, |sim| sim.speed_modifier())
}

/// Returns false if the value is rejected.
///
/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetSpeedModifier(handle: *mut Simulation, value: f32) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| sim.set_speed_modifier(value).is_ok())
}

/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetPaused(handle: *mut Simulation, paused: bool) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.set_paused(paused);
    }
}

/// Writes up to `capacity` candidate indices of body `index` into `out`
/// and returns how many candidates exist in total.
///
/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`, and
/// `out` must be null or valid for `capacity` writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_QueryCandidates(
    handle: *const Simulation,
    index: usize,
    out: *mut u32,
    capacity: usize,
) -> usize {
    let Some(sim) = (unsafe { handle.as_ref() }) else {
        return 0;
    };
    let Ok(candidates) = sim.query_candidates(index) else {
        return 0;
    };

    if !out.is_null() {
        let n = candidates.len().min(capacity);
        unsafe { std::ptr::copy_nonoverlapping(candidates.as_ptr(), out, n) };
    }
    candidates.len()
}

/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetNodeCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.quadtree().nodes.len())
}

/// Copies the region of quadtree node `node` into `out`. Returns false if
/// the node does not exist.
///
/// # Safety
/// `handle` must be null or a live handle from `Simulation_Create`, and
/// `out` must be null or valid for one write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetNodeRegion(
    handle: *const Simulation,
    node: usize,
    out: *mut Region,
) -> bool {
    let region = unsafe { handle.as_ref() }
        .and_then(|sim| sim.quadtree().nodes.get(node))
        .map(|n| n.region);

    match (region, unsafe { out.as_mut() }) {
        (Some(region), Some(out)) => {
            *out = region;
            true
        }
        _ => false,
    }
}

use crate::{
    body::Body,
    config::SimulationConfig,
    simulation::Simulation,
};
use tracing::warn;
use ultraviolet::DVec2;

pub const STATUS_OK: i32 = 0;
pub const STATUS_NULL_HANDLE: i32 = -1;
pub const STATUS_REJECTED: i32 = -2;

/// Creates an empty simulation over a `width` x `height` domain centered on
/// the origin. Returns null if the parameters are rejected.
#[unsafe(no_mangle)]
pub extern "C" fn Simulation_Create(width: f64, height: f64, capacity: usize) -> *mut Simulation {
    let config = SimulationConfig::with_domain(width, height, capacity);
    match Simulation::new(config, Vec::new()) {
        Ok(sim) => Box::into_raw(Box::new(sim)),
        Err(err) => {
            warn!(%err, "Simulation_Create failed");
            std::ptr::null_mut()
        }
    }
}

/// # Safety
/// `handle` must be null or a pointer returned by [`Simulation_Create`]
/// that has not been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// # Safety
/// See [`Simulation_Destroy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Step(handle: *mut Simulation, dt: f64) -> i32 {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return STATUS_NULL_HANDLE;
    };
    match sim.step(dt) {
        Ok(()) => STATUS_OK,
        Err(_) => STATUS_REJECTED,
    }
}

/// # Safety
/// See [`Simulation_Destroy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_AddBody(
    handle: *mut Simulation,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    mass: f64,
) -> i32 {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return STATUS_NULL_HANDLE;
    };
    let body = Body::new(DVec2::new(x, y), DVec2::new(vx, vy), mass);
    match sim.add_body(body) {
        Ok(_) => STATUS_OK,
        Err(_) => STATUS_REJECTED,
    }
}

/// # Safety
/// See [`Simulation_Destroy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.bodies().len())
}

/// Pointer to the first of [`Simulation_GetBodyCount`] bodies. Valid until
/// the next call that mutates the simulation.
///
/// # Safety
/// See [`Simulation_Destroy`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodies(handle: *const Simulation) -> *const Body {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.bodies().as_ptr())
}

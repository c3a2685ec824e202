//! Per-frame render state, passed explicitly down the traversal.

use glam::{DMat4, DVec3};

/// Camera and clock state for one frame.
///
/// Constructed fresh by the host each frame and passed into
/// [`ChunkedLodGlobe::render`]; the traversal holds no ambient camera
/// state of its own.
///
/// [`ChunkedLodGlobe::render`]: crate::lod::ChunkedLodGlobe::render
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Camera position in ellipsoid-centered cartesian coordinates.
    pub camera_position: DVec3,
    /// Combined view-projection matrix for the frame.
    pub view_projection: DMat4,
    /// Simulation time in seconds, fed to temporal providers.
    pub simulation_time: f64,
}

impl RenderContext {
    /// Create a context for a frame at simulation time zero.
    pub fn new(camera_position: DVec3, view_projection: DMat4) -> Self {
        Self {
            camera_position,
            view_projection,
            simulation_time: 0.0,
        }
    }

    /// Set the simulation time for this frame.
    pub fn with_simulation_time(mut self, seconds: f64) -> Self {
        self.simulation_time = seconds;
        self
    }
}

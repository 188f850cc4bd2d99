// Viewport - pan offset and zoom factor, screen <-> grid mapping
//
// Rendering applies translate(pan) then scale(zoom) and draws cell (x, y) at
// (x * CELL_SIZE, y * CELL_SIZE). screen_to_grid is the exact inverse.
// Zoom is anchored at the origin: zooming never changes pan.
use glam::{DVec2, IVec2};

/// Side of one grid cell in unscaled canvas pixels.
pub const CELL_SIZE: f64 = 2.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

const ZOOM_IN_FACTOR: f64 = 1.1;
const ZOOM_OUT_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel scrolled down (positive delta) zooms out.
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 { Self::Out } else { Self::In }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: DVec2,
    pub zoom: f64,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            pan: DVec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Grid cell under a screen position (canvas-relative pixels).
    /// May be outside the grid; callers check bounds.
    #[inline]
    pub fn screen_to_grid(&self, screen: DVec2) -> IVec2 {
        let cell = ((screen - self.pan) / self.zoom / CELL_SIZE).floor();
        IVec2::new(cell.x as i32, cell.y as i32)
    }

    /// Screen position of a cell's top-left corner.
    #[inline]
    pub fn grid_to_screen(&self, cell: IVec2) -> DVec2 {
        cell.as_dvec2() * CELL_SIZE * self.zoom + self.pan
    }

    pub fn zoom_by(&mut self, direction: ZoomDirection) {
        let factor = match direction {
            ZoomDirection::In => ZOOM_IN_FACTOR,
            ZoomDirection::Out => ZOOM_OUT_FACTOR,
        };
        self.set_zoom(self.zoom * factor);
    }

    /// Set zoom directly (zoom slider). Clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn pan_by(&mut self, delta: DVec2) {
        self.pan += delta;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

// Canvas rendering - painted cells and the reference mesh
//
// `render` is a pure function of (pixels, viewport, grid, hover): it only issues
// draw calls against a `Surface`, so the same frame can be replayed against
// a recording surface in tests.
use crate::viewport::{Viewport, CELL_SIZE};
use glam::{DVec2, IVec2};
use protocol::{GridSize, Pixel};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub const BACKGROUND: &str = "#333";
pub const MESH_COLOR: &str = "#444";
pub const HOVER_COLOR: &str = "#fff";

/// The mesh is only drawn above this zoom.
const MESH_MIN_ZOOM: f64 = 0.5;

/// Drawing primitives the renderer needs.
pub trait Surface {
    fn size(&self) -> DVec2;
    fn reset_transform(&mut self);
    fn translate(&mut self, offset: DVec2);
    fn scale(&mut self, factor: f64);
    fn fill_rect(&mut self, color: &str, origin: DVec2, size: DVec2);
    /// Stroke every segment as a single path.
    fn stroke_lines(&mut self, color: &str, width: f64, segments: &[(DVec2, DVec2)]);
}

/// Mesh line spacing in cells, or `None` when zoomed out too far to draw it.
/// Fewer lines at low zoom, one per cell from zoom 10 up.
pub fn mesh_spacing(zoom: f64) -> Option<u32> {
    if zoom > MESH_MIN_ZOOM {
        Some(((10.0 / zoom).floor() as u32).max(1))
    } else {
        None
    }
}

/// Paint one frame. `hover` is the cell under the pointer, outlined when it
/// lies inside the grid.
pub fn render<S: Surface>(
    surface: &mut S,
    pixels: &[Pixel],
    viewport: &Viewport,
    grid: GridSize,
    hover: Option<IVec2>,
) {
    surface.reset_transform();
    let size = surface.size();
    surface.fill_rect(BACKGROUND, DVec2::ZERO, size);

    surface.translate(viewport.pan);
    surface.scale(viewport.zoom);

    let cell = DVec2::splat(CELL_SIZE);
    for pixel in pixels {
        let origin = DVec2::new(pixel.x as f64, pixel.y as f64) * CELL_SIZE;
        surface.fill_rect(&pixel.color, origin, cell);
    }

    if let Some(spacing) = mesh_spacing(viewport.zoom) {
        let segments = mesh_segments(grid, spacing);
        surface.stroke_lines(MESH_COLOR, 0.5 / viewport.zoom, &segments);
    }

    if let Some(cell) = hover.filter(|c| grid.contains(c.x as i64, c.y as i64)) {
        // Outline in screen space so it stays one pixel wide at any zoom.
        surface.reset_transform();
        let origin = viewport.grid_to_screen(cell);
        let side = CELL_SIZE * viewport.zoom;
        surface.stroke_lines(HOVER_COLOR, 1.0, &outline(origin, side));
    }
}

fn outline(origin: DVec2, side: f64) -> [(DVec2, DVec2); 4] {
    let top_right = origin + DVec2::new(side, 0.0);
    let bottom_right = origin + DVec2::splat(side);
    let bottom_left = origin + DVec2::new(0.0, side);
    [
        (origin, top_right),
        (top_right, bottom_right),
        (bottom_right, bottom_left),
        (bottom_left, origin),
    ]
}

/// Vertical then horizontal mesh lines across the whole grid, in unscaled
/// canvas units.
fn mesh_segments(grid: GridSize, spacing: u32) -> Vec<(DVec2, DVec2)> {
    let right = grid.width as f64 * CELL_SIZE;
    let bottom = grid.height as f64 * CELL_SIZE;
    let step = spacing as usize;

    let vertical = (0..=grid.width).step_by(step).map(|i| {
        let x = i as f64 * CELL_SIZE;
        (DVec2::new(x, 0.0), DVec2::new(x, bottom))
    });
    let horizontal = (0..=grid.height).step_by(step).map(|i| {
        let y = i as f64 * CELL_SIZE;
        (DVec2::new(0.0, y), DVec2::new(right, y))
    });

    vertical.chain(horizontal).collect()
}

/// `Surface` over a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    #[inline]
    fn size(&self) -> DVec2 {
        DVec2::new(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn reset_transform(&mut self) {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    }

    fn translate(&mut self, offset: DVec2) {
        self.ctx.translate(offset.x, offset.y).ok();
    }

    fn scale(&mut self, factor: f64) {
        self.ctx.scale(factor, factor).ok();
    }

    #[inline]
    fn fill_rect(&mut self, color: &str, origin: DVec2, size: DVec2) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(origin.x, origin.y, size.x, size.y);
    }

    fn stroke_lines(&mut self, color: &str, width: f64, segments: &[(DVec2, DVec2)]) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        for (from, to) in segments {
            self.ctx.move_to(from.x, from.y);
            self.ctx.line_to(to.x, to.y);
        }
        self.ctx.stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(x: u32, y: u32, color: &str) -> Pixel {
        serde_json::from_value(serde_json::json!({
            "x": x, "y": y, "color": color, "owner": "IP_test",
            "timestamp": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[derive(Debug, PartialEq)]
    enum Op {
        Reset,
        Translate(DVec2),
        Scale(f64),
        Fill(String, DVec2, DVec2),
        Lines(String, f64, usize),
    }

    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn size(&self) -> DVec2 {
            DVec2::new(800.0, 600.0)
        }
        fn reset_transform(&mut self) {
            self.ops.push(Op::Reset);
        }
        fn translate(&mut self, offset: DVec2) {
            self.ops.push(Op::Translate(offset));
        }
        fn scale(&mut self, factor: f64) {
            self.ops.push(Op::Scale(factor));
        }
        fn fill_rect(&mut self, color: &str, origin: DVec2, size: DVec2) {
            self.ops.push(Op::Fill(color.to_string(), origin, size));
        }
        fn stroke_lines(&mut self, color: &str, width: f64, segments: &[(DVec2, DVec2)]) {
            self.ops.push(Op::Lines(color.to_string(), width, segments.len()));
        }
    }

    fn frame(pixels: &[Pixel], viewport: &Viewport, grid: GridSize) -> Vec<Op> {
        frame_with_hover(pixels, viewport, grid, None)
    }

    fn frame_with_hover(
        pixels: &[Pixel],
        viewport: &Viewport,
        grid: GridSize,
        hover: Option<IVec2>,
    ) -> Vec<Op> {
        let mut recorder = Recorder { ops: Vec::new() };
        render(&mut recorder, pixels, viewport, grid, hover);
        recorder.ops
    }

    #[test]
    fn test_mesh_spacing() {
        assert_eq!(mesh_spacing(0.5), None);
        assert_eq!(mesh_spacing(0.51), Some(19));
        assert_eq!(mesh_spacing(1.0), Some(10));
        assert_eq!(mesh_spacing(3.0), Some(3));
        assert_eq!(mesh_spacing(10.0), Some(1));
    }

    #[test]
    fn test_frame_order() {
        let viewport = Viewport {
            pan: DVec2::new(10.0, 20.0),
            zoom: 2.0,
        };
        let pixels = [pixel(5, 5, "#ff0000")];
        let ops = frame(&pixels, &viewport, GridSize::new(20, 10));

        assert_eq!(
            ops,
            vec![
                Op::Reset,
                Op::Fill(BACKGROUND.to_string(), DVec2::ZERO, DVec2::new(800.0, 600.0)),
                Op::Translate(DVec2::new(10.0, 20.0)),
                Op::Scale(2.0),
                Op::Fill("#ff0000".to_string(), DVec2::new(10.0, 10.0), DVec2::splat(2.0)),
                // spacing 5: x = 0,5,10,15,20 and y = 0,5,10
                Op::Lines(MESH_COLOR.to_string(), 0.25, 8),
            ]
        );
    }

    #[test]
    fn test_no_mesh_when_zoomed_out() {
        let viewport = Viewport {
            pan: DVec2::ZERO,
            zoom: 0.3,
        };
        let ops = frame(&[], &viewport, GridSize::new(100, 100));
        assert!(!ops.iter().any(|op| matches!(op, Op::Lines(..))));
    }

    #[test]
    fn test_render_is_idempotent() {
        let viewport = Viewport::new();
        let pixels = [pixel(1, 2, "#00ff00"), pixel(3, 4, "#0000ff")];
        let grid = GridSize::new(50, 50);
        assert_eq!(frame(&pixels, &viewport, grid), frame(&pixels, &viewport, grid));
    }

    #[test]
    fn test_mesh_segments_cover_grid() {
        let segments = mesh_segments(GridSize::new(3, 2), 1);
        assert_eq!(segments.len(), 4 + 3);
        assert_eq!(segments[3], (DVec2::new(6.0, 0.0), DVec2::new(6.0, 4.0)));
        assert_eq!(segments[6], (DVec2::new(0.0, 4.0), DVec2::new(6.0, 4.0)));
    }

    #[test]
    fn test_hover_outline() {
        let viewport = Viewport {
            pan: DVec2::new(10.0, 20.0),
            zoom: 0.3,
        };
        let grid = GridSize::new(10, 10);

        let ops = frame_with_hover(&[], &viewport, grid, Some(IVec2::new(2, 3)));
        assert_eq!(
            &ops[ops.len() - 2..],
            &[Op::Reset, Op::Lines(HOVER_COLOR.to_string(), 1.0, 4)]
        );

        let outside = frame_with_hover(&[], &viewport, grid, Some(IVec2::new(10, 0)));
        assert_eq!(outside, frame(&[], &viewport, grid));
    }

    #[test]
    fn test_outline_sits_on_cell() {
        let viewport = Viewport {
            pan: DVec2::new(10.0, 20.0),
            zoom: 2.0,
        };
        let origin = viewport.grid_to_screen(IVec2::new(2, 3));
        assert_eq!(origin, DVec2::new(18.0, 32.0));

        let edges = outline(origin, CELL_SIZE * viewport.zoom);
        assert_eq!(edges[0], (DVec2::new(18.0, 32.0), DVec2::new(22.0, 32.0)));
        assert_eq!(edges[2], (DVec2::new(22.0, 36.0), DVec2::new(18.0, 36.0)));
    }
}

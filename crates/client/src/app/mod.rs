// Client state: viewport, pixel cache, input, cooldown clock, renderer
use crate::console_log;
use crate::cooldown::{format_remaining, ClockEvent, ClockNotice, CooldownClock};
use crate::input::{Command, InputController, InputEvent};
use crate::network::ApiClient;
use crate::render::{self, CanvasSurface};
use crate::ui::{MessageKind, UI};
use crate::utils;
use crate::viewport::{Viewport, CELL_SIZE};
use glam::DVec2;
use protocol::packets::{PlaceOutcome, ServerInfo};
use protocol::{GridSize, Pixel};
use wasm_bindgen::prelude::*;
use web_sys::{window, HtmlCanvasElement};

pub struct CanvasClient {
    surface: CanvasSurface,
    viewport: Viewport,
    pixels: Vec<Pixel>,
    input: InputController,
    clock: CooldownClock,
    ui: UI,
    api: ApiClient,
    grid: GridSize,
    /// Last pointer position over the canvas, for the hover outline.
    pointer: Option<DVec2>,
    /// Set whenever the next animation frame has to repaint.
    dirty: bool,
}

impl CanvasClient {
    pub fn new(canvas_id: &str, api_base: &str) -> Result<CanvasClient, JsValue> {
        let window = window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let (width, height) = utils::window_size();
        canvas.set_width(width);
        canvas.set_height(height);

        // Until the server reports its grid, assume one that fills the window.
        let grid = GridSize::new(
            (width as f64 / CELL_SIZE) as u32,
            (height as f64 / CELL_SIZE) as u32,
        );

        let client = Self {
            surface: CanvasSurface::new(canvas)?,
            viewport: Viewport::new(),
            pixels: Vec::new(),
            input: InputController::new(grid),
            clock: CooldownClock::new(),
            ui: UI::new(document),
            api: ApiClient::new(api_base),
            grid,
            pointer: None,
            dirty: true,
        };
        client.ui.update_cooldown(0);
        client.ui.update_zoom(client.viewport.zoom);

        Ok(client)
    }

    pub fn api(&self) -> ApiClient {
        self.api.clone()
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        self.surface.canvas()
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn selected_color(&self) -> String {
        self.ui.selected_color()
    }

    /// Adopt the server's grid size. Only called once per session.
    pub fn apply_server_info(&mut self, info: &ServerInfo) {
        console_log!(
            "Connected to {} v{} ({}x{}, {} storage)",
            info.name,
            info.version,
            info.grid.width,
            info.grid.height,
            info.storage
        );
        self.grid = info.grid;
        self.input = InputController::new(info.grid);
        self.ui.update_server_name(&info.name);
        self.dirty = true;
    }

    pub fn set_pixels(&mut self, pixels: Vec<Pixel>) {
        self.pixels = pixels;
        self.dirty = true;
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Command {
        if let InputEvent::PointerMove { pos } = event {
            let hovered = |p: DVec2| self.viewport.screen_to_grid(p);
            if self.pointer.map(hovered) != Some(hovered(pos)) {
                self.dirty = true;
            }
            self.pointer = Some(pos);
        }

        let command = self.input.handle(event, &mut self.viewport, &self.clock);
        match command {
            Command::Redraw => {
                self.dirty = true;
                self.ui.update_zoom(self.viewport.zoom);
            }
            Command::CooldownActive(remaining) => {
                self.ui.show_message(
                    &format!("Wait {} before placing another pixel", format_remaining(remaining)),
                    MessageKind::Error,
                );
            }
            Command::None | Command::Place { .. } => {}
        }
        command
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.ui.update_zoom(self.viewport.zoom);
        self.dirty = true;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let canvas = self.surface.canvas();
        canvas.set_width(width);
        canvas.set_height(height);
        self.dirty = true;
    }

    /// One-second countdown step.
    pub fn tick(&mut self) {
        if self.clock.apply(ClockEvent::Tick) == Some(ClockNotice::Ready) {
            self.ui.show_message("Ready to place!", MessageKind::Info);
        }
        self.ui.update_cooldown(self.clock.remaining());
    }

    pub fn sync_cooldown(&mut self, remaining: u64) {
        self.clock.apply(ClockEvent::Sync(remaining));
        self.ui.update_cooldown(self.clock.remaining());
    }

    /// Report a placement answer. Returns true when the pixel list should
    /// be reloaded.
    pub fn apply_outcome(&mut self, outcome: PlaceOutcome) -> bool {
        match outcome {
            PlaceOutcome::Placed(response) => {
                self.ui.show_message(&response.message, MessageKind::Success);
                self.sync_cooldown(response.cooldown_time);
                true
            }
            PlaceOutcome::RateLimited {
                message,
                remaining_time,
                ..
            } => {
                self.sync_cooldown(remaining_time);
                self.ui.show_message(
                    &format!("{} ({})", message, format_remaining(remaining_time)),
                    MessageKind::Error,
                );
                false
            }
            PlaceOutcome::Rejected { error, .. } => {
                self.ui.show_message(&error, MessageKind::Error);
                false
            }
        }
    }

    pub fn show_error(&self, text: &str) {
        self.ui.show_message(text, MessageKind::Error);
    }

    /// Repaint if anything changed since the last frame.
    pub fn frame(&mut self) {
        if !self.dirty {
            return;
        }
        let hover = self.pointer.map(|p| self.viewport.screen_to_grid(p));
        render::render(&mut self.surface, &self.pixels, &self.viewport, self.grid, hover);
        self.dirty = false;
    }
}

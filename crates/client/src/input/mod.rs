// Pointer and wheel input -> client commands
//
// The DOM glue translates browser events into `InputEvent`s; everything that
// decides what an event means lives here so it can be tested off-browser.
use crate::cooldown::CooldownClock;
use crate::viewport::{Viewport, ZoomDirection};
use glam::DVec2;
use protocol::GridSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other,
}

impl PointerButton {
    /// Map `MouseEvent.button`.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: DVec2,
        button: PointerButton,
        ctrl: bool,
    },
    PointerMove {
        pos: DVec2,
    },
    PointerUp,
    Click {
        pos: DVec2,
    },
    Wheel {
        delta_y: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    /// The viewport changed.
    Redraw,
    /// Submit a placement for this cell.
    Place { x: u32, y: u32 },
    /// A click landed while the local countdown is running.
    CooldownActive(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PanGesture {
    Idle,
    Panning { last: DVec2 },
}

pub struct InputController {
    gesture: PanGesture,
    /// The click that ends a Ctrl+drag pan must not place a pixel.
    suppress_click: bool,
    grid: GridSize,
}

impl InputController {
    pub fn new(grid: GridSize) -> Self {
        Self {
            gesture: PanGesture::Idle,
            suppress_click: false,
            grid,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, PanGesture::Panning { .. })
    }

    pub fn handle(
        &mut self,
        event: InputEvent,
        viewport: &mut Viewport,
        clock: &CooldownClock,
    ) -> Command {
        match event {
            InputEvent::PointerDown { pos, button, ctrl } => {
                let pans = ctrl || matches!(button, PointerButton::Middle | PointerButton::Secondary);
                if pans {
                    self.gesture = PanGesture::Panning { last: pos };
                    self.suppress_click = true;
                } else {
                    self.suppress_click = false;
                }
                Command::None
            }
            InputEvent::PointerMove { pos } => match self.gesture {
                PanGesture::Panning { last } => {
                    viewport.pan_by(pos - last);
                    self.gesture = PanGesture::Panning { last: pos };
                    Command::Redraw
                }
                PanGesture::Idle => Command::None,
            },
            InputEvent::PointerUp => {
                self.gesture = PanGesture::Idle;
                Command::None
            }
            InputEvent::Click { pos } => {
                if self.is_panning() || std::mem::take(&mut self.suppress_click) {
                    return Command::None;
                }
                self.click(pos, viewport, clock)
            }
            InputEvent::Wheel { delta_y } => {
                viewport.zoom_by(ZoomDirection::from_wheel_delta(delta_y));
                Command::Redraw
            }
        }
    }

    fn click(&self, pos: DVec2, viewport: &Viewport, clock: &CooldownClock) -> Command {
        let cell = viewport.screen_to_grid(pos);
        if !self.grid.contains(cell.x as i64, cell.y as i64) {
            return Command::None;
        }
        if clock.is_cooling() {
            return Command::CooldownActive(clock.remaining());
        }
        Command::Place {
            x: cell.x as u32,
            y: cell.y as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::ClockEvent;

    fn setup() -> (InputController, Viewport, CooldownClock) {
        (
            InputController::new(GridSize::new(100, 100)),
            Viewport::new(),
            CooldownClock::new(),
        )
    }

    fn down(x: f64, y: f64, button: PointerButton, ctrl: bool) -> InputEvent {
        InputEvent::PointerDown {
            pos: DVec2::new(x, y),
            button,
            ctrl,
        }
    }

    fn click(x: f64, y: f64) -> InputEvent {
        InputEvent::Click {
            pos: DVec2::new(x, y),
        }
    }

    #[test]
    fn test_click_places() {
        let (mut input, mut viewport, clock) = setup();
        input.handle(down(11.0, 21.0, PointerButton::Primary, false), &mut viewport, &clock);
        input.handle(InputEvent::PointerUp, &mut viewport, &clock);
        assert_eq!(
            input.handle(click(11.0, 21.0), &mut viewport, &clock),
            Command::Place { x: 5, y: 10 }
        );
    }

    #[test]
    fn test_click_outside_grid() {
        let (mut input, mut viewport, clock) = setup();
        assert_eq!(input.handle(click(-1.0, 5.0), &mut viewport, &clock), Command::None);
        assert_eq!(input.handle(click(200.0, 5.0), &mut viewport, &clock), Command::None);
        assert_eq!(input.handle(click(199.0, 199.0), &mut viewport, &clock), Command::Place { x: 99, y: 99 });
    }

    #[test]
    fn test_click_during_cooldown() {
        let (mut input, mut viewport, mut clock) = setup();
        clock.apply(ClockEvent::Sync(42));
        assert_eq!(
            input.handle(click(10.0, 10.0), &mut viewport, &clock),
            Command::CooldownActive(42)
        );
    }

    #[test]
    fn test_ctrl_drag_pans_and_swallows_click() {
        let (mut input, mut viewport, clock) = setup();
        input.handle(down(100.0, 100.0, PointerButton::Primary, true), &mut viewport, &clock);
        assert!(input.is_panning());

        let moved = input.handle(InputEvent::PointerMove { pos: DVec2::new(110.0, 95.0) }, &mut viewport, &clock);
        assert_eq!(moved, Command::Redraw);
        input.handle(InputEvent::PointerMove { pos: DVec2::new(130.0, 95.0) }, &mut viewport, &clock);
        assert_eq!(viewport.pan, DVec2::new(30.0, -5.0));

        input.handle(InputEvent::PointerUp, &mut viewport, &clock);
        assert!(!input.is_panning());
        assert_eq!(input.handle(click(130.0, 95.0), &mut viewport, &clock), Command::None);

        // the next ordinary click goes through
        input.handle(down(50.0, 50.0, PointerButton::Primary, false), &mut viewport, &clock);
        input.handle(InputEvent::PointerUp, &mut viewport, &clock);
        assert_eq!(
            input.handle(click(50.0, 50.0), &mut viewport, &clock),
            Command::Place { x: 10, y: 27 }
        );
    }

    #[test]
    fn test_click_during_active_pan_is_ignored() {
        let (mut input, mut viewport, clock) = setup();
        input.handle(down(40.0, 40.0, PointerButton::Primary, true), &mut viewport, &clock);
        input.handle(InputEvent::PointerMove { pos: DVec2::new(60.0, 40.0) }, &mut viewport, &clock);
        assert!(input.is_panning());

        assert_eq!(input.handle(click(60.0, 40.0), &mut viewport, &clock), Command::None);
        assert!(input.is_panning());
    }

    #[test]
    fn test_middle_button_pans() {
        let (mut input, mut viewport, clock) = setup();
        input.handle(down(0.0, 0.0, PointerButton::Middle, false), &mut viewport, &clock);
        input.handle(InputEvent::PointerMove { pos: DVec2::new(-4.0, 8.0) }, &mut viewport, &clock);
        assert_eq!(viewport.pan, DVec2::new(-4.0, 8.0));
    }

    #[test]
    fn test_move_without_pan_is_ignored() {
        let (mut input, mut viewport, clock) = setup();
        let command = input.handle(InputEvent::PointerMove { pos: DVec2::new(5.0, 5.0) }, &mut viewport, &clock);
        assert_eq!(command, Command::None);
        assert_eq!(viewport.pan, DVec2::ZERO);
    }

    #[test]
    fn test_wheel_zooms() {
        let (mut input, mut viewport, clock) = setup();
        assert_eq!(input.handle(InputEvent::Wheel { delta_y: -100.0 }, &mut viewport, &clock), Command::Redraw);
        assert!((viewport.zoom - 1.1).abs() < 1e-9);
        input.handle(InputEvent::Wheel { delta_y: 100.0 }, &mut viewport, &clock);
        assert!((viewport.zoom - 0.99).abs() < 1e-9);
        assert_eq!(viewport.pan, DVec2::ZERO);
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Middle);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other);
    }
}

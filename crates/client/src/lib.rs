// WASM client entry point for pixelnet
// Canvas viewer/editor for the shared pixel grid

use wasm_bindgen::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{window, HtmlInputElement, MouseEvent, WheelEvent};

mod app;      // Client state, ties the pieces together
mod cooldown; // Advisory cooldown countdown
mod input;    // Pointer/wheel events -> commands
mod network;  // HTTP API calls
mod render;   // Canvas drawing
mod ui;       // DOM banner, cooldown panel, controls
mod utils;    // Logging macros, DOM helpers
mod viewport; // Pan/zoom and screen <-> grid mapping

pub use app::CanvasClient;

use input::{Command, InputEvent, PointerButton};

const TICK_INTERVAL_MS: i32 = 1000;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Handle JS keeps alive for the lifetime of the page.
#[wasm_bindgen]
pub struct CanvasClientWrapper {
    client: Rc<RefCell<CanvasClient>>,
}

#[wasm_bindgen]
impl CanvasClientWrapper {
    /// Attach to a canvas and start the session. `api_base` is prepended to
    /// API paths; pass "" when the page is served by the API itself.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, api_base: &str) -> Result<CanvasClientWrapper, JsValue> {
        init();

        let client = Rc::new(RefCell::new(CanvasClient::new(canvas_id, api_base)?));

        setup_animation_loop(client.clone())?;
        setup_pointer_handlers(client.clone())?;
        setup_zoom_handlers(client.clone())?;
        setup_cooldown_tick(client.clone())?;
        setup_resize_handler(client.clone())?;

        wasm_bindgen_futures::spawn_local(load_session(client.clone()));

        Ok(CanvasClientWrapper { client })
    }

    /// Re-fetch every pixel.
    pub fn reload(&self) {
        wasm_bindgen_futures::spawn_local(reload_pixels(self.client.clone()));
    }

    pub fn grid_width(&self) -> u32 {
        self.client.borrow().grid().width
    }

    pub fn grid_height(&self) -> u32 {
        self.client.borrow().grid().height
    }
}

/// Grid size, pixels and the server's cooldown view, in that order.
async fn load_session(client: Rc<RefCell<CanvasClient>>) {
    let api = client.borrow().api();

    match api.fetch_info().await {
        Ok(info) => client.borrow_mut().apply_server_info(&info),
        Err(e) => console_error!("Failed to load server info, using window-sized grid: {:?}", e),
    }

    reload_pixels(client.clone()).await;

    match api.fetch_cooldown().await {
        Ok(status) => client.borrow_mut().sync_cooldown(status.remaining_time),
        Err(e) => console_error!("Failed to load cooldown status: {:?}", e),
    }
}

async fn reload_pixels(client: Rc<RefCell<CanvasClient>>) {
    let api = client.borrow().api();
    match api.fetch_pixels().await {
        Ok(pixels) => client.borrow_mut().set_pixels(pixels),
        Err(e) => console_error!("Failed to load pixels: {:?}", e),
    }
}

async fn place_pixel(client: Rc<RefCell<CanvasClient>>, x: u32, y: u32) {
    // No borrow may be held across an await point.
    let (api, color) = {
        let client = client.borrow();
        (client.api(), client.selected_color())
    };

    let outcome = match api.place(x, y, &color).await {
        Ok(outcome) => outcome,
        Err(e) => {
            console_error!("Failed to place pixel: {:?}", e);
            client.borrow().show_error("Connection error");
            return;
        }
    };

    let reload = client.borrow_mut().apply_outcome(outcome);
    if reload {
        reload_pixels(client).await;
    }
}

fn dispatch(client: &Rc<RefCell<CanvasClient>>, event: InputEvent) {
    let command = client.borrow_mut().handle_input(event);
    if let Command::Place { x, y } = command {
        wasm_bindgen_futures::spawn_local(place_pixel(client.clone(), x, y));
    }
}

fn setup_animation_loop(client: Rc<RefCell<CanvasClient>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;

    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        client.borrow_mut().frame();

        // Request next frame
        if let (Some(win), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
            win.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
        }
    }) as Box<dyn FnMut()>));

    if let Some(cb) = g.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }

    Ok(())
}

fn setup_pointer_handlers(client: Rc<RefCell<CanvasClient>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let canvas = client.borrow().canvas().clone();

    // Mouse down
    {
        let client = client.clone();
        let target = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let button = PointerButton::from_dom(event.button());
            let ctrl = event.ctrl_key();
            if ctrl || button != PointerButton::Primary {
                event.prevent_default();
            }
            let pos = utils::canvas_position(&target, &event);
            dispatch(&client, InputEvent::PointerDown { pos, button, ctrl });
        }) as Box<dyn FnMut(_)>);

        canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Mouse move, on the document so a pan keeps going outside the canvas
    {
        let client = client.clone();
        let target = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let pos = utils::canvas_position(&target, &event);
            dispatch(&client, InputEvent::PointerMove { pos });
        }) as Box<dyn FnMut(_)>);

        document.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Mouse up
    {
        let client = client.clone();
        let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            dispatch(&client, InputEvent::PointerUp);
        }) as Box<dyn FnMut(_)>);

        document.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Click
    {
        let client = client.clone();
        let target = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let pos = utils::canvas_position(&target, &event);
            dispatch(&client, InputEvent::Click { pos });
        }) as Box<dyn FnMut(_)>);

        canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Right-drag pans, so the context menu stays closed
    {
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            event.prevent_default();
        }) as Box<dyn FnMut(_)>);

        canvas.add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn setup_zoom_handlers(client: Rc<RefCell<CanvasClient>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let canvas = client.borrow().canvas().clone();

    // Wheel never scrolls the page
    {
        let client = client.clone();
        let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
            event.prevent_default();
            dispatch(&client, InputEvent::Wheel { delta_y: event.delta_y() });
        }) as Box<dyn FnMut(_)>);

        canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Zoom slider is optional
    if let Some(slider) = document.get_element_by_id("zoomSlider") {
        let slider = slider.dyn_into::<HtmlInputElement>()?;
        let input = slider.clone();
        let closure = Closure::wrap(Box::new(move |_| {
            if let Ok(zoom) = input.value().parse::<f64>() {
                client.borrow_mut().set_zoom(zoom);
            }
        }) as Box<dyn FnMut(JsValue)>);

        slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn setup_cooldown_tick(client: Rc<RefCell<CanvasClient>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;

    let closure = Closure::wrap(Box::new(move || {
        // Skip a tick rather than panic if a handler holds the client.
        if let Ok(mut client) = client.try_borrow_mut() {
            client.tick();
        }
    }) as Box<dyn FnMut()>);

    window.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        TICK_INTERVAL_MS,
    )?;
    closure.forget();

    Ok(())
}

/// Resize the canvas when the browser window is resized.
fn setup_resize_handler(client: Rc<RefCell<CanvasClient>>) -> Result<(), JsValue> {
    let win = window().ok_or("No window")?;

    let closure = Closure::wrap(Box::new(move || {
        let (width, height) = utils::window_size();
        client.borrow_mut().resize(width, height);
    }) as Box<dyn FnMut()>);

    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(())
}

// DOM side of the client: message banner, cooldown panel, controls
use crate::cooldown::format_remaining;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement};

/// Banner messages disappear after this long.
const MESSAGE_TIMEOUT_MS: i32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

impl MessageKind {
    fn class(self) -> &'static str {
        match self {
            Self::Success => "message success",
            Self::Error => "message error",
            Self::Info => "message info",
        }
    }
}

pub struct UI {
    document: Document,
    /// Bumped per message so a stale hide timer leaves newer messages alone.
    message_generation: Rc<Cell<u32>>,
}

impl UI {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            message_generation: Rc::new(Cell::new(0)),
        }
    }

    fn get_el(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.get_el(id)?.dyn_into::<HtmlInputElement>().ok()
    }

    pub fn show_message(&self, text: &str, kind: MessageKind) {
        let Some(banner) = self.get_el("message") else {
            return;
        };
        banner.set_text_content(Some(text));
        banner.set_class_name(kind.class());

        let generation = self.message_generation.get().wrapping_add(1);
        self.message_generation.set(generation);

        let current = self.message_generation.clone();
        let hide = Closure::once(move || {
            if current.get() == generation {
                banner.set_class_name("message hidden");
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                hide.as_ref().unchecked_ref(),
                MESSAGE_TIMEOUT_MS,
            );
        }
        hide.forget();
    }

    /// Show the countdown, or the ready state when `remaining` is zero.
    pub fn update_cooldown(&self, remaining: u64) {
        let hidden = js_sys::Array::of1(&JsValue::from("hidden"));
        let (show, hide) = if remaining > 0 {
            ("cooldownPanel", "readyPanel")
        } else {
            ("readyPanel", "cooldownPanel")
        };
        if let Some(el) = self.get_el(show) {
            el.class_list().remove(&hidden).ok();
        }
        if let Some(el) = self.get_el(hide) {
            el.class_list().add(&hidden).ok();
        }
        if let Some(el) = self.get_el("cooldownTime") {
            el.set_text_content(Some(&format_remaining(remaining)));
        }
    }

    /// Currently picked color, `#rrggbb`.
    pub fn selected_color(&self) -> String {
        self.input("colorPicker")
            .map(|input| input.value())
            .unwrap_or_else(|| "#ff0000".to_string())
    }

    /// Reflect the zoom factor on the slider and its label.
    pub fn update_zoom(&self, zoom: f64) {
        if let Some(slider) = self.input("zoomSlider") {
            slider.set_value(&format!("{:.1}", zoom));
        }
        if let Some(el) = self.get_el("zoomLabel") {
            el.set_text_content(Some(&format!("{:.1}x", zoom)));
        }
    }

    pub fn update_server_name(&self, name: &str) {
        if let Some(el) = self.get_el("serverName") {
            el.set_text_content(Some(name));
        }
    }
}

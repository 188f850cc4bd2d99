// Helper utilities and logging

/// Log to browser console
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {{
        web_sys::console::log_1(&format!($($t)*).into());
    }}
}

/// Log an error to the browser console
#[macro_export]
macro_rules! console_error {
    ($($t:tt)*) => {{
        web_sys::console::error_1(&format!($($t)*).into());
    }}
}

/// Canvas-relative position of a mouse event.
pub fn canvas_position(canvas: &web_sys::HtmlCanvasElement, event: &web_sys::MouseEvent) -> glam::DVec2 {
    let rect = canvas.get_bounding_client_rect();
    glam::DVec2::new(
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    )
}

/// Window inner size in CSS pixels, or a fallback when unavailable.
pub fn window_size() -> (u32, u32) {
    let Some(window) = web_sys::window() else {
        return (800, 600);
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
    (width as u32, height as u32)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_log_macros_are_expressions() {
        // Only type-checked: console calls need a browser.
        fn report(result: Result<u32, String>) {
            match result {
                Ok(n) => console_log!("got {}", n),
                Err(e) => console_error!("failed: {}", e),
            }
        }
        let _ = report as fn(Result<u32, String>);
    }
}

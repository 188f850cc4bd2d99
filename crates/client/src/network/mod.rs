// HTTP calls against the pixelnet API
use protocol::packets::{
    CooldownStatus, PlaceOutcome, PlaceRequest, ServerInfo, API_PREFIX, COOLDOWN_PATH, PIXELS_PATH,
};
use protocol::Pixel;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// API client. `base` is prepended to every endpoint path; an empty base
/// means same origin.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn fetch_pixels(&self) -> Result<Vec<Pixel>, JsValue> {
        self.get_json(PIXELS_PATH).await
    }

    pub async fn fetch_cooldown(&self) -> Result<CooldownStatus, JsValue> {
        self.get_json(COOLDOWN_PATH).await
    }

    pub async fn fetch_info(&self) -> Result<ServerInfo, JsValue> {
        self.get_json(API_PREFIX).await
    }

    /// Submit a placement. Non-2xx answers are classified, not errors;
    /// `Err` means the request never produced a readable answer.
    pub async fn place(&self, x: u32, y: u32, color: &str) -> Result<PlaceOutcome, JsValue> {
        let body = serde_json::to_string(&PlaceRequest::new(x as i64, y as i64, color))
            .map_err(to_js)?;

        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&self.url(PIXELS_PATH), &init)?;
        let (status, text) = send(&request).await?;
        PlaceOutcome::from_response(status, &text).map_err(to_js)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, JsValue> {
        let init = RequestInit::new();
        init.set_method("GET");

        let request = Request::new_with_str_and_init(&self.url(path), &init)?;
        let (status, text) = send(&request).await?;
        if !(200..300).contains(&status) {
            return Err(JsValue::from_str(&format!("GET {} failed: HTTP {}", path, status)));
        }
        serde_json::from_str(&text).map_err(to_js)
    }
}

async fn send(request: &Request) -> Result<(u16, String), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let response: Response = JsFuture::from(window.fetch_with_request(request))
        .await?
        .dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    Ok((response.status(), text.as_string().unwrap_or_default()))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

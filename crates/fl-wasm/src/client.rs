//! Fetch helper for the optimization service.

use fl_core::error::ServiceError;
use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::AbortController;

/// POST `body` to `base_url + endpoint` and resolve with the response text.
///
/// Aborts after `timeout_ms`. Rejects with a `ServiceError` JSON string,
/// ready to hand to `FlCanvas::fail_request`. Never retries.
#[wasm_bindgen]
pub async fn send_request(
    base_url: String,
    endpoint: String,
    body: String,
    timeout_ms: u32,
) -> Result<String, JsValue> {
    post(&base_url, &endpoint, body, timeout_ms)
        .await
        .map_err(|e| JsValue::from_str(&crate::error_json(&e)))
}

async fn post(base_url: &str, endpoint: &str, body: String, timeout_ms: u32) -> Result<String, ServiceError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
    let controller = AbortController::new().map_err(|e| transport(&e))?;
    let window = web_sys::window().ok_or_else(|| ServiceError::Transport("no window".into()))?;

    let abort = controller.clone();
    let on_timeout = Closure::once_into_js(move || abort.abort());
    let timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.unchecked_ref(),
            i32::try_from(timeout_ms).unwrap_or(i32::MAX),
        )
        .map_err(|e| transport(&e))?;

    log::debug!("POST {url}");
    let signal = controller.signal();
    let result = send(&url, body, &signal).await;
    window.clear_timeout_with_handle(timer);

    match result {
        Err(_) if signal.aborted() => Err(ServiceError::Timeout { after_ms: timeout_ms }),
        other => other,
    }
}

async fn send(url: &str, body: String, signal: &web_sys::AbortSignal) -> Result<String, ServiceError> {
    let resp = Request::post(url)
        .header("Content-Type", "application/json")
        .abort_signal(Some(signal))
        .body(body)
        .map_err(|e| ServiceError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))?;

    if !resp.ok() {
        return Err(ServiceError::Rejected {
            code: resp.status(),
            message: resp.status_text(),
        });
    }
    resp.text()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))
}

fn transport(value: &JsValue) -> ServiceError {
    ServiceError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

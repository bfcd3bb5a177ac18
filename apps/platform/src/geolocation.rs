//! Device position through `navigator.geolocation`.

use js_sys::Promise;
use map_engine::{LocateOptions, LocationCallback, LocationError, PositionSource};
use serde::Deserialize;
use shared::{LatLng, LocationFix};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

#[wasm_bindgen(inline_js = r#"
export function currentPosition(highAccuracy, timeoutMs, maximumAgeMs) {
  return new Promise((resolve, reject) => {
    if (!navigator.geolocation) {
      reject({ code: 0 });
      return;
    }
    const options = { enableHighAccuracy: highAccuracy };
    if (timeoutMs >= 0) options.timeout = timeoutMs;
    if (maximumAgeMs >= 0) options.maximumAge = maximumAgeMs;
    navigator.geolocation.getCurrentPosition(
      (p) => resolve({ lat: p.coords.latitude, lng: p.coords.longitude, accuracy: p.coords.accuracy }),
      (e) => reject({ code: e.code }),
      options,
    );
  });
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = currentPosition)]
    fn current_position(high_accuracy: bool, timeout_ms: f64, maximum_age_ms: f64) -> Promise;
}

#[derive(Deserialize)]
struct RawFix {
    lat: f64,
    lng: f64,
    accuracy: Option<f64>,
}

#[derive(Deserialize)]
struct RawError {
    code: u16,
}

/// One-shot browser position lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLocator;

impl PositionSource for BrowserLocator {
    fn request(&self, options: &LocateOptions, done: LocationCallback) {
        let millis = |d: Option<std::time::Duration>| d.map_or(-1.0, |d| d.as_millis() as f64);
        let promise = current_position(
            options.high_accuracy,
            millis(options.timeout),
            millis(options.maximum_age),
        );
        tracing::debug!(high_accuracy = options.high_accuracy, "requesting device position");

        spawn_local(async move {
            let result = match JsFuture::from(promise).await {
                Ok(value) => decode::<RawFix>(&value)
                    .map(|raw| LocationFix {
                        accuracy_m: raw.accuracy,
                        ..LocationFix::now(LatLng::new(raw.lat, raw.lng))
                    })
                    .ok_or(LocationError::PositionUnavailable),
                Err(err) => Err(decode::<RawError>(&err)
                    .map_or(LocationError::Unsupported, |raw| LocationError::from_code(raw.code))),
            };
            done(result);
        });
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: &JsValue) -> Option<T> {
    let json = js_sys::JSON::stringify(value).ok()?;
    serde_json::from_str(&String::from(json)).ok()
}

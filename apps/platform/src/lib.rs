pub mod config;
pub mod demo;
pub mod markup;
pub mod replay;
pub mod telemetry;

#[cfg(feature = "hydrate")]
pub mod app;
#[cfg(feature = "hydrate")]
pub mod geolocation;
#[cfg(feature = "hydrate")]
pub mod map;

#[cfg(feature = "hydrate")]
pub use app::{App, JobMap};

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    let (config, config_err) = match config::from_page() {
        Ok(config) => (config, None),
        Err(err) => (map_engine::MapConfig::default(), Some(err)),
    };
    telemetry::init_browser(&config.log_filter);
    if let Some(err) = config_err {
        tracing::warn!(%err, "invalid map config, using defaults");
    }
    leptos::mount::mount_to_body(move || leptos::view! { <App config=config /> });
}

//! Map configuration.
//!
//! Every field has a default, so a host page only needs to supply the keys it
//! wants to change:
//!
//! ```json
//! { "default_center": { "lat": 28.61, "lng": 77.21 }, "flight_ms": 400 }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::{Camera, LatLng};

use crate::error::{MapError, MapResult};

/// Longest camera flight the engine will request.
pub const MAX_FLIGHT: Duration = Duration::from_secs(3);

/// Bangalore.
pub const DEFAULT_CENTER: LatLng = LatLng::new(12.9716, 77.5946);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_center: LatLng,
    pub default_zoom: f64,
    pub tile_url: String,
    pub tile_max_zoom: f64,
    pub attribution: String,
    /// CSS filter applied once to the tile pane.
    pub tile_filter: String,
    /// `locate()` never flies to a zoom lower than this.
    pub locate_min_zoom: f64,
    pub flight_ms: u64,
    pub geolocation: GeolocationConfig,
    pub log_filter: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            default_zoom: 13.0,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_max_zoom: 19.0,
            attribution:
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>"
                    .to_string(),
            tile_filter: "brightness(1.08) contrast(1.12) saturate(1.15) hue-rotate(-2deg)"
                .to_string(),
            locate_min_zoom: 15.0,
            flight_ms: 600,
            geolocation: GeolocationConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub high_accuracy: bool,
    pub timeout_ms: Option<u64>,
    pub maximum_age_ms: Option<u64>,
}

/// Options handed to a [`PositionSource`](crate::geolocation::PositionSource).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocateOptions {
    pub high_accuracy: bool,
    pub timeout: Option<Duration>,
    pub maximum_age: Option<Duration>,
}

/// The tile/background layer registered once per surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub url_template: String,
    pub max_zoom: f64,
    pub attribution: String,
    pub filter: Option<String>,
}

impl MapConfig {
    pub fn from_json(raw: &str) -> MapResult<Self> {
        let config: MapConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MapResult<()> {
        if !self.default_center.is_valid() {
            return Err(MapError::Config(format!(
                "default_center ({}, {}) is out of range",
                self.default_center.lat, self.default_center.lng
            )));
        }
        if !(self.tile_max_zoom.is_finite() && self.tile_max_zoom >= 0.0) {
            return Err(MapError::Config("tile_max_zoom must be >= 0".into()));
        }
        for (name, zoom) in [
            ("default_zoom", self.default_zoom),
            ("locate_min_zoom", self.locate_min_zoom),
        ] {
            if !(zoom.is_finite() && (0.0..=self.tile_max_zoom).contains(&zoom)) {
                return Err(MapError::Config(format!(
                    "{name} {zoom} outside 0..={}",
                    self.tile_max_zoom
                )));
            }
        }
        if self.flight() > MAX_FLIGHT {
            return Err(MapError::Config(format!(
                "flight_ms {} exceeds {}",
                self.flight_ms,
                MAX_FLIGHT.as_millis()
            )));
        }
        Ok(())
    }

    pub fn flight(&self) -> Duration {
        Duration::from_millis(self.flight_ms)
    }

    pub fn home(&self) -> Camera {
        Camera::new(self.default_center, self.default_zoom)
    }

    pub fn base_layer(&self) -> BaseLayer {
        let filter = self.tile_filter.trim();
        BaseLayer {
            url_template: self.tile_url.clone(),
            max_zoom: self.tile_max_zoom,
            attribution: self.attribution.clone(),
            filter: (!filter.is_empty()).then(|| filter.to_string()),
        }
    }

    pub fn locate_options(&self) -> LocateOptions {
        LocateOptions {
            high_accuracy: self.geolocation.high_accuracy,
            timeout: self.geolocation.timeout_ms.map(Duration::from_millis),
            maximum_age: self.geolocation.maximum_age_ms.map(Duration::from_millis),
        }
    }
}

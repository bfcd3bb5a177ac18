use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the WGS84 lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }

    /// Great-circle distance in metres.
    #[allow(deprecated)]
    pub fn distance_m(&self, other: &LatLng) -> f64 {
        use geo::HaversineDistance;
        self.to_point().haversine_distance(&other.to_point())
    }
}

impl From<LatLng> for geo::Point<f64> {
    fn from(value: LatLng) -> Self {
        value.to_point()
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinVariant {
    #[default]
    Job,
    Worker,
}

/// Logical marker supplied by the page. Pins carry no id: identity is the
/// position in the list they arrive in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub lat: f64,
    pub lng: f64,
    /// Price text shown in the badge and popup, e.g. "₹800".
    #[serde(default, alias = "price")]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub variant: PinVariant,
}

impl Pin {
    pub fn job(lat: f64, lng: f64, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            label: label.into(),
            icon: icon.into(),
            is_active: false,
            variant: PinVariant::Job,
        }
    }

    pub fn worker(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            label: String::new(),
            icon: String::new(),
            is_active: false,
            variant: PinVariant::Worker,
        }
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn is_worker(&self) -> bool {
        self.variant == PinVariant::Worker
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
}

impl Camera {
    pub const fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

/// A device position report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub position: LatLng,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    pub at: DateTime<Utc>,
}

impl LocationFix {
    pub fn now(position: LatLng) -> Self {
        Self {
            position,
            accuracy_m: None,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_ranges() {
        assert!(LatLng::new(12.97, 77.59).is_valid());
        assert!(LatLng::new(90.0, -180.0).is_valid());
        assert!(!LatLng::new(999.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 180.5).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn point_axes_are_lng_lat() {
        let p = LatLng::new(12.9, 77.5).to_point();
        assert_eq!(p.x(), 77.5);
        assert_eq!(p.y(), 12.9);
    }

    #[test]
    fn distance_between_nearby_pins() {
        let job = LatLng::new(12.97, 77.59);
        let worker = LatLng::new(12.96, 77.58);
        let d = job.distance_m(&worker);
        assert!(d > 1_000.0 && d < 2_000.0, "got {d}");
        assert_eq!(job.distance_m(&job), 0.0);
    }

    #[test]
    fn pin_json_uses_camel_case_and_defaults() {
        let pin: Pin = serde_json::from_str(
            r#"{"lat":12.97,"lng":77.59,"price":"₹800","icon":"🔧","isActive":true}"#,
        )
        .unwrap();
        assert_eq!(pin.label, "₹800");
        assert!(pin.is_active);
        assert_eq!(pin.variant, PinVariant::Job);

        let worker: Pin =
            serde_json::from_str(r#"{"lat":12.96,"lng":77.58,"variant":"worker"}"#).unwrap();
        assert!(worker.is_worker());
        assert!(!worker.is_active);
        assert!(worker.label.is_empty());
    }
}

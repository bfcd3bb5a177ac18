//! Camera ownership and controls.
//!
//! Who decides the camera center is an explicit state machine:
//!
//! ```text
//! Uncontrolled ──self location──▶ SelfCentered
//!      │                               │
//!      └──────explicit center──────────┴──▶ ExplicitlyCentered (terminal)
//! ```
//!
//! Once the caller has supplied a center, self location never moves the
//! camera again for the lifetime of the engine.

use std::time::Duration;

use serde::Serialize;
use shared::{Camera, LatLng};

use crate::config::{MapConfig, MAX_FLIGHT};
use crate::surface::{Surface, ZoomDirection};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "owner", content = "center", rename_all = "snake_case")]
pub enum CameraOwner {
    Uncontrolled,
    SelfCentered(LatLng),
    ExplicitlyCentered(LatLng),
}

#[derive(Debug, Clone)]
pub struct CameraController {
    owner: CameraOwner,
    zoom: f64,
    fallback: LatLng,
    locate_min_zoom: f64,
    flight: Duration,
}

impl CameraController {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            owner: CameraOwner::Uncontrolled,
            zoom: config.default_zoom,
            fallback: config.default_center,
            locate_min_zoom: config.locate_min_zoom,
            flight: config.flight().min(MAX_FLIGHT),
        }
    }

    pub fn owner(&self) -> CameraOwner {
        self.owner
    }

    /// Effective center: explicit, else self location, else the default.
    pub fn center(&self) -> LatLng {
        match self.owner {
            CameraOwner::ExplicitlyCentered(center) | CameraOwner::SelfCentered(center) => center,
            CameraOwner::Uncontrolled => self.fallback,
        }
    }

    /// The caller-supplied zoom.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn home(&self) -> Camera {
        Camera::new(self.center(), self.zoom)
    }

    pub fn flight(&self) -> Duration {
        self.flight
    }

    /// Apply the caller's `center` input. Returns the new center when it moved.
    pub fn explicit_center(&mut self, center: Option<LatLng>) -> Option<LatLng> {
        let center = center?;
        if !center.is_valid() {
            tracing::warn!(lat = center.lat, lng = center.lng, "ignoring invalid explicit center");
            return None;
        }
        if self.owner == CameraOwner::ExplicitlyCentered(center) {
            return None;
        }
        self.owner = CameraOwner::ExplicitlyCentered(center);
        Some(center)
    }

    /// Apply a resolved self location. Returns the new center if the camera
    /// should follow it.
    pub fn self_located(&mut self, at: LatLng) -> Option<LatLng> {
        match self.owner {
            CameraOwner::ExplicitlyCentered(_) => None,
            CameraOwner::SelfCentered(current) if current == at => None,
            CameraOwner::Uncontrolled | CameraOwner::SelfCentered(_) => {
                self.owner = CameraOwner::SelfCentered(at);
                Some(at)
            }
        }
    }

    /// Apply the caller's `zoom` input. Returns `true` when it changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() || zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Animated jump to the effective center at the caller zoom.
    pub fn sync_view<S: Surface>(&self, surface: &mut S) {
        surface.set_view(self.home(), true);
    }

    pub fn step_zoom<S: Surface>(&self, surface: &mut S, direction: ZoomDirection) {
        tracing::debug!(?direction, from = surface.zoom(), "zoom step");
        surface.step_zoom(direction);
    }

    /// Fly to the self location without zooming out. `false` when there is
    /// nothing to fly to.
    pub fn locate<S: Surface>(&self, surface: &mut S, self_location: Option<LatLng>) -> bool {
        let Some(target) = self_location else {
            return false;
        };
        let zoom = surface.zoom().max(self.locate_min_zoom);
        self.fly(surface, Camera::new(target, zoom));
        true
    }

    pub fn reset<S: Surface>(&self, surface: &mut S) {
        self.fly(surface, self.home());
    }

    fn fly<S: Surface>(&self, surface: &mut S, to: Camera) {
        tracing::debug!(
            lat = to.center.lat,
            lng = to.center.lng,
            zoom = to.zoom,
            from_home_m = self.center().distance_m(&to.center),
            "camera flight"
        );
        surface.fly_to(to, self.flight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(&MapConfig::default())
    }

    #[test]
    fn falls_back_to_default_center() {
        let camera = controller();
        assert_eq!(camera.owner(), CameraOwner::Uncontrolled);
        assert_eq!(camera.center(), crate::config::DEFAULT_CENTER);
        assert_eq!(camera.zoom(), 13.0);
    }

    #[test]
    fn self_location_takes_uncontrolled_camera() {
        let mut camera = controller();
        let at = LatLng::new(30.0, 40.0);
        assert_eq!(camera.self_located(at), Some(at));
        assert_eq!(camera.owner(), CameraOwner::SelfCentered(at));
        assert_eq!(camera.self_located(at), None);
    }

    #[test]
    fn explicit_center_is_terminal() {
        let mut camera = controller();
        let explicit = LatLng::new(10.0, 20.0);
        assert_eq!(camera.explicit_center(Some(explicit)), Some(explicit));
        assert_eq!(camera.self_located(LatLng::new(30.0, 40.0)), None);
        assert_eq!(camera.center(), explicit);

        // Dropping the prop keeps the last explicit center.
        assert_eq!(camera.explicit_center(None), None);
        assert_eq!(camera.owner(), CameraOwner::ExplicitlyCentered(explicit));
    }

    #[test]
    fn explicit_center_overrides_self_centered() {
        let mut camera = controller();
        camera.self_located(LatLng::new(30.0, 40.0));
        let explicit = LatLng::new(10.0, 20.0);
        assert_eq!(camera.explicit_center(Some(explicit)), Some(explicit));
        assert_eq!(camera.center(), explicit);
    }

    #[test]
    fn repeated_explicit_center_is_not_a_change() {
        let mut camera = controller();
        let explicit = LatLng::new(10.0, 20.0);
        camera.explicit_center(Some(explicit));
        assert_eq!(camera.explicit_center(Some(explicit)), None);
    }

    #[test]
    fn invalid_explicit_center_is_ignored() {
        let mut camera = controller();
        assert_eq!(camera.explicit_center(Some(LatLng::new(999.0, 0.0))), None);
        assert_eq!(camera.owner(), CameraOwner::Uncontrolled);
    }

    #[test]
    fn flight_is_bounded() {
        let config = MapConfig { flight_ms: 60_000, ..MapConfig::default() };
        assert_eq!(CameraController::new(&config).flight(), MAX_FLIGHT);
    }
}

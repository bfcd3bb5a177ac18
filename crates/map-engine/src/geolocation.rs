//! One-shot device location.

use shared::{LatLng, LocationFix};

use crate::config::LocateOptions;
use crate::error::LocationError;

pub type LocationResult = Result<LocationFix, LocationError>;

/// Called exactly once with the outcome of a request, possibly long after the
/// request was made.
pub type LocationCallback = Box<dyn FnOnce(LocationResult)>;

/// Something that can report the device position asynchronously.
pub trait PositionSource {
    fn request(&self, options: &LocateOptions, done: LocationCallback);
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    Idle,
    Pending,
    Located(LocationFix),
    Unavailable(LocationError),
}

#[derive(Debug)]
pub struct GeolocationTracker {
    state: LocationState,
}

impl Default for GeolocationTracker {
    fn default() -> Self {
        Self { state: LocationState::Idle }
    }
}

impl GeolocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the single request as in flight. `false` if one was already made.
    pub fn begin(&mut self) -> bool {
        if self.state != LocationState::Idle {
            return false;
        }
        self.state = LocationState::Pending;
        true
    }

    /// Record the outcome. Returns the new self location on success.
    pub fn resolve(&mut self, result: LocationResult) -> Option<LatLng> {
        if self.state != LocationState::Pending {
            tracing::debug!("ignoring location result with no request pending");
            return None;
        }
        match result {
            Ok(fix) if fix.position.is_valid() => {
                let position = fix.position;
                tracing::info!(
                    lat = position.lat,
                    lng = position.lng,
                    accuracy_m = ?fix.accuracy_m,
                    "self location resolved"
                );
                self.state = LocationState::Located(fix);
                Some(position)
            }
            Ok(fix) => {
                tracing::info!(lat = fix.position.lat, lng = fix.position.lng, "device reported an invalid position");
                self.state = LocationState::Unavailable(LocationError::PositionUnavailable);
                None
            }
            Err(err) => {
                tracing::info!(%err, "self location unavailable");
                self.state = LocationState::Unavailable(err);
                None
            }
        }
    }

    pub fn position(&self) -> Option<LatLng> {
        match &self.state {
            LocationState::Located(fix) => Some(fix.position),
            _ => None,
        }
    }

    pub fn state(&self) -> &LocationState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_request_per_tracker() {
        let mut tracker = GeolocationTracker::new();
        assert!(tracker.begin());
        assert!(!tracker.begin());
        assert_eq!(tracker.state(), &LocationState::Pending);
    }

    #[test]
    fn success_stores_position() {
        let mut tracker = GeolocationTracker::new();
        tracker.begin();
        let at = LatLng::new(30.0, 40.0);
        assert_eq!(tracker.resolve(Ok(LocationFix::now(at))), Some(at));
        assert_eq!(tracker.position(), Some(at));
    }

    #[test]
    fn denial_is_recorded_not_raised() {
        let mut tracker = GeolocationTracker::new();
        tracker.begin();
        assert_eq!(tracker.resolve(Err(LocationError::PermissionDenied)), None);
        assert_eq!(tracker.position(), None);
        assert_eq!(
            tracker.state(),
            &LocationState::Unavailable(LocationError::PermissionDenied)
        );
        assert!(!tracker.begin());
    }

    #[test]
    fn invalid_fix_counts_as_unavailable() {
        let mut tracker = GeolocationTracker::new();
        tracker.begin();
        assert_eq!(tracker.resolve(Ok(LocationFix::now(LatLng::new(f64::NAN, 1.0)))), None);
        assert!(matches!(tracker.state(), LocationState::Unavailable(_)));
    }

    #[test]
    fn unsolicited_result_is_ignored() {
        let mut tracker = GeolocationTracker::new();
        assert_eq!(tracker.resolve(Ok(LocationFix::now(LatLng::new(1.0, 1.0)))), None);
        assert_eq!(tracker.state(), &LocationState::Idle);
    }

    #[test]
    fn error_codes_map_to_variants() {
        assert_eq!(LocationError::from_code(1), LocationError::PermissionDenied);
        assert_eq!(LocationError::from_code(3), LocationError::Timeout);
        assert_eq!(LocationError::from_code(42), LocationError::Unsupported);
        assert_eq!(LocationError::Timeout.code(), 3);
    }
}

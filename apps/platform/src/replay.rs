//! Drive the headless engine from a JSON scenario.
//!
//! ```json
//! {
//!   "pins": [{ "lat": 12.97, "lng": 77.59, "label": "₹800", "isActive": true }],
//!   "location": { "fix": { "lat": 12.95, "lng": 77.6 } },
//!   "actions": [{ "action": "resolve_location" }, { "action": "locate" }]
//! }
//! ```
//!
//! A location request made at mount stays pending until a
//! `resolve_location` action, or until the scenario ends.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use map_engine::headless::HeadlessContainer;
use map_engine::{
    CameraOwner, LocateOptions, LocationCallback, LocationError, LocationResult, MapConfig,
    MapError, MapProps, MapResult, MapSession, PinHandler, PositionSource,
};
use serde::{Deserialize, Serialize};
use shared::{LatLng, LocationFix, Pin};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: MapConfig,
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    pub pins: Vec<Pin>,
    pub location: Option<LocationOutcome>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationOutcome {
    Fix {
        lat: f64,
        lng: f64,
        #[serde(default)]
        accuracy_m: Option<f64>,
    },
    /// W3C `GeolocationPositionError` code; anything unknown means unsupported.
    Error { code: u16 },
}

impl LocationOutcome {
    fn into_result(self) -> LocationResult {
        match self {
            Self::Fix { lat, lng, accuracy_m } => Ok(LocationFix {
                accuracy_m,
                ..LocationFix::now(LatLng::new(lat, lng))
            }),
            Self::Error { code } => Err(LocationError::from_code(code)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ZoomIn,
    ZoomOut,
    Locate,
    Reset,
    SetPins { pins: Vec<Pin> },
    SetCenter { center: Option<LatLng> },
    SetZoom { zoom: f64 },
    ResolveLocation,
    /// Click the n-th live marker, in render order.
    Click { marker: usize },
    Unmount,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub camera: CameraOwner,
    pub center: LatLng,
    pub self_location: Option<LatLng>,
    pub clicked: Vec<Pin>,
    /// Actions the engine declined, with the reason.
    pub ignored: Vec<String>,
    pub surface: serde_json::Value,
}

/// Holds the location callback until the scenario releases it.
#[derive(Default)]
struct ScriptedSource {
    pending: RefCell<Option<LocationCallback>>,
}

impl PositionSource for ScriptedSource {
    fn request(&self, _options: &LocateOptions, done: LocationCallback) {
        *self.pending.borrow_mut() = Some(done);
    }
}

impl ScriptedSource {
    fn release(&self, outcome: &Option<LocationOutcome>) -> bool {
        let Some(done) = self.pending.borrow_mut().take() else {
            return false;
        };
        match outcome {
            Some(outcome) => {
                done(outcome.clone().into_result());
                true
            }
            None => false,
        }
    }
}

pub fn run_json(raw: &str) -> anyhow::Result<ReplayReport> {
    let scenario: Scenario = serde_json::from_str(raw).context("parsing scenario")?;
    run(scenario)
}

pub fn run(scenario: Scenario) -> anyhow::Result<ReplayReport> {
    scenario.config.validate().context("scenario config")?;

    let clicked = Rc::new(RefCell::new(Vec::new()));
    let on_pin_click: PinHandler = {
        let clicked = Rc::clone(&clicked);
        Rc::new(move |pin: &Pin| clicked.borrow_mut().push(pin.clone()))
    };

    let container = HeadlessContainer::new();
    let session = MapSession::new(
        container.clone(),
        &scenario.config,
        MapProps {
            center: scenario.center,
            zoom: scenario.zoom,
            pins: scenario.pins,
            on_pin_click: Some(on_pin_click),
            show_controls: true,
        },
    );
    session.mount().context("mounting headless map")?;

    let source = ScriptedSource::default();
    if scenario.location.is_some() {
        session.request_location(&source, &scenario.config);
    }

    let mut ignored = Vec::new();
    for (step, action) in scenario.actions.into_iter().enumerate() {
        tracing::debug!(step, ?action, "replaying");
        let outcome: MapResult<()> = match action {
            Action::ZoomIn => session.with_mut(|map| map.zoom_in()),
            Action::ZoomOut => session.with_mut(|map| map.zoom_out()),
            Action::Locate => session.with_mut(|map| map.locate()).and_then(|moved| {
                if moved {
                    Ok(())
                } else {
                    Err(MapError::Backend("no self location to fly to".into()))
                }
            }),
            Action::Reset => session.with_mut(|map| map.reset_view()),
            Action::SetPins { pins } => session.with_mut(|map| map.set_pins(pins)).map(|_| ()),
            Action::SetCenter { center } => session.with_mut(|map| map.set_center(center)),
            Action::SetZoom { zoom } => session.with_mut(|map| map.set_zoom(zoom)),
            Action::ResolveLocation => {
                if !source.release(&scenario.location) {
                    ignored.push(format!("step {step}: no pending location request"));
                }
                Ok(())
            }
            Action::Click { marker } => {
                let ids = container.marker_ids();
                match ids.get(marker) {
                    Some(id) if container.click(*id) => Ok(()),
                    Some(_) => Err(MapError::Backend(format!("marker {marker} is not clickable"))),
                    None => Err(MapError::Backend(format!("no marker at index {marker}"))),
                }
            }
            Action::Unmount => {
                session.teardown();
                Ok(())
            }
        };
        if let Err(err) = outcome {
            tracing::info!(step, %err, "action ignored");
            ignored.push(format!("step {step}: {err}"));
        }
    }

    // A fix that arrives after the last action, possibly after unmount.
    source.release(&scenario.location);

    let surface = serde_json::to_value(&*container.log()).context("serializing surface log")?;
    Ok(session.with(|map| ReplayReport {
        camera: map.camera_owner(),
        center: map.center(),
        self_location: map.self_location(),
        clicked: clicked.borrow().clone(),
        ignored,
        surface,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_markers(report: &ReplayReport) -> usize {
        report.surface["markers"].as_object().map_or(0, |m| m.len())
    }

    #[test]
    fn demo_scenario_renders_job_and_worker() {
        let report = run(Scenario {
            pins: crate::demo::demo_pins(),
            ..Scenario::default()
        })
        .unwrap();

        assert_eq!(live_markers(&report), 2);
        assert_eq!(report.surface["created"], 1);
        assert_eq!(report.surface["base_layers"].as_array().unwrap().len(), 1);
        let badges: Vec<_> = report.surface["markers"]
            .as_object()
            .unwrap()
            .values()
            .map(|m| m["badge"].clone())
            .collect();
        assert_eq!(badges, vec![serde_json::json!("₹800"), serde_json::Value::Null]);
    }

    #[test]
    fn location_then_locate_flies_to_self() {
        let report = run_json(
            r#"{
                "pins": [{ "lat": 12.97, "lng": 77.59, "label": "₹800", "isActive": true }],
                "location": { "fix": { "lat": 12.95, "lng": 77.6 } },
                "actions": [{ "action": "resolve_location" }, { "action": "locate" }]
            }"#,
        )
        .unwrap();

        let me = LatLng::new(12.95, 77.6);
        assert_eq!(report.self_location, Some(me));
        assert_eq!(report.camera, CameraOwner::SelfCentered(me));
        assert_eq!(live_markers(&report), 2);
        assert!(report.ignored.is_empty());
        let flights = report.surface["flights"].as_array().unwrap();
        assert!(!flights.is_empty());
        assert_eq!(flights.last().unwrap()["to"]["zoom"], 15.0);
    }

    #[test]
    fn locate_without_fix_is_reported_as_ignored() {
        let report = run_json(r#"{ "actions": [{ "action": "locate" }] }"#).unwrap();
        assert_eq!(report.ignored.len(), 1);
        assert!(report.surface["flights"].as_array().unwrap().is_empty());
    }

    #[test]
    fn fix_after_unmount_touches_nothing() {
        let report = run_json(
            r#"{
                "pins": [{ "lat": 12.97, "lng": 77.59 }],
                "location": { "fix": { "lat": 12.95, "lng": 77.6 } },
                "actions": [{ "action": "unmount" }, { "action": "zoom_in" }]
            }"#,
        )
        .unwrap();

        assert_eq!(report.self_location, None);
        assert_eq!(report.surface["destroyed"], 1);
        assert_eq!(report.surface["mutations_after_destroy"], 0);
        assert_eq!(live_markers(&report), 0);
        assert_eq!(report.ignored.len(), 1);
    }

    #[test]
    fn clicks_reach_the_pin_handler() {
        let report = run(Scenario {
            pins: crate::demo::demo_pins(),
            actions: vec![Action::Click { marker: 1 }, Action::Click { marker: 7 }],
            ..Scenario::default()
        })
        .unwrap();

        assert_eq!(report.clicked, vec![crate::demo::demo_pins()[1].clone()]);
        assert_eq!(report.ignored.len(), 1);
    }

    #[test]
    fn explicit_center_beats_late_fix() {
        let report = run_json(
            r#"{
                "location": { "error": { "code": 1 } },
                "actions": [
                    { "action": "set_center", "center": { "lat": 28.61, "lng": 77.21 } },
                    { "action": "resolve_location" }
                ]
            }"#,
        )
        .unwrap();

        let delhi = LatLng::new(28.61, 77.21);
        assert_eq!(report.camera, CameraOwner::ExplicitlyCentered(delhi));
        assert_eq!(report.center, delhi);
        assert_eq!(report.self_location, None);
    }

    #[test]
    fn invalid_config_fails_the_run() {
        let err = run_json(r#"{ "config": { "default_zoom": 40 } }"#).unwrap_err();
        assert!(format!("{err:#}").contains("scenario config"));
    }
}

//! A recording backend with no rendering.
//!
//! Everything a real surface would draw is written to a shared
//! [`SurfaceLog`], which the [`HeadlessContainer`] keeps readable after the
//! surface is destroyed. Used by the test suite and by `map-replay`.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use shared::Camera;

use crate::config::BaseLayer;
use crate::error::{MapError, MapResult};
use crate::marker::MarkerSpec;
use crate::surface::{ClickHandler, Container, Surface, ZoomDirection};

const ZOOM_STEP: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flight {
    pub to: Camera,
    pub duration_ms: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct SurfaceLog {
    pub created: usize,
    pub destroyed: usize,
    pub base_layers: Vec<BaseLayer>,
    /// Live markers by id, in creation order.
    pub markers: BTreeMap<u64, MarkerSpec>,
    pub markers_added: usize,
    pub markers_removed: usize,
    pub camera: Option<Camera>,
    pub flights: Vec<Flight>,
    /// Calls that reached a surface after it was destroyed.
    pub mutations_after_destroy: usize,
    #[serde(skip)]
    next_marker: u64,
}

impl SurfaceLog {
    pub fn live_surfaces(&self) -> usize {
        self.created - self.destroyed
    }

    pub fn live_markers(&self) -> Vec<&MarkerSpec> {
        self.markers.values().collect()
    }
}

#[derive(Clone)]
pub struct HeadlessContainer {
    ready: Rc<Cell<bool>>,
    max_zoom: f64,
    log: Rc<RefCell<SurfaceLog>>,
    clicks: Rc<RefCell<BTreeMap<u64, Rc<dyn Fn()>>>>,
}

impl Default for HeadlessContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessContainer {
    pub fn new() -> Self {
        Self {
            ready: Rc::new(Cell::new(true)),
            max_zoom: 19.0,
            log: Rc::default(),
            clicks: Rc::default(),
        }
    }

    /// A container whose element has not mounted yet.
    pub fn detached() -> Self {
        let container = Self::new();
        container.ready.set(false);
        container
    }

    pub fn attach(&self) {
        self.ready.set(true);
    }

    pub fn log(&self) -> Ref<'_, SurfaceLog> {
        self.log.borrow()
    }

    /// Ids of the live markers, in creation order.
    pub fn marker_ids(&self) -> Vec<u64> {
        self.log.borrow().markers.keys().copied().collect()
    }

    /// Simulate a click. `false` if the marker is gone or has no handler.
    pub fn click(&self, marker: u64) -> bool {
        let handler = self.clicks.borrow().get(&marker).cloned();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl Container for HeadlessContainer {
    type Surface = HeadlessSurface;

    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn create_surface(&self, initial: Camera) -> MapResult<HeadlessSurface> {
        if !self.ready.get() {
            return Err(MapError::NotReady);
        }
        let mut log = self.log.borrow_mut();
        log.created += 1;
        log.camera = Some(initial);
        Ok(HeadlessSurface {
            log: Rc::clone(&self.log),
            clicks: Rc::clone(&self.clicks),
            zoom: initial.zoom,
            max_zoom: self.max_zoom,
            destroyed: false,
        })
    }
}

pub struct HeadlessSurface {
    log: Rc<RefCell<SurfaceLog>>,
    clicks: Rc<RefCell<BTreeMap<u64, Rc<dyn Fn()>>>>,
    zoom: f64,
    max_zoom: f64,
    destroyed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessMarker(pub u64);

impl HeadlessSurface {
    /// Record a call; `false` when the surface is already destroyed.
    fn touch(&self) -> bool {
        if self.destroyed {
            self.log.borrow_mut().mutations_after_destroy += 1;
            return false;
        }
        true
    }

    fn move_camera(&mut self, camera: Camera) {
        self.zoom = camera.zoom.clamp(0.0, self.max_zoom);
        self.log.borrow_mut().camera = Some(Camera::new(camera.center, self.zoom));
    }
}

impl Surface for HeadlessSurface {
    type Marker = HeadlessMarker;

    fn attach_base_layer(&mut self, layer: &BaseLayer) -> MapResult<()> {
        if !self.touch() {
            return Err(MapError::TornDown);
        }
        self.max_zoom = layer.max_zoom;
        self.log.borrow_mut().base_layers.push(layer.clone());
        Ok(())
    }

    fn add_marker(
        &mut self,
        spec: &MarkerSpec,
        on_click: Option<ClickHandler>,
    ) -> MapResult<HeadlessMarker> {
        if !self.touch() {
            return Err(MapError::TornDown);
        }
        let mut log = self.log.borrow_mut();
        let id = log.next_marker;
        log.next_marker += 1;
        log.markers_added += 1;
        log.markers.insert(id, spec.clone());
        if let Some(handler) = on_click {
            self.clicks.borrow_mut().insert(id, Rc::from(handler));
        }
        Ok(HeadlessMarker(id))
    }

    fn remove_marker(&mut self, marker: HeadlessMarker) {
        if !self.touch() {
            return;
        }
        let mut log = self.log.borrow_mut();
        if log.markers.remove(&marker.0).is_some() {
            log.markers_removed += 1;
        }
        self.clicks.borrow_mut().remove(&marker.0);
    }

    fn set_view(&mut self, camera: Camera, _animate: bool) {
        if self.touch() {
            self.move_camera(camera);
        }
    }

    fn fly_to(&mut self, camera: Camera, duration: Duration) {
        if !self.touch() {
            return;
        }
        // Flights land immediately, so a newer one always wins.
        self.move_camera(camera);
        self.log.borrow_mut().flights.push(Flight {
            to: camera,
            duration_ms: duration.as_millis() as u64,
        });
    }

    fn step_zoom(&mut self, direction: ZoomDirection) {
        if !self.touch() {
            return;
        }
        let zoom = match direction {
            ZoomDirection::In => self.zoom + ZOOM_STEP,
            ZoomDirection::Out => self.zoom - ZOOM_STEP,
        };
        let center = self.log.borrow().camera.map(|c| c.center);
        if let Some(center) = center {
            self.move_camera(Camera::new(center, zoom));
        } else {
            self.zoom = zoom.clamp(0.0, self.max_zoom);
        }
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn destroy(&mut self) {
        if !self.touch() {
            return;
        }
        self.destroyed = true;
        self.clicks.borrow_mut().clear();
        self.log.borrow_mut().destroyed += 1;
    }
}

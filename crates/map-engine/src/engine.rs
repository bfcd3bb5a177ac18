//! The map component's state, independent of any UI framework.
//!
//! [`JobMap`] wires the surface manager, marker reconciler, geolocation
//! tracker and camera controller together. A front end forwards its inputs
//! (`center`, `zoom`, `pins`, click handler) and lifecycle events to it.

use std::fmt;

use shared::{LatLng, Pin};

use crate::camera::{CameraController, CameraOwner};
use crate::config::{BaseLayer, MapConfig};
use crate::error::{MapError, MapResult};
use crate::geolocation::{GeolocationTracker, LocationResult};
use crate::reconciler::{MarkerReconciler, PinHandler, RenderReport};
use crate::surface::{Container, InitOutcome, Surface, SurfaceManager, ZoomDirection};

type MarkerOf<C> = <<C as Container>::Surface as Surface>::Marker;

/// Caller inputs. Mirrors the component props.
#[derive(Clone)]
pub struct MapProps {
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    pub pins: Vec<Pin>,
    pub on_pin_click: Option<PinHandler>,
    pub show_controls: bool,
}

impl Default for MapProps {
    fn default() -> Self {
        Self {
            center: None,
            zoom: None,
            pins: Vec::new(),
            on_pin_click: None,
            show_controls: true,
        }
    }
}

impl fmt::Debug for MapProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapProps")
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("pins", &self.pins.len())
            .field("on_pin_click", &self.on_pin_click.is_some())
            .field("show_controls", &self.show_controls)
            .finish()
    }
}

pub struct JobMap<C: Container> {
    surface: SurfaceManager<C>,
    markers: MarkerReconciler<MarkerOf<C>>,
    location: GeolocationTracker,
    camera: CameraController,
    base_layer: BaseLayer,
    pins: Vec<Pin>,
    on_pin_click: Option<PinHandler>,
    show_controls: bool,
}

impl<C: Container> JobMap<C> {
    pub fn new(container: C, config: &MapConfig) -> Self {
        Self {
            surface: SurfaceManager::new(container),
            markers: MarkerReconciler::new(),
            location: GeolocationTracker::new(),
            camera: CameraController::new(config),
            base_layer: config.base_layer(),
            pins: Vec::new(),
            on_pin_click: None,
            show_controls: true,
        }
    }

    /// Build an engine and apply the initial props before the first mount.
    pub fn with_props(container: C, config: &MapConfig, props: MapProps) -> Self {
        let mut map = Self::new(container, config);
        map.camera.explicit_center(props.center);
        if let Some(zoom) = props.zoom {
            map.camera.set_zoom(zoom);
        }
        map.pins = props.pins;
        map.on_pin_click = props.on_pin_click;
        map.show_controls = props.show_controls;
        map
    }

    /// Create the surface if the container is ready, then draw the current
    /// pins on it. Repeated calls are harmless.
    pub fn mount(&mut self) -> MapResult<InitOutcome> {
        let outcome = self.surface.initialize(self.camera.home(), &self.base_layer)?;
        if outcome == InitOutcome::Created {
            self.reconcile();
        }
        Ok(outcome)
    }

    /// Apply a full set of props, as a front end does on every render pass.
    pub fn update(&mut self, props: MapProps) -> MapResult<RenderReport> {
        self.set_center(props.center)?;
        if let Some(zoom) = props.zoom {
            self.set_zoom(zoom)?;
        }
        self.on_pin_click = props.on_pin_click;
        self.show_controls = props.show_controls;
        self.set_pins(props.pins)
    }

    pub fn set_center(&mut self, center: Option<LatLng>) -> MapResult<()> {
        if self.camera.explicit_center(center).is_some() {
            self.sync_view()?;
        }
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) -> MapResult<()> {
        if self.camera.set_zoom(zoom) {
            self.sync_view()?;
        }
        Ok(())
    }

    /// Replace the pin list and redraw every marker.
    pub fn set_pins(&mut self, pins: Vec<Pin>) -> MapResult<RenderReport> {
        self.pins = pins;
        self.redraw()
    }

    /// Claim the single geolocation request for this mount.
    pub fn begin_location_request(&mut self) -> bool {
        if self.surface.is_torn_down() {
            return false;
        }
        self.location.begin()
    }

    /// Deliver the geolocation outcome.
    pub fn on_location(&mut self, result: LocationResult) {
        if self.surface.is_torn_down() {
            tracing::debug!("location resolved after teardown, dropping it");
            return;
        }
        let Some(position) = self.location.resolve(result) else {
            return;
        };
        if self.camera.self_located(position).is_some() {
            if let Err(err) = self.sync_view() {
                tracing::debug!(%err, "implicit recenter deferred");
            }
        }
        if let Err(err) = self.redraw() {
            tracing::debug!(%err, "self marker deferred");
        }
    }

    pub fn zoom_in(&mut self) -> MapResult<()> {
        self.zoom(ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> MapResult<()> {
        self.zoom(ZoomDirection::Out)
    }

    pub fn zoom(&mut self, direction: ZoomDirection) -> MapResult<()> {
        let surface = Self::live(&mut self.surface)?;
        self.camera.step_zoom(surface, direction);
        Ok(())
    }

    /// Fly to the user's position. `Ok(false)` when it is not known.
    pub fn locate(&mut self) -> MapResult<bool> {
        let self_location = self.location.position();
        let surface = Self::live(&mut self.surface)?;
        Ok(self.camera.locate(surface, self_location))
    }

    pub fn reset_view(&mut self) -> MapResult<()> {
        let surface = Self::live(&mut self.surface)?;
        self.camera.reset(surface);
        Ok(())
    }

    /// Remove every marker, then destroy the surface.
    pub fn teardown(&mut self) {
        match self.surface.surface_mut() {
            Some(surface) => self.markers.clear(surface),
            None => self.markers.forget(),
        }
        if self.surface.teardown() {
            tracing::info!("job map unmounted");
        }
    }

    pub fn is_live(&self) -> bool {
        self.surface.is_live()
    }

    pub fn is_torn_down(&self) -> bool {
        self.surface.is_torn_down()
    }

    /// Whether the zoom/locate/reset controls should be shown.
    pub fn show_controls(&self) -> bool {
        self.show_controls
    }

    pub fn camera_owner(&self) -> CameraOwner {
        self.camera.owner()
    }

    pub fn center(&self) -> LatLng {
        self.camera.center()
    }

    pub fn self_location(&self) -> Option<LatLng> {
        self.location.position()
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn markers(&self) -> &MarkerReconciler<MarkerOf<C>> {
        &self.markers
    }

    pub fn surface(&self) -> Option<&C::Surface> {
        self.surface.surface()
    }

    pub fn container(&self) -> &C {
        self.surface.container()
    }

    fn sync_view(&mut self) -> MapResult<()> {
        match Self::live(&mut self.surface) {
            Ok(surface) => {
                self.camera.sync_view(surface);
                Ok(())
            }
            // Not mounted yet: the surface is created at the current home.
            Err(MapError::NotReady) => self.mount().map(|_| ()),
            Err(err) => Err(err),
        }
    }

    /// Mount if needed, then reconcile markers.
    fn redraw(&mut self) -> MapResult<RenderReport> {
        match self.surface.initialize(self.camera.home(), &self.base_layer)? {
            InitOutcome::Created | InitOutcome::AlreadyLive => Ok(self.reconcile()),
            InitOutcome::ContainerPending => Err(MapError::NotReady),
            InitOutcome::TornDown => Err(MapError::TornDown),
        }
    }

    fn reconcile(&mut self) -> RenderReport {
        let self_location = self.location.position();
        match self.surface.surface_mut() {
            Some(surface) => self.markers.render(
                surface,
                &self.pins,
                self_location,
                self.on_pin_click.as_ref(),
            ),
            None => RenderReport::default(),
        }
    }

    fn live(surface: &mut SurfaceManager<C>) -> MapResult<&mut C::Surface> {
        if surface.is_torn_down() {
            return Err(MapError::TornDown);
        }
        surface.surface_mut().ok_or(MapError::NotReady)
    }
}

impl<C: Container> Drop for JobMap<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

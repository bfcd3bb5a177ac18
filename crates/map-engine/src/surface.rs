//! Map surface ownership.
//!
//! A [`Container`] is the place a surface can be created in (a DOM element in
//! the browser). The [`SurfaceManager`] creates at most one [`Surface`] from it
//! and holds it in a [`SurfaceGuard`], whose `Drop` is the only place the
//! surface is destroyed.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use shared::Camera;

use crate::config::BaseLayer;
use crate::error::MapResult;
use crate::marker::MarkerSpec;

/// Invoked when a rendered marker is clicked.
pub type ClickHandler = Box<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// A live map-engine instance.
pub trait Surface {
    type Marker;

    fn attach_base_layer(&mut self, layer: &BaseLayer) -> MapResult<()>;

    fn add_marker(
        &mut self,
        spec: &MarkerSpec,
        on_click: Option<ClickHandler>,
    ) -> MapResult<Self::Marker>;

    fn remove_marker(&mut self, marker: Self::Marker);

    fn set_view(&mut self, camera: Camera, animate: bool);

    /// Animated move. A new call supersedes any flight still in progress.
    fn fly_to(&mut self, camera: Camera, duration: Duration);

    /// Zoom by the backend's default step.
    fn step_zoom(&mut self, direction: ZoomDirection);

    fn zoom(&self) -> f64;

    fn destroy(&mut self);
}

pub trait Container {
    type Surface: Surface;

    fn is_ready(&self) -> bool;

    fn create_surface(&self, initial: Camera) -> MapResult<Self::Surface>;
}

/// Destroys the wrapped surface when dropped.
pub struct SurfaceGuard<S: Surface> {
    surface: S,
}

impl<S: Surface> SurfaceGuard<S> {
    fn new(surface: S) -> Self {
        Self { surface }
    }
}

impl<S: Surface> Deref for SurfaceGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> DerefMut for SurfaceGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface> Drop for SurfaceGuard<S> {
    fn drop(&mut self) {
        self.surface.destroy();
        tracing::info!("map surface destroyed");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyLive,
    ContainerPending,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unmounted,
    Live,
    TornDown,
}

pub struct SurfaceManager<C: Container> {
    container: C,
    live: Option<SurfaceGuard<C::Surface>>,
    phase: Phase,
}

impl<C: Container> SurfaceManager<C> {
    pub fn new(container: C) -> Self {
        Self {
            container,
            live: None,
            phase: Phase::Unmounted,
        }
    }

    /// Create the surface if none exists yet. Safe to call on every update.
    pub fn initialize(&mut self, initial: Camera, base: &BaseLayer) -> MapResult<InitOutcome> {
        match self.phase {
            Phase::Live => return Ok(InitOutcome::AlreadyLive),
            Phase::TornDown => return Ok(InitOutcome::TornDown),
            Phase::Unmounted => {}
        }
        if !self.container.is_ready() {
            tracing::debug!("map container not ready, deferring surface creation");
            return Ok(InitOutcome::ContainerPending);
        }

        // The guard owns the surface from here on, so a failing base layer
        // still releases it.
        let mut guard = SurfaceGuard::new(self.container.create_surface(initial)?);
        guard.attach_base_layer(base)?;

        tracing::info!(
            lat = initial.center.lat,
            lng = initial.center.lng,
            zoom = initial.zoom,
            "map surface created"
        );
        self.live = Some(guard);
        self.phase = Phase::Live;
        Ok(InitOutcome::Created)
    }

    /// Release the surface. Returns `true` only on the call that destroyed it.
    pub fn teardown(&mut self) -> bool {
        let was_live = self.live.take().is_some();
        self.phase = Phase::TornDown;
        was_live
    }

    pub fn surface(&self) -> Option<&C::Surface> {
        self.live.as_deref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut C::Surface> {
        self.live.as_deref_mut()
    }

    pub fn is_live(&self) -> bool {
        self.phase == Phase::Live
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase == Phase::TornDown
    }

    pub fn container(&self) -> &C {
        &self.container
    }
}

//! Replace-all marker reconciliation.
//!
//! Pins have no stable key, so there is nothing to diff against: every render
//! removes the whole previous set and draws the new one in input order.

use std::rc::Rc;

use shared::{LatLng, Pin};

use crate::marker::MarkerSpec;
use crate::surface::{ClickHandler, Surface};

/// Caller callback for pin clicks.
pub type PinHandler = Rc<dyn Fn(&Pin)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerOrigin {
    /// Index into the pin list the marker was rendered from.
    Pin(usize),
    SelfLocation,
}

pub struct RenderedMarker<M> {
    pub handle: M,
    pub origin: MarkerOrigin,
    pub position: LatLng,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: usize,
    pub skipped: usize,
}

pub struct MarkerReconciler<M> {
    rendered: Vec<RenderedMarker<M>>,
}

impl<M> Default for MarkerReconciler<M> {
    fn default() -> Self {
        Self { rendered: Vec::new() }
    }
}

impl<M> MarkerReconciler<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<S>(
        &mut self,
        surface: &mut S,
        pins: &[Pin],
        self_location: Option<LatLng>,
        on_pin_click: Option<&PinHandler>,
    ) -> RenderReport
    where
        S: Surface<Marker = M>,
    {
        self.clear(surface);

        let mut report = RenderReport::default();
        for (index, pin) in pins.iter().enumerate() {
            let spec = match MarkerSpec::for_pin(pin) {
                Ok(spec) => spec,
                Err(err) => {
                    tracing::warn!(index, %err, "skipping pin");
                    report.skipped += 1;
                    continue;
                }
            };
            let on_click = on_pin_click.map(|handler| {
                let handler = Rc::clone(handler);
                let pin = pin.clone();
                Box::new(move || handler(&pin)) as ClickHandler
            });
            if self.place(surface, &spec, on_click, MarkerOrigin::Pin(index)) {
                report.rendered += 1;
            } else {
                report.skipped += 1;
            }
        }

        if let Some(position) = self_location {
            match MarkerSpec::for_self(position) {
                Ok(spec) => {
                    if self.place(surface, &spec, None, MarkerOrigin::SelfLocation) {
                        report.rendered += 1;
                    }
                }
                Err(err) => tracing::warn!(%err, "skipping self marker"),
            }
        }

        tracing::debug!(rendered = report.rendered, skipped = report.skipped, "markers reconciled");
        report
    }

    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: Surface<Marker = M>,
    {
        for marker in self.rendered.drain(..) {
            surface.remove_marker(marker.handle);
        }
    }

    /// Forget every handle without touching a surface. Used once the surface
    /// that owned them is gone.
    pub fn forget(&mut self) {
        self.rendered.clear();
    }

    pub fn markers(&self) -> &[RenderedMarker<M>] {
        &self.rendered
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    fn place<S>(
        &mut self,
        surface: &mut S,
        spec: &MarkerSpec,
        on_click: Option<ClickHandler>,
        origin: MarkerOrigin,
    ) -> bool
    where
        S: Surface<Marker = M>,
    {
        match surface.add_marker(spec, on_click) {
            Ok(handle) => {
                self.rendered.push(RenderedMarker { handle, origin, position: spec.position });
                true
            }
            Err(err) => {
                tracing::warn!(?origin, %err, "backend rejected marker");
                false
            }
        }
    }
}

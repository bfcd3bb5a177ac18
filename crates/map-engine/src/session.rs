//! Shared handle to a mounted [`JobMap`].
//!
//! UI callbacks and the geolocation callback all reach the engine through a
//! `MapSession`. Async callbacks only hold a `Weak`, so once the component is
//! gone they find nothing to mutate.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::MapConfig;
use crate::engine::{JobMap, MapProps};
use crate::error::MapResult;
use crate::geolocation::{LocationResult, PositionSource};
use crate::surface::{Container, InitOutcome};

pub struct MapSession<C: Container> {
    inner: Rc<RefCell<JobMap<C>>>,
}

impl<C: Container> Clone for MapSession<C> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<C: Container + 'static> MapSession<C> {
    pub fn new(container: C, config: &MapConfig, props: MapProps) -> Self {
        Self {
            inner: Rc::new(RefCell::new(JobMap::with_props(container, config, props))),
        }
    }

    pub fn mount(&self) -> MapResult<InitOutcome> {
        self.inner.borrow_mut().mount()
    }

    /// Ask `source` for the device position, once per session. The result is
    /// applied only if the session is still alive when it arrives.
    pub fn request_location<P: PositionSource + ?Sized>(&self, source: &P, config: &MapConfig) -> bool {
        if !self.inner.borrow_mut().begin_location_request() {
            return false;
        }
        let weak = Rc::downgrade(&self.inner);
        source.request(
            &config.locate_options(),
            Box::new(move |result| deliver_location(&weak, result)),
        );
        true
    }

    pub fn with<R>(&self, f: impl FnOnce(&JobMap<C>) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut JobMap<C>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn teardown(&self) {
        self.inner.borrow_mut().teardown();
    }
}

fn deliver_location<C: Container>(engine: &Weak<RefCell<JobMap<C>>>, result: LocationResult) {
    let Some(engine) = engine.upgrade() else {
        tracing::debug!("location resolved after unmount, dropping it");
        return;
    };
    let Ok(mut engine) = engine.try_borrow_mut() else {
        tracing::warn!("map busy when location resolved, dropping it");
        return;
    };
    engine.on_location(result);
}

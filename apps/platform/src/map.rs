//! Leaflet backend for the map engine.
//!
//! Leaflet itself is loaded by the page (`window.L`); this module only talks
//! to it through the small JS shim below.

use std::time::Duration;

use map_engine::{
    BaseLayer, ClickHandler, Container, MapError, MapResult, MarkerSpec, Surface, ZoomDirection,
};
use serde::Serialize;
use shared::Camera;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::markup;

mod ffi {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(inline_js = r#"
export function leafletReady() {
  return typeof window !== 'undefined' && !!window.L;
}

export function createMap(targetId, lat, lng, zoom) {
  if (!window.L) {
    console.warn('Leaflet not loaded. Add it via CDN before the app bundle.');
    return null;
  }
  return window.L.map(targetId, {
    zoomControl: false,
    attributionControl: true,
    preferCanvas: true,
    zoomAnimation: true,
    markerZoomAnimation: true,
    fadeAnimation: true,
    inertia: true,
    inertiaDeceleration: 3200,
    inertiaMaxSpeed: 1400,
    worldCopyJump: false,
  }).setView([lat, lng], zoom);
}

export function addTileLayer(map, url, maxZoom, attribution, filter) {
  const layer = window.L.tileLayer(url, { maxZoom, attribution, className: 'map-tiles' });
  layer.addTo(map);
  if (filter) {
    const pane = map.getPane('tilePane');
    if (pane) pane.style.filter = filter;
  }
  return true;
}

export function addMarker(map, options, onClick) {
  const o = JSON.parse(options);
  const icon = window.L.divIcon({
    className: o.className,
    html: o.html,
    iconSize: [o.width, o.height],
    iconAnchor: [o.anchorX, o.anchorY],
  });
  const marker = window.L.marker([o.lat, o.lng], { icon }).addTo(map);
  if (o.tooltip) {
    marker.bindTooltip(o.tooltip, { direction: 'top', offset: [0, o.tooltipOffsetY] });
  }
  marker.bindPopup(o.popup);
  if (onClick) marker.on('click', () => onClick());
  return marker;
}

export function removeLayer(layer) {
  layer.remove();
}

export function setView(map, lat, lng, zoom, animate) {
  map.setView([lat, lng], zoom, { animate });
}

export function flyTo(map, lat, lng, zoom, seconds) {
  map.flyTo([lat, lng], zoom, { duration: seconds });
}

export function zoomIn(map) { map.zoomIn(); }
export function zoomOut(map) { map.zoomOut(); }
export function getZoom(map) { return map.getZoom(); }

export function removeMap(map) {
  map.off();
  map.remove();
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = leafletReady)]
        pub fn leaflet_ready() -> bool;
        #[wasm_bindgen(js_name = createMap)]
        pub fn create_map(target_id: &str, lat: f64, lng: f64, zoom: f64) -> JsValue;
        #[wasm_bindgen(js_name = addTileLayer)]
        pub fn add_tile_layer(map: &JsValue, url: &str, max_zoom: f64, attribution: &str, filter: &str) -> bool;
        #[wasm_bindgen(js_name = addMarker)]
        pub fn add_marker(map: &JsValue, options: &str, on_click: &JsValue) -> JsValue;
        #[wasm_bindgen(js_name = removeLayer)]
        pub fn remove_layer(layer: &JsValue);
        #[wasm_bindgen(js_name = setView)]
        pub fn set_view(map: &JsValue, lat: f64, lng: f64, zoom: f64, animate: bool);
        #[wasm_bindgen(js_name = flyTo)]
        pub fn fly_to(map: &JsValue, lat: f64, lng: f64, zoom: f64, seconds: f64);
        #[wasm_bindgen(js_name = zoomIn)]
        pub fn zoom_in(map: &JsValue);
        #[wasm_bindgen(js_name = zoomOut)]
        pub fn zoom_out(map: &JsValue);
        #[wasm_bindgen(js_name = getZoom)]
        pub fn get_zoom(map: &JsValue) -> f64;
        #[wasm_bindgen(js_name = removeMap)]
        pub fn remove_map(map: &JsValue);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerOptions<'a> {
    lat: f64,
    lng: f64,
    class_name: &'static str,
    html: String,
    width: u32,
    height: u32,
    anchor_x: u32,
    anchor_y: u32,
    tooltip: Option<&'a str>,
    tooltip_offset_y: i32,
    popup: String,
}

impl<'a> MarkerOptions<'a> {
    fn from_spec(spec: &'a MarkerSpec) -> Self {
        Self {
            lat: spec.position.lat,
            lng: spec.position.lng,
            class_name: markup::class_name(spec.kind),
            html: markup::icon_html(spec),
            width: spec.icon.width,
            height: spec.icon.height,
            anchor_x: spec.icon.anchor_x,
            anchor_y: spec.icon.anchor_y,
            tooltip: spec.tooltip.as_ref().map(|t| t.text),
            tooltip_offset_y: spec.tooltip.as_ref().map_or(0, |t| t.offset_y),
            popup: markup::popup_html(spec),
        }
    }
}

/// The `<div>` a map is created in, looked up by id.
#[derive(Debug, Clone)]
pub struct LeafletContainer {
    element_id: String,
}

impl LeafletContainer {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self { element_id: element_id.into() }
    }
}

impl Container for LeafletContainer {
    type Surface = LeafletSurface;

    fn is_ready(&self) -> bool {
        let mounted = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&self.element_id))
            .is_some();
        mounted && ffi::leaflet_ready()
    }

    fn create_surface(&self, initial: Camera) -> MapResult<LeafletSurface> {
        if !self.is_ready() {
            return Err(MapError::NotReady);
        }
        let map = ffi::create_map(
            &self.element_id,
            initial.center.lat,
            initial.center.lng,
            initial.zoom,
        );
        if map.is_null() || map.is_undefined() {
            return Err(MapError::Backend("leaflet refused to create a map".into()));
        }
        tracing::info!(element = %self.element_id, "leaflet map created");
        Ok(LeafletSurface { map })
    }
}

pub struct LeafletSurface {
    map: JsValue,
}

pub struct LeafletMarker {
    layer: JsValue,
    // Keeps the JS click listener callable until the marker is removed.
    _on_click: Option<Closure<dyn Fn()>>,
}

impl Surface for LeafletSurface {
    type Marker = LeafletMarker;

    fn attach_base_layer(&mut self, layer: &BaseLayer) -> MapResult<()> {
        let attached = ffi::add_tile_layer(
            &self.map,
            &layer.url_template,
            layer.max_zoom,
            &layer.attribution,
            layer.filter.as_deref().unwrap_or(""),
        );
        if attached {
            Ok(())
        } else {
            Err(MapError::Backend("tile layer rejected".into()))
        }
    }

    fn add_marker(
        &mut self,
        spec: &MarkerSpec,
        on_click: Option<ClickHandler>,
    ) -> MapResult<LeafletMarker> {
        let options = serde_json::to_string(&MarkerOptions::from_spec(spec))?;
        let on_click = on_click.map(|handler| Closure::<dyn Fn()>::new(move || handler()));
        let js_click: &JsValue = match &on_click {
            Some(closure) => closure.as_ref(),
            None => &JsValue::NULL,
        };
        let layer = ffi::add_marker(&self.map, &options, js_click);
        if layer.is_null() || layer.is_undefined() {
            return Err(MapError::Backend("marker rejected".into()));
        }
        Ok(LeafletMarker { layer, _on_click: on_click })
    }

    fn remove_marker(&mut self, marker: LeafletMarker) {
        ffi::remove_layer(&marker.layer);
    }

    fn set_view(&mut self, camera: Camera, animate: bool) {
        ffi::set_view(&self.map, camera.center.lat, camera.center.lng, camera.zoom, animate);
    }

    fn fly_to(&mut self, camera: Camera, duration: Duration) {
        ffi::fly_to(
            &self.map,
            camera.center.lat,
            camera.center.lng,
            camera.zoom,
            duration.as_secs_f64(),
        );
    }

    fn step_zoom(&mut self, direction: ZoomDirection) {
        match direction {
            ZoomDirection::In => ffi::zoom_in(&self.map),
            ZoomDirection::Out => ffi::zoom_out(&self.map),
        }
    }

    fn zoom(&self) -> f64 {
        ffi::get_zoom(&self.map)
    }

    fn destroy(&mut self) {
        ffi::remove_map(&self.map);
    }
}

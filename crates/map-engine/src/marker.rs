//! Per-pin visual policy.
//!
//! A [`MarkerSpec`] is everything a backend needs to draw one marker. It is
//! derived from a [`Pin`] (or the self location) and never mutated afterwards;
//! a changed pin gets a new spec and a new marker.

use serde::Serialize;
use shared::{LatLng, Pin, PinVariant};

use crate::error::{MapError, MapResult};

pub const WORKER_GLYPH: &str = "•";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Job,
    Worker,
    SelfLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSize {
    Regular,
    Primary,
}

/// Icon box and anchor, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IconBox {
    pub width: u32,
    pub height: u32,
    pub anchor_x: u32,
    pub anchor_y: u32,
}

impl IconBox {
    const PIN: IconBox = IconBox { width: 48, height: 44, anchor_x: 24, anchor_y: 24 };
    const BADGED_PIN: IconBox = IconBox { width: 48, height: 64, anchor_x: 24, anchor_y: 50 };
    const SELF: IconBox = IconBox { width: 40, height: 40, anchor_x: 20, anchor_y: 20 };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub text: &'static str,
    /// Vertical offset above the anchor.
    pub offset_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: &'static str,
    pub body: Option<&'static str>,
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub kind: MarkerKind,
    pub size: MarkerSize,
    pub glyph: String,
    pub badge: Option<String>,
    pub icon: IconBox,
    pub tooltip: Option<Tooltip>,
    pub popup: Popup,
}

impl MarkerSpec {
    pub fn for_pin(pin: &Pin) -> MapResult<Self> {
        let position = pin.position();
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinate { lat: pin.lat, lng: pin.lng });
        }

        let price = (!pin.label.trim().is_empty()).then(|| pin.label.clone());
        let size = if pin.is_active { MarkerSize::Primary } else { MarkerSize::Regular };

        let spec = match pin.variant {
            PinVariant::Worker => MarkerSpec {
                position,
                kind: MarkerKind::Worker,
                size,
                glyph: WORKER_GLYPH.to_string(),
                badge: None,
                icon: IconBox::PIN,
                tooltip: Some(Tooltip { text: "Worker Current Location", offset_y: -20 }),
                popup: Popup {
                    title: "Worker Location",
                    body: Some("Current position"),
                    price: None,
                },
            },
            PinVariant::Job => {
                let badge = if pin.is_active { price.clone() } else { None };
                MarkerSpec {
                    position,
                    kind: MarkerKind::Job,
                    size,
                    glyph: pin.icon.clone(),
                    icon: if badge.is_some() { IconBox::BADGED_PIN } else { IconBox::PIN },
                    badge,
                    tooltip: Some(Tooltip { text: "Job Posted Location", offset_y: -20 }),
                    popup: Popup {
                        title: "Job Site",
                        body: Some("Posted at this location"),
                        price,
                    },
                }
            }
        };
        Ok(spec)
    }

    pub fn for_self(position: LatLng) -> MapResult<Self> {
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinate { lat: position.lat, lng: position.lng });
        }
        Ok(MarkerSpec {
            position,
            kind: MarkerKind::SelfLocation,
            size: MarkerSize::Regular,
            glyph: String::new(),
            badge: None,
            icon: IconBox::SELF,
            tooltip: None,
            popup: Popup { title: "You are here", body: None, price: None },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_job_gets_badge_and_tall_icon() {
        let spec = MarkerSpec::for_pin(&Pin::job(12.97, 77.59, "₹800", "🔧").active()).unwrap();
        assert_eq!(spec.kind, MarkerKind::Job);
        assert_eq!(spec.size, MarkerSize::Primary);
        assert_eq!(spec.badge.as_deref(), Some("₹800"));
        assert_eq!(spec.icon.height, 64);
        assert_eq!(spec.icon.anchor_y, 50);
        assert_eq!(spec.popup.price.as_deref(), Some("₹800"));
    }

    #[test]
    fn inactive_job_keeps_price_in_popup_only() {
        let spec = MarkerSpec::for_pin(&Pin::job(12.97, 77.59, "₹500", "🧹")).unwrap();
        assert_eq!(spec.size, MarkerSize::Regular);
        assert!(spec.badge.is_none());
        assert_eq!(spec.icon.height, 44);
        assert_eq!(spec.popup.price.as_deref(), Some("₹500"));
    }

    #[test]
    fn worker_never_shows_badge() {
        let mut pin = Pin::worker(12.96, 77.58).active();
        pin.label = "₹800".into();
        let spec = MarkerSpec::for_pin(&pin).unwrap();
        assert_eq!(spec.kind, MarkerKind::Worker);
        assert_eq!(spec.size, MarkerSize::Primary);
        assert!(spec.badge.is_none());
        assert_eq!(spec.glyph, WORKER_GLYPH);
        assert_eq!(spec.tooltip.unwrap().text, "Worker Current Location");
        assert!(spec.popup.price.is_none());
    }

    #[test]
    fn blank_label_is_not_a_badge() {
        let spec = MarkerSpec::for_pin(&Pin::job(1.0, 1.0, "  ", "x").active()).unwrap();
        assert!(spec.badge.is_none());
        assert!(spec.popup.price.is_none());
    }

    #[test]
    fn out_of_range_pin_is_rejected() {
        let err = MarkerSpec::for_pin(&Pin::job(999.0, 0.0, "", "")).unwrap_err();
        assert!(matches!(err, MapError::InvalidCoordinate { .. }));
        assert!(MarkerSpec::for_pin(&Pin::job(f64::NAN, 0.0, "", "")).is_err());
    }

    #[test]
    fn self_marker_has_popup_but_no_tooltip() {
        let spec = MarkerSpec::for_self(LatLng::new(30.0, 40.0)).unwrap();
        assert_eq!(spec.kind, MarkerKind::SelfLocation);
        assert!(spec.tooltip.is_none());
        assert_eq!(spec.popup.title, "You are here");
        assert_eq!(spec.icon.width, 40);
    }
}

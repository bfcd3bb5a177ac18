//! Page-supplied map settings.
//!
//! The host page may embed
//! `<script type="application/json" id="job-map-config">{...}</script>`;
//! missing keys take their defaults.

use map_engine::{MapConfig, MapResult};

pub const CONFIG_ELEMENT_ID: &str = "job-map-config";

/// `None` or blank text means "use the defaults".
pub fn parse(raw: Option<&str>) -> MapResult<MapConfig> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => MapConfig::from_json(raw),
        None => Ok(MapConfig::default()),
    }
}

#[cfg(feature = "hydrate")]
pub fn from_page() -> MapResult<MapConfig> {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    parse(raw.as_deref())
}

#[cfg(test)]
mod tests {
    use map_engine::MapError;

    use super::*;

    #[test]
    fn missing_or_blank_uses_defaults() {
        assert_eq!(parse(None).unwrap(), MapConfig::default());
        assert_eq!(parse(Some("  \n")).unwrap(), MapConfig::default());
    }

    #[test]
    fn page_values_override_defaults() {
        let config = parse(Some(r#"{ "default_zoom": 11, "tile_filter": "" }"#)).unwrap();
        assert_eq!(config.default_zoom, 11.0);
        assert!(config.base_layer().filter.is_none());
        assert_eq!(config.locate_min_zoom, MapConfig::default().locate_min_zoom);
    }

    #[test]
    fn broken_json_is_reported() {
        assert!(matches!(parse(Some("{ nope")), Err(MapError::Json(_))));
    }
}

//! HTML for Leaflet `divIcon`s and popups.

use map_engine::{MarkerKind, MarkerSize, MarkerSpec};

pub fn class_name(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::SelfLocation => "user-location-marker",
        MarkerKind::Job | MarkerKind::Worker => "custom-job-marker",
    }
}

pub fn icon_html(spec: &MarkerSpec) -> String {
    if spec.kind == MarkerKind::SelfLocation {
        return concat!(
            r#"<div class="relative flex items-center justify-center">"#,
            r#"<div class="absolute w-10 h-10 bg-blue-500/15 rounded-full animate-ping"></div>"#,
            r#"<div class="relative w-3.5 h-3.5 bg-white rounded-full shadow ring-4 ring-blue-500/60"></div>"#,
            "</div>"
        )
        .to_string();
    }

    let primary = spec.size == MarkerSize::Primary;
    let dot = if primary { "w-11 h-11" } else { "w-9 h-9" };
    let fill = if spec.kind == MarkerKind::Worker { "bg-sky-600" } else { "bg-emerald-600" };
    let glow = if primary { "bg-emerald-500/25" } else { "bg-sky-500/20" };

    let mut html = format!(
        concat!(
            r#"<div class="flex flex-col items-center gap-1">"#,
            r#"<div class="relative flex items-center justify-center {dot} rounded-full {fill} shadow-[0_12px_30px_rgba(0,0,0,0.2)] border-2 border-white">"#,
            r#"<div class="absolute inset-0 rounded-full {glow} blur-sm"></div>"#,
            r#"<span class="relative text-white text-sm font-bold">{glyph}</span>"#,
            "</div>"
        ),
        dot = dot,
        fill = fill,
        glow = glow,
        glyph = escape(&spec.glyph),
    );
    if let Some(badge) = &spec.badge {
        html.push_str(&format!(
            r#"<div class="px-2 py-1 text-[11px] font-semibold text-emerald-900 bg-white rounded-full shadow border border-emerald-100">{}</div>"#,
            escape(badge)
        ));
    }
    html.push_str("</div>");
    html
}

pub fn popup_html(spec: &MarkerSpec) -> String {
    let popup = &spec.popup;
    if popup.body.is_none() && popup.price.is_none() {
        return format!(r#"<div class="text-sm font-semibold">{}</div>"#, escape(popup.title));
    }
    let mut html = format!(r#"<div class="text-sm"><strong>{}</strong>"#, escape(popup.title));
    if let Some(body) = popup.body {
        html.push_str("<br/>");
        html.push_str(&escape(body));
    }
    if let Some(price) = &popup.price {
        html.push_str(&format!("<br/><strong>{}</strong>", escape(price)));
    }
    html.push_str("</div>");
    html
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use shared::{LatLng, Pin};

    use super::*;

    #[test]
    fn active_job_icon_is_large_with_badge() {
        let spec = MarkerSpec::for_pin(&Pin::job(12.97, 77.59, "₹800", "🔧").active()).unwrap();
        let html = icon_html(&spec);
        assert!(html.contains("w-11 h-11"));
        assert!(html.contains("bg-emerald-600"));
        assert!(html.contains(">₹800</div>"));
        assert!(html.contains(">🔧</span>"));
    }

    #[test]
    fn worker_icon_is_blue_dot_without_badge() {
        let spec = MarkerSpec::for_pin(&Pin::worker(12.96, 77.58)).unwrap();
        let html = icon_html(&spec);
        assert!(html.contains("w-9 h-9"));
        assert!(html.contains("bg-sky-600"));
        assert!(html.contains(">•</span>"));
        assert!(!html.contains("text-emerald-900"));
    }

    #[test]
    fn caller_text_is_escaped() {
        let spec = MarkerSpec::for_pin(&Pin::job(1.0, 1.0, "<b>9</b>", "<script>").active()).unwrap();
        let html = icon_html(&spec);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(popup_html(&spec).contains("&lt;b&gt;9&lt;/b&gt;"));
    }

    #[test]
    fn popups_follow_marker_kind() {
        let job = MarkerSpec::for_pin(&Pin::job(1.0, 1.0, "₹500", "x")).unwrap();
        assert_eq!(
            popup_html(&job),
            r#"<div class="text-sm"><strong>Job Site</strong><br/>Posted at this location<br/><strong>₹500</strong></div>"#
        );

        let worker = MarkerSpec::for_pin(&Pin::worker(1.0, 1.0)).unwrap();
        assert_eq!(
            popup_html(&worker),
            r#"<div class="text-sm"><strong>Worker Location</strong><br/>Current position</div>"#
        );

        let me = MarkerSpec::for_self(LatLng::new(1.0, 1.0)).unwrap();
        assert_eq!(popup_html(&me), r#"<div class="text-sm font-semibold">You are here</div>"#);
        assert_eq!(class_name(me.kind), "user-location-marker");
        assert!(icon_html(&me).contains("animate-ping"));
    }
}

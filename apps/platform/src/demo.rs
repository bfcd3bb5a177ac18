use shared::Pin;

/// An open job with a quoted price next to an idle worker.
pub fn demo_pins() -> Vec<Pin> {
    vec![
        Pin::job(12.97, 77.59, "₹800", "🔧").active(),
        Pin::worker(12.96, 77.58),
    ]
}

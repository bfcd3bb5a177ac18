//! `map-replay <scenario.json>`: run a scenario against the headless map and
//! print the resulting report as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = run() {
        tracing::error!(?err, "map replay failed");
        eprintln!("map-replay: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> anyhow::Result<()> {
    use anyhow::Context;

    marketplace::telemetry::init_native("info");

    let path = std::env::args()
        .nth(1)
        .context("usage: map-replay <scenario.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let report = marketplace::replay::run_json(&raw)?;
    tracing::info!(
        ignored = report.ignored.len(),
        clicked = report.clicked.len(),
        "scenario finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::StaticSegment;
use map_engine::{JobMap as Engine, MapConfig, MapProps, MapResult, MapSession, PinHandler};
use shared::{LatLng, Pin};

use crate::demo::demo_pins;
use crate::geolocation::BrowserLocator;
use crate::map::LeafletContainer;

type Session = StoredValue<MapSession<LeafletContainer>, LocalStorage>;

const CONTROL: &str = "w-11 h-11 rounded-xl bg-white shadow-md border border-black/5 flex items-center justify-center hover:shadow-lg transition";

/// Run a control against the engine. Before mount and after unmount the
/// engine refuses, which is not worth surfacing to the user.
fn control<R>(session: Session, action: impl FnOnce(&mut Engine<LeafletContainer>) -> MapResult<R>) {
    if let Some(Err(err)) = session.try_with_value(|s| s.with_mut(action)) {
        tracing::debug!(%err, "map control ignored");
    }
}

/// Interactive job-site map.
///
/// Settings come from a `MapConfig` in context, or its defaults.
#[component]
pub fn JobMap(
    #[prop(into, optional)] center: MaybeProp<LatLng>,
    #[prop(into, optional)] zoom: MaybeProp<f64>,
    #[prop(into)] pins: Signal<Vec<Pin>>,
    #[prop(optional)] on_pin_click: Option<Callback<Pin>>,
    #[prop(default = true)] show_controls: bool,
) -> impl IntoView {
    let config = use_context::<MapConfig>().unwrap_or_default();
    let element_id = format!("job-map-{}", uuid::Uuid::new_v4().simple());

    let on_pin_click: Option<PinHandler> = on_pin_click.map(|callback| {
        let handler: PinHandler = Rc::new(move |pin: &Pin| callback.run(pin.clone()));
        handler
    });

    let session: Session = StoredValue::new_local(MapSession::new(
        LeafletContainer::new(element_id.clone()),
        &config,
        MapProps {
            center: center.get_untracked(),
            zoom: zoom.get_untracked(),
            pins: pins.get_untracked(),
            on_pin_click: on_pin_click.clone(),
            show_controls,
        },
    ));

    // The container div exists once effects run; ask for the position once.
    Effect::new(move |_| {
        session.with_value(|s| {
            match s.mount() {
                Ok(outcome) => tracing::debug!(?outcome, "job map mount"),
                Err(err) => tracing::warn!(%err, "job map mount failed"),
            }
            s.request_location(&BrowserLocator, &config);
        });
    });

    Effect::new(move |_| {
        let props = MapProps {
            center: center.get(),
            zoom: zoom.get(),
            pins: pins.get(),
            on_pin_click: on_pin_click.clone(),
            show_controls,
        };
        if let Some(Err(err)) = session.try_with_value(|s| s.with_mut(|map| map.update(props))) {
            tracing::debug!(%err, "map update deferred");
        }
    });

    on_cleanup(move || {
        session.try_with_value(|s| s.teardown());
    });

    view! {
        <div class="relative h-full w-full overflow-hidden rounded-2xl shadow-lg bg-white">
            <div id=element_id class="absolute inset-0 z-0" style="background: #f3f4f6"></div>
            {show_controls.then(|| view! {
                <div class="absolute right-3 top-3 z-10 flex flex-col gap-2">
                    <button on:click=move |_| control(session, |map| map.zoom_in()) class=CONTROL aria-label="Zoom in">
                        <span class="text-lg font-bold text-slate-700">"+"</span>
                    </button>
                    <button on:click=move |_| control(session, |map| map.zoom_out()) class=CONTROL aria-label="Zoom out">
                        <span class="text-lg font-bold text-slate-700">"-"</span>
                    </button>
                    <button on:click=move |_| control(session, |map| map.locate()) class=CONTROL title="My location" aria-label="Locate me">
                        <svg viewBox="0 0 24 24" class="w-5 h-5 text-blue-600" fill="none" stroke="currentColor" stroke-width="1.8" stroke-linecap="round" stroke-linejoin="round">
                            <circle cx="12" cy="12" r="3" />
                            <path d="M12 2v3" />
                            <path d="M12 19v3" />
                            <path d="M5 12H2" />
                            <path d="M22 12h-3" />
                        </svg>
                    </button>
                    <button on:click=move |_| control(session, |map| map.reset_view()) class=CONTROL title="Reset view" aria-label="Reset view">
                        <span class="text-sm font-semibold text-slate-700">"⟳"</span>
                    </button>
                </div>
            })}
        </div>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let (pins, _) = signal(demo_pins());
    let (selected, set_selected) = signal(None::<Pin>);

    view! {
        <div class="h-screen w-screen grid grid-rows-[auto_1fr]">
            <header class="px-6 py-3 border-b border-slate-200 flex items-center justify-between">
                <h1 class="text-lg font-semibold">"Jobs near you"</h1>
                <span class="text-sm text-slate-500">"Leptos 0.7 / Leaflet"</span>
            </header>
            <main class="grid grid-cols-[2fr_1fr]">
                <section class="relative p-4">
                    <JobMap
                        pins=pins
                        on_pin_click=Callback::new(move |pin: Pin| set_selected.set(Some(pin)))
                    />
                </section>
                <aside class="border-l border-slate-200 p-4 space-y-3 overflow-auto">
                    <h2 class="font-medium">"Selected pin"</h2>
                    {move || match selected.get() {
                        Some(pin) => view! {
                            <dl class="text-sm space-y-1">
                                <dt class="text-slate-500">"Kind"</dt>
                                <dd>{if pin.is_worker() { "Worker" } else { "Job" }}</dd>
                                <dt class="text-slate-500">"Position"</dt>
                                <dd>{format!("{:.4}, {:.4}", pin.lat, pin.lng)}</dd>
                                <dt class="text-slate-500">"Price"</dt>
                                <dd>{if pin.label.is_empty() { "-".to_string() } else { pin.label.clone() }}</dd>
                            </dl>
                        }
                        .into_any(),
                        None => view! { <p class="text-sm text-slate-500">"Tap a marker on the map."</p> }.into_any(),
                    }}
                </aside>
            </main>
        </div>
    }
}

#[component]
pub fn App(config: MapConfig) -> impl IntoView {
    provide_meta_context();
    provide_context(config);

    view! {
        <Stylesheet href="/style/output.css" />
        <Title text="Job Map" />
        <Router>
            <Routes fallback=|| "Not Found">
                <Route path=StaticSegment("") view=HomePage />
            </Routes>
        </Router>
    }
}

//! `map-engine`: the job-site map without a UI framework.
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`surface`]      | `Surface`/`Container` traits, `SurfaceManager`, guard    |
//! | [`marker`]       | `MarkerSpec`: per-pin visual policy                      |
//! | [`reconciler`]   | `MarkerReconciler`: replace-all marker rendering         |
//! | [`geolocation`]  | `GeolocationTracker`, `PositionSource`                   |
//! | [`camera`]       | `CameraOwner` state machine, `CameraController`          |
//! | [`engine`]       | `JobMap`: the four concerns wired together               |
//! | [`session`]      | `MapSession`: shared handle with liveness-checked async  |
//! | [`headless`]     | Recording backend for tests and replays                  |
//! | [`config`]       | `MapConfig`, `BaseLayer`, `LocateOptions`                |
//! | [`error`]        | `MapError`, `LocationError`, `MapResult<T>`              |

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod geolocation;
pub mod headless;
pub mod marker;
pub mod reconciler;
pub mod session;
pub mod surface;


pub use camera::{CameraController, CameraOwner};
pub use config::{BaseLayer, LocateOptions, MapConfig};
pub use engine::{JobMap, MapProps};
pub use error::{LocationError, MapError, MapResult};
pub use geolocation::{GeolocationTracker, LocationCallback, LocationResult, PositionSource};
pub use marker::{MarkerKind, MarkerSize, MarkerSpec};
pub use reconciler::{MarkerReconciler, PinHandler, RenderReport};
pub use session::MapSession;
pub use surface::{ClickHandler, Container, InitOutcome, Surface, SurfaceManager, ZoomDirection};

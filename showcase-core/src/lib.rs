/// Showcase Core Library - scroll-driven camera and product configurator logic
///
/// This library holds everything that does not depend on a particular
/// renderer or page: the camera pose and its per-frame commit, the scroll
/// timeline, tweens, the asset loader reveal, UI bindings and configuration.
/// Backends supply a `RenderEngine` and a `Page`.

pub mod binder;
pub mod camera;
pub mod color;
pub mod config;
pub mod configurator;
pub mod device;
pub mod easing;
pub mod error;
pub mod events;
pub mod gate;
pub mod geometry;
pub mod loader;
pub mod page;
pub mod pipeline;
pub mod surface;
pub mod timeline;
pub mod trigger;
pub mod tween;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use binder::{Mode, UiAction};
pub use camera::{Camera, CameraPose, PoseProperty};
pub use color::{LinearColor, SrgbColor, Swatch};
pub use config::ConfiguratorConfig;
pub use configurator::Configurator;
pub use device::{DeviceProfile, DeviceValue};
pub use error::{Result, ShowcaseError};
pub use geometry::{MaterialId, Mesh, Triangle, Vertex};
pub use loader::{ImporterEvent, LoadPhase};
pub use page::{Cursor, ElementRect, ElementStyle, Page};
pub use pipeline::{Pipeline, Plugin};
pub use surface::{FrameReport, RenderEngine, RenderSurfaceAdapter};

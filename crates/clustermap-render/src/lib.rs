//! ClusterMap Render Library
//!
//! Map camera, overlay styling and a retained [`SceneOverlay`] that turns
//! session output into screen-space draw items.

pub mod camera;
mod scene;
pub mod style;

pub use camera::MapCamera;
pub use scene::{DrawItem, Frame, SceneOverlay};
pub use style::OverlayStyle;

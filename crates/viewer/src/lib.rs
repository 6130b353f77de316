// Library crate: the viewer core (loading, normalization, clipping, picking)
// plus the headless harness and JSON command layer used by tests.
// GUI-specific modules (app, ui, GL rendering) remain in the binary crate.

pub mod clipping;
pub mod command;
pub mod document;
pub mod error;
pub mod fixtures;
pub mod format;
pub mod harness;
pub mod highlight;
pub mod loader;
pub mod normalize;
pub mod resource;
pub mod state;
pub mod validation;
pub mod viewer;

/// Geometry, picking and camera math. GL rendering stays in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod mesh;
    pub mod picking;
}

pub use error::LoadError;
pub use viewer::{LoadStatus, ModelViewer, ViewerConfig, ViewerEvent};

pub mod settings;

pub use settings::{AppSettings, CameraSettings, GridSettings, LoadingSettings, UiSettings, ViewportSettings};

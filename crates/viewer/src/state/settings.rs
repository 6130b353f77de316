//! Application settings

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::EnvironmentPreset;

use crate::format::ProbeOrder;
use crate::normalize::Rgba;
use crate::viewer::ViewerConfig;
use crate::viewport::camera::DEFAULT_DAMPING;

/// Grid display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Show grid
    pub visible: bool,
    /// Grid cell size in world units
    pub size: f32,
    /// Number of grid lines in each direction from origin
    pub range: i32,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 1.0,
            range: 5,
            opacity: 0.4,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Click highlight color RGB
    pub highlight_color: [u8; 3],
    /// Enable anti-aliasing
    pub antialiasing: bool,
    #[serde(default)]
    pub grid: GridSettings,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            highlight_color: [255, 0, 0],
            antialiasing: true,
            grid: GridSettings::default(),
        }
    }
}

impl ViewportSettings {
    pub fn highlight_rgba(&self) -> Rgba {
        rgb_to_rgba(self.highlight_color)
    }
}

/// Model loading settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadingSettings {
    /// Which parser is tried first for files without a usable extension
    pub probe_order: ProbeOrder,
    /// Parse time budget in seconds
    pub timeout_secs: u64,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            probe_order: ProbeOrder::default(),
            timeout_secs: 60,
        }
    }
}

impl LoadingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    /// Environment preset selected at startup
    #[serde(default)]
    pub default_environment: EnvironmentPreset,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            default_environment: EnvironmentPreset::default(),
        }
    }
}

/// Orbit camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Fraction of the remaining orbit motion applied per frame; 0 disables easing
    pub damping: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// Loading settings
    #[serde(default)]
    pub loading: LoadingSettings,
    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
    /// Camera settings
    #[serde(default)]
    pub camera: CameraSettings,
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "meshviewer", "mesh-viewer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .map(|json| Self::from_json(&json))
            .unwrap_or_default()
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed settings: {e}");
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("Cannot create config dir {}: {e}", dir.display());
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Cannot write {}: {e}", path.display());
                }
            }
            Err(e) => tracing::warn!("Cannot serialize settings: {e}"),
        }
    }

    /// Settings the viewer core cares about
    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            probe_order: self.loading.probe_order,
            highlight_color: self.viewport.highlight_rgba(),
            environment: self.ui.default_environment,
        }
    }
}

pub fn rgb_to_rgba(rgb: [u8; 3]) -> Rgba {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::DEFAULT_HIGHLIGHT_COLOR;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.viewport.highlight_rgba(), DEFAULT_HIGHLIGHT_COLOR);
        assert_eq!(s.loading.probe_order, ProbeOrder::StlFirst);
        assert_eq!(s.loading.timeout(), Duration::from_secs(60));
        assert_eq!(s.camera.damping, DEFAULT_DAMPING);
        assert_eq!(s.ui.default_environment, EnvironmentPreset::Sunset);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = AppSettings::from_json(r#"{"loading": {"probe_order": "gltf_first", "timeout_secs": 5}}"#);
        assert_eq!(s.loading.probe_order, ProbeOrder::GltfFirst);
        assert_eq!(s.loading.timeout_secs, 5);
        assert_eq!(s.viewport.highlight_color, [255, 0, 0]);
        assert!(s.viewport.grid.visible);
    }

    #[test]
    fn test_malformed_json_gives_defaults() {
        let s = AppSettings::from_json("{not json");
        assert_eq!(s.loading.timeout_secs, 60);
    }

    #[test]
    fn test_zero_timeout_floors_to_one_second() {
        let loading = LoadingSettings {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(loading.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_viewer_config() {
        let mut s = AppSettings::default();
        s.viewport.highlight_color = [0, 255, 0];
        s.ui.default_environment = EnvironmentPreset::Night;
        let cfg = s.viewer_config();
        assert_eq!(cfg.highlight_color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(cfg.environment, EnvironmentPreset::Night);
    }

    #[test]
    fn test_json_roundtrip_keeps_environment_name() {
        let mut s = AppSettings::default();
        s.ui.default_environment = EnvironmentPreset::Warehouse;
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"warehouse\""));
        assert_eq!(AppSettings::from_json(&json).ui.default_environment, EnvironmentPreset::Warehouse);
    }
}

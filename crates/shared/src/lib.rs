use serde::{Deserialize, Serialize};

/// Поддерживаемый формат модели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Glb,
    Gltf,
    Stl,
}

impl ModelFormat {
    /// Формат по расширению файла (без учёта регистра)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "glb" => Some(Self::Glb),
            "gltf" => Some(Self::Gltf),
            "stl" => Some(Self::Stl),
            _ => None,
        }
    }

    /// Короткая метка для бейджа в интерфейсе
    pub fn label(&self) -> &'static str {
        match self {
            Self::Glb => "GLB",
            Self::Gltf => "GLTF",
            Self::Stl => "STL",
        }
    }

    /// Расширения, принимаемые диалогом открытия файла
    pub fn extensions() -> &'static [&'static str] {
        &["glb", "gltf", "stl"]
    }
}

/// Ось плоскости сечения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipAxis {
    #[default]
    X,
    Y,
    Z,
}

impl ClipAxis {
    /// Единичный базисный вектор оси
    pub fn unit(&self) -> [f32; 3] {
        match self {
            Self::X => [1.0, 0.0, 0.0],
            Self::Y => [0.0, 1.0, 0.0],
            Self::Z => [0.0, 0.0, 1.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    pub fn all() -> &'static [ClipAxis] {
        &[Self::X, Self::Y, Self::Z]
    }
}

/// Пресет окружения. Ядро его не интерпретирует, только передаёт рендереру.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    #[default]
    Sunset,
    Dawn,
    Night,
    Warehouse,
    Forest,
    Apartment,
    Studio,
    City,
    Park,
    Lobby,
}

impl EnvironmentPreset {
    pub fn all() -> &'static [EnvironmentPreset] {
        &[
            Self::Sunset,
            Self::Dawn,
            Self::Night,
            Self::Warehouse,
            Self::Forest,
            Self::Apartment,
            Self::Studio,
            Self::City,
            Self::Park,
            Self::Lobby,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sunset => "Sunset",
            Self::Dawn => "Dawn",
            Self::Night => "Night",
            Self::Warehouse => "Warehouse",
            Self::Forest => "Forest",
            Self::Apartment => "Apartment",
            Self::Studio => "Studio",
            Self::City => "City",
            Self::Park => "Park",
            Self::Lobby => "Lobby",
        }
    }
}

/// Допустимый диапазон смещения плоскости сечения
pub const CLIP_OFFSET_MIN: f32 = -5.0;
pub const CLIP_OFFSET_MAX: f32 = 5.0;
/// Шаг ползунка смещения
pub const CLIP_OFFSET_STEP: f32 = 0.1;

/// Значения панели управления, которые потребляет ядро просмотрщика
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerControls {
    pub wireframe: bool,
    pub environment: EnvironmentPreset,
    pub clip_axis: ClipAxis,
    pub clip_offset: f32,
    pub clip_enabled: bool,
    pub highlight_enabled: bool,
}

impl Default for ViewerControls {
    fn default() -> Self {
        Self {
            wireframe: false,
            environment: EnvironmentPreset::default(),
            clip_axis: ClipAxis::X,
            clip_offset: 0.0,
            clip_enabled: false,
            highlight_enabled: false,
        }
    }
}

/// Размер файла в читаемом виде: "0 Bytes", "1.5 KB", "2 MB"
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let k = 1024_f64;
    let b = bytes as f64;
    let i = ((b.ln() / k.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = b / k.powi(i as i32);
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[i])
}

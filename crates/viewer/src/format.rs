//! Format detection: trust the filename when it names a supported format,
//! otherwise probe the bytes with trial parses in a configurable order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::ModelFormat;

use crate::document::{self, SceneDocument};
use crate::error::LoadError;

/// Format suggested by the filename
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatHint {
    Glb,
    Gltf,
    Stl,
    Unknown,
}

impl FormatHint {
    pub fn from_format(format: ModelFormat) -> Self {
        match format {
            ModelFormat::Glb => Self::Glb,
            ModelFormat::Gltf => Self::Gltf,
            ModelFormat::Stl => Self::Stl,
        }
    }

    /// `Unknown` for a missing name, a name without extension, or an unsupported one
    pub fn from_name(name: Option<&str>) -> Self {
        name.and_then(extension)
            .and_then(ModelFormat::from_extension)
            .map_or(Self::Unknown, Self::from_format)
    }

    pub fn format(&self) -> Option<ModelFormat> {
        match self {
            Self::Glb => Some(ModelFormat::Glb),
            Self::Gltf => Some(ModelFormat::Gltf),
            Self::Stl => Some(ModelFormat::Stl),
            Self::Unknown => None,
        }
    }
}

/// Which trial parse runs first when there is no usable hint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOrder {
    #[default]
    StlFirst,
    GltfFirst,
}

/// How the format was established
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detection {
    /// Taken from the filename extension, no probing
    Hinted(ModelFormat),
    /// Established by a successful trial parse
    Probed(ModelFormat),
}

impl Detection {
    pub fn format(&self) -> ModelFormat {
        match self {
            Self::Hinted(f) | Self::Probed(f) => *f,
        }
    }

    pub fn is_probed(&self) -> bool {
        matches!(self, Self::Probed(_))
    }
}

fn extension(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|e| e.to_str())
}

/// Reject names that carry an extension outside the supported set.
/// A missing name or a name without extension passes as `Unknown`.
pub fn check_extension(name: Option<&str>) -> Result<FormatHint, LoadError> {
    match name.and_then(extension) {
        None => Ok(FormatHint::Unknown),
        Some(ext) => match ModelFormat::from_extension(ext) {
            Some(format) => Ok(FormatHint::from_format(format)),
            None => Err(LoadError::UnsupportedFormat {
                name: name.map(str::to_string),
            }),
        },
    }
}

/// Classify without keeping the parsed document. Pure and idempotent.
pub fn detect(bytes: &[u8], name: Option<&str>, order: ProbeOrder) -> Result<Detection, LoadError> {
    match check_extension(name)?.format() {
        Some(format) => Ok(Detection::Hinted(format)),
        None => probe(bytes, name, order).map(|(detection, _)| detection),
    }
}

/// Classify and parse in one pass. A hinted format is parsed once; a probed
/// format reuses the trial parse that succeeded.
pub fn parse_detected(
    bytes: &[u8],
    name: Option<&str>,
    order: ProbeOrder,
) -> Result<(Detection, SceneDocument), LoadError> {
    match check_extension(name)?.format() {
        Some(format) => {
            let doc = SceneDocument::parse(format, bytes)?;
            Ok((Detection::Hinted(format), doc))
        }
        None => probe(bytes, name, order),
    }
}

fn probe(bytes: &[u8], name: Option<&str>, order: ProbeOrder) -> Result<(Detection, SceneDocument), LoadError> {
    let trials: [fn(&[u8]) -> Result<SceneDocument, LoadError>; 2] = match order {
        ProbeOrder::StlFirst => [document::parse_stl, document::parse_gltf],
        ProbeOrder::GltfFirst => [document::parse_gltf, document::parse_stl],
    };

    for trial in trials {
        match trial(bytes) {
            Ok(doc) => {
                tracing::debug!("Probed format: {}", doc.format.label());
                return Ok((Detection::Probed(doc.format), doc));
            }
            Err(e) => tracing::debug!("Trial parse failed: {e}"),
        }
    }

    Err(LoadError::UnsupportedFormat {
        name: name.map(str::to_string),
    })
}

//! Scene normalization: parsed document → owned, pickable mesh records.
//!
//! Every record gets a private material clone, so per-mesh display state
//! (wireframe, clip planes, color) never leaks to siblings that shared a
//! material in the source document.

use std::sync::Arc;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::clipping::ClipPlane;
use crate::document::{DocumentId, DocumentKind, GltfScene, MaterialDef, SceneDocument, StlMesh};
use crate::error::LoadError;
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

pub type Rgba = [f32; 4];

/// Neutral gray for formats that carry no material (STL)
pub const NEUTRAL_COLOR: Rgba = [0.8, 0.8, 0.8, 1.0];

/// Stable id of a record within the current mesh set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u32);

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh-{}", self.0)
    }
}

/// Per-record material. Color, wireframe and clip planes are set
/// independently so one writer never clobbers another's field.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
    color: Rgba,
    wireframe: bool,
    clip_planes: Vec<ClipPlane>,
}

impl Material {
    pub fn neutral() -> Self {
        Self {
            name: None,
            metallic: 0.0,
            roughness: 0.8,
            double_sided: true,
            color: NEUTRAL_COLOR,
            wireframe: false,
            clip_planes: Vec::new(),
        }
    }

    /// Private clone of a source material
    pub fn from_def(def: &MaterialDef) -> Self {
        Self {
            name: def.name.clone(),
            metallic: def.metallic,
            roughness: def.roughness,
            double_sided: def.double_sided,
            color: def.base_color,
            wireframe: false,
            clip_planes: Vec::new(),
        }
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    pub fn clip_planes(&self) -> &[ClipPlane] {
        &self.clip_planes
    }

    pub fn set_clip_plane(&mut self, plane: Option<ClipPlane>) {
        self.clip_planes.clear();
        self.clip_planes.extend(plane);
    }
}

/// Display flags pushed onto every record
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplayState {
    pub wireframe: bool,
    /// Active clip plane, `None` while clipping is disabled
    pub clip: Option<ClipPlane>,
}

#[derive(Clone, Debug)]
pub struct MeshRecord {
    pub id: MeshId,
    pub name: String,
    /// World-space geometry. Shared with the document when no transform applies.
    pub geometry: Arc<MeshData>,
    pub material: Material,
    pub pickable: bool,
    pub bounds: Aabb,
    original_color: Option<Rgba>,
}

impl MeshRecord {
    fn new(id: MeshId, name: String, geometry: Arc<MeshData>, material: Material) -> Self {
        let bounds = Aabb::from_mesh(&geometry);
        let mut record = Self {
            id,
            name,
            geometry,
            material,
            pickable: true,
            bounds,
            original_color: None,
        };
        record.capture_original_color();
        record
    }

    pub fn original_color(&self) -> Option<Rgba> {
        self.original_color
    }

    /// Capture the current color as the original, once. Returns the original.
    pub fn capture_original_color(&mut self) -> Rgba {
        *self.original_color.get_or_insert(self.material.color())
    }

    /// Put the captured original color back. False if none was captured.
    pub fn restore_original_color(&mut self) -> bool {
        match self.original_color {
            Some(c) => {
                self.material.set_color(c);
                true
            }
            None => false,
        }
    }
}

/// Whether [`MeshSet::normalize`] built new records or only refreshed flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalized {
    Built(usize),
    Refreshed,
}

/// Records of the current model, in traversal order
#[derive(Default)]
pub struct MeshSet {
    document: Option<DocumentId>,
    records: Vec<MeshRecord>,
}

impl MeshSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build records for `doc`, or refresh display flags if `doc` is already installed.
    ///
    /// On error the current records are left untouched.
    pub fn normalize(&mut self, doc: &SceneDocument, display: &DisplayState) -> Result<Normalized, LoadError> {
        if self.document == Some(doc.id) {
            self.apply_display(display);
            return Ok(Normalized::Refreshed);
        }

        let mut records = match &doc.kind {
            DocumentKind::Gltf(scene) => gltf_records(scene)?,
            DocumentKind::Stl(stl) => vec![stl_record(stl)],
        };
        if records.is_empty() {
            return Err(LoadError::malformed("document contains no drawable meshes"));
        }
        for record in &mut records {
            record.material.set_wireframe(display.wireframe);
            record.material.set_clip_plane(display.clip);
        }

        let count = records.len();
        self.records = records;
        self.document = Some(doc.id);
        tracing::debug!("Normalized {count} mesh record(s)");
        Ok(Normalized::Built(count))
    }

    pub fn apply_display(&mut self, display: &DisplayState) {
        self.set_wireframe(display.wireframe);
        self.set_clip_plane(display.clip);
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        for r in &mut self.records {
            r.material.set_wireframe(wireframe);
        }
    }

    /// Set (or clear, with `None`) the clip plane on every record
    pub fn set_clip_plane(&mut self, plane: Option<ClipPlane>) {
        for r in &mut self.records {
            r.material.set_clip_plane(plane);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.document = None;
    }

    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: MeshId) -> Option<&MeshRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut MeshRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn pickable_count(&self) -> usize {
        self.records.iter().filter(|r| r.pickable).count()
    }

    pub fn triangle_count(&self) -> usize {
        self.records.iter().map(|r| r.geometry.triangle_count()).sum()
    }

    /// Union of all record bounds
    pub fn bounds(&self) -> Option<Aabb> {
        self.records
            .iter()
            .map(|r| r.bounds)
            .filter(Aabb::is_valid)
            .reduce(|a, b| a.union(&b))
    }
}

fn gltf_records(scene: &GltfScene) -> Result<Vec<MeshRecord>, LoadError> {
    let mut records = Vec::new();
    let mut failure = None;

    scene.visit_primitives(|visit| {
        if failure.is_some() {
            return;
        }
        let material = match visit.primitive.material {
            None => Material::from_def(&MaterialDef::default()),
            Some(idx) => match scene.material(Some(idx)) {
                Some(def) => Material::from_def(def),
                None => {
                    failure = Some(LoadError::malformed(format!("material {idx} does not exist")));
                    return;
                }
            },
        };

        let geometry = if visit.world == Mat4::IDENTITY {
            Arc::clone(&visit.primitive.geometry)
        } else {
            Arc::new(visit.primitive.geometry.transformed(&visit.world))
        };

        let id = MeshId(records.len() as u32);
        let base = scene.nodes[visit.node]
            .name
            .clone()
            .or_else(|| visit.mesh.name.clone())
            .unwrap_or_else(|| format!("Mesh {}", id.0));
        let name = if visit.mesh.primitives.len() > 1 {
            format!("{base}.{}", visit.primitive_index)
        } else {
            base
        };

        records.push(MeshRecord::new(id, name, geometry, material));
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(records),
    }
}

/// One neutral record, re-centered on its bounding-box center
fn stl_record(stl: &StlMesh) -> MeshRecord {
    let mut geometry = (*stl.geometry).clone();
    geometry.translate(-stl.bounds.center());
    MeshRecord::new(MeshId(0), "STL Mesh".to_string(), Arc::new(geometry), Material::neutral())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipping::ClipPlane;
    use crate::fixtures;
    use crate::format::{parse_detected, ProbeOrder};
    use glam::Vec3;

    fn load(bytes: &[u8], name: Option<&str>) -> SceneDocument {
        parse_detected(bytes, name, ProbeOrder::StlFirst).unwrap().1
    }

    #[test]
    fn test_two_mesh_records_have_private_materials() {
        let doc = load(&fixtures::two_mesh_glb(), Some("two.glb"));
        let mut set = MeshSet::new();
        assert_eq!(set.normalize(&doc, &DisplayState::default()).unwrap(), Normalized::Built(2));
        assert_eq!(set.pickable_count(), doc.drawable_primitive_count());

        set.get_mut(MeshId(0)).unwrap().material.set_color([0.0, 1.0, 0.0, 1.0]);
        assert_eq!(set.get(MeshId(1)).unwrap().material.color(), fixtures::SHARED_BASE_COLOR);
        assert_eq!(set.get(MeshId(0)).unwrap().original_color(), Some(fixtures::SHARED_BASE_COLOR));
    }

    #[test]
    fn test_instanced_primitives_count() {
        let doc = load(&fixtures::instanced_glb(), None);
        let mut set = MeshSet::new();
        set.normalize(&doc, &DisplayState::default()).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.pickable_count(), doc.drawable_primitive_count());
        // Untextured primitive falls back to the glTF default material
        assert_eq!(set.get(MeshId(1)).unwrap().material.color(), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_node_transform_baked_into_geometry() {
        let doc = load(&fixtures::two_mesh_glb(), None);
        let mut set = MeshSet::new();
        set.normalize(&doc, &DisplayState::default()).unwrap();
        let left = set.get(MeshId(0)).unwrap();
        assert!((left.bounds.center() - Vec3::new(fixtures::TWO_MESH_LEFT_X, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_stl_recentered() {
        let offset = Vec3::new(10.0, -4.0, 7.0);
        let bytes = fixtures::binary_stl(&fixtures::offset_cube_triangles(offset));
        let doc = load(&bytes, Some("model.stl"));
        let mut set = MeshSet::new();
        set.normalize(&doc, &DisplayState::default()).unwrap();
        assert_eq!(set.len(), 1);
        let rec = set.get(MeshId(0)).unwrap();
        assert!(rec.bounds.center().length() < 1e-5);
        assert!(rec.pickable);
        assert_eq!(rec.material.color(), NEUTRAL_COLOR);
    }

    #[test]
    fn test_renormalize_same_document_only_refreshes_flags() {
        let doc = load(&fixtures::two_mesh_glb(), None);
        let mut set = MeshSet::new();
        set.normalize(&doc, &DisplayState::default()).unwrap();
        set.get_mut(MeshId(0)).unwrap().material.set_color([1.0, 0.0, 0.0, 1.0]);

        let plane = ClipPlane::new(Vec3::X, 0.5);
        let display = DisplayState {
            wireframe: true,
            clip: Some(plane),
        };
        assert_eq!(set.normalize(&doc, &display).unwrap(), Normalized::Refreshed);

        let rec = set.get(MeshId(0)).unwrap();
        assert_eq!(rec.material.color(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rec.original_color(), Some(fixtures::SHARED_BASE_COLOR));
        assert!(rec.material.wireframe());
        assert_eq!(rec.material.clip_planes(), &[plane]);
    }

    #[test]
    fn test_new_document_replaces_records() {
        let mut set = MeshSet::new();
        set.normalize(&load(&fixtures::two_mesh_glb(), None), &DisplayState::default())
            .unwrap();
        let stl = fixtures::binary_stl(&fixtures::offset_cube_triangles(Vec3::ZERO));
        set.normalize(&load(&stl, None), &DisplayState::default()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_capture_original_color_is_set_once() {
        let doc = load(&fixtures::two_mesh_glb(), None);
        let mut set = MeshSet::new();
        set.normalize(&doc, &DisplayState::default()).unwrap();
        let rec = set.get_mut(MeshId(0)).unwrap();
        rec.material.set_color([0.0, 0.0, 0.0, 1.0]);
        assert_eq!(rec.capture_original_color(), fixtures::SHARED_BASE_COLOR);
        assert!(rec.restore_original_color());
        assert_eq!(rec.material.color(), fixtures::SHARED_BASE_COLOR);
    }
}

//! Parsed scene documents.
//!
//! A [`SceneDocument`] is produced once per successful load and never mutated
//! afterwards. The normalizer copies out of it into owned mesh records.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use glam::{Mat4, Vec3};
use shared::ModelFormat;
use uuid::Uuid;

use crate::error::LoadError;
use crate::validation::MeshValidator;
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const STL_HEADER_LEN: usize = 80;
const STL_TRIANGLE_LEN: usize = 50;

/// Identity of one parsed document. Re-normalizing the same id is display-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Clone, Debug)]
pub struct SceneDocument {
    pub id: DocumentId,
    pub format: ModelFormat,
    pub kind: DocumentKind,
}

#[derive(Clone, Debug)]
pub enum DocumentKind {
    Gltf(GltfScene),
    Stl(StlMesh),
}

/// Source material as authored. Shared by index between primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDef {
    pub name: Option<String>,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

impl Default for MaterialDef {
    /// glTF default material
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 1.0,
            roughness: 1.0,
            double_sided: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PrimitiveDef {
    /// Geometry in mesh-local space
    pub geometry: Arc<MeshData>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct MeshDef {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDef>,
}

#[derive(Clone, Debug)]
pub struct NodeDef {
    pub name: Option<String>,
    pub transform: Mat4,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct GltfScene {
    pub materials: Vec<MaterialDef>,
    pub meshes: Vec<MeshDef>,
    pub nodes: Vec<NodeDef>,
    pub roots: Vec<usize>,
}

/// One primitive instance reached while walking the node graph
pub struct PrimitiveVisit<'a> {
    pub node: usize,
    pub mesh: &'a MeshDef,
    pub primitive_index: usize,
    pub primitive: &'a PrimitiveDef,
    /// Accumulated node transform
    pub world: Mat4,
}

impl GltfScene {
    /// Depth-first walk from the roots in document order.
    /// The graph is checked acyclic at parse time.
    pub fn visit_primitives<'a>(&'a self, mut f: impl FnMut(PrimitiveVisit<'a>)) {
        let mut stack: Vec<(usize, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&n| (n, Mat4::IDENTITY))
            .collect();

        while let Some((idx, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            let world = parent * node.transform;
            if let Some(mesh) = node.mesh.and_then(|m| self.meshes.get(m)) {
                for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                    f(PrimitiveVisit {
                        node: idx,
                        mesh,
                        primitive_index,
                        primitive,
                        world,
                    });
                }
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    pub fn material(&self, index: Option<usize>) -> Option<&MaterialDef> {
        index.and_then(|i| self.materials.get(i))
    }
}

/// Single STL geometry, as stored in the file
#[derive(Clone, Debug)]
pub struct StlMesh {
    pub geometry: Arc<MeshData>,
    pub bounds: Aabb,
}

impl SceneDocument {
    /// Parse with a known format
    pub fn parse(format: ModelFormat, bytes: &[u8]) -> Result<Self, LoadError> {
        match format {
            ModelFormat::Stl => parse_stl(bytes),
            ModelFormat::Glb | ModelFormat::Gltf => parse_gltf(bytes),
        }
    }

    /// Drawable primitive instances, or 1 for STL
    pub fn drawable_primitive_count(&self) -> usize {
        match &self.kind {
            DocumentKind::Stl(_) => 1,
            DocumentKind::Gltf(scene) => {
                let mut count = 0;
                scene.visit_primitives(|_| count += 1);
                count
            }
        }
    }
}

// ── STL ──────────────────────────────────────────────────────

fn looks_like_binary_stl(bytes: &[u8]) -> bool {
    if bytes.len() < STL_HEADER_LEN + 4 {
        return false;
    }
    let mut count = [0u8; 4];
    count.copy_from_slice(&bytes[STL_HEADER_LEN..STL_HEADER_LEN + 4]);
    let triangles = u32::from_le_bytes(count) as u64;
    (STL_HEADER_LEN + 4) as u64 + triangles * STL_TRIANGLE_LEN as u64 == bytes.len() as u64
}

fn looks_like_ascii_stl(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    text.trim_start().starts_with("solid")
}

/// Cheap framing check done before handing bytes to the STL reader
pub fn looks_like_stl(bytes: &[u8]) -> bool {
    looks_like_binary_stl(bytes) || looks_like_ascii_stl(bytes)
}

pub fn parse_stl(bytes: &[u8]) -> Result<SceneDocument, LoadError> {
    if !looks_like_stl(bytes) {
        return Err(LoadError::malformed("not an STL stream"));
    }

    let stl = stl_io::read_stl(&mut Cursor::new(bytes))
        .map_err(|e| LoadError::malformed(format!("STL: {e}")))?;

    if stl.faces.is_empty() {
        return Err(LoadError::malformed("STL contains no triangles"));
    }

    let mut triangles = Vec::with_capacity(stl.faces.len());
    for face in &stl.faces {
        let mut corners = [Vec3::ZERO; 3];
        for (corner, &vi) in corners.iter_mut().zip(face.vertices.iter()) {
            let v = stl
                .vertices
                .get(vi)
                .ok_or_else(|| LoadError::malformed(format!("STL vertex index {vi} out of range")))?;
            *corner = Vec3::new(v[0], v[1], v[2]);
        }
        triangles.push(corners);
    }

    let geometry = MeshData::flat_shaded(&triangles);
    check_geometry(&geometry, "STL")?;
    let bounds = Aabb::from_mesh(&geometry);

    tracing::debug!("Parsed STL: {} triangles", geometry.triangle_count());

    Ok(SceneDocument {
        id: DocumentId::new(),
        format: ModelFormat::Stl,
        kind: DocumentKind::Stl(StlMesh {
            geometry: Arc::new(geometry),
            bounds,
        }),
    })
}

// ── glTF / GLB ───────────────────────────────────────────────

pub fn is_glb(bytes: &[u8]) -> bool {
    bytes.starts_with(GLB_MAGIC)
}

pub fn parse_gltf(bytes: &[u8]) -> Result<SceneDocument, LoadError> {
    let format = if is_glb(bytes) {
        ModelFormat::Glb
    } else {
        ModelFormat::Gltf
    };

    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| LoadError::malformed(format!("glTF: {e}")))?;
    let buffers = resolve_buffers(&gltf)?;

    let materials = gltf
        .materials()
        .map(|m| {
            let pbr = m.pbr_metallic_roughness();
            MaterialDef {
                name: m.name().map(str::to_string),
                base_color: pbr.base_color_factor(),
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                double_sided: m.double_sided(),
            }
        })
        .collect::<Vec<_>>();

    let mut meshes = Vec::new();
    for mesh in gltf.meshes() {
        let mut primitives = Vec::new();
        for prim in mesh.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    "Skipping {:?} primitive {} of mesh {}",
                    prim.mode(),
                    prim.index(),
                    mesh.index()
                );
                continue;
            }
            primitives.push(read_primitive(&mesh, &prim, &buffers)?);
        }
        meshes.push(MeshDef {
            name: mesh.name().map(str::to_string),
            primitives,
        });
    }

    let nodes = gltf
        .nodes()
        .map(|n| NodeDef {
            name: n.name().map(str::to_string),
            transform: Mat4::from_cols_array_2d(&n.transform().matrix()),
            children: n.children().map(|c| c.index()).collect(),
            mesh: n.mesh().map(|m| m.index()),
        })
        .collect::<Vec<_>>();

    let roots = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => orphan_nodes(&nodes),
    };

    let scene = GltfScene {
        materials,
        meshes,
        nodes,
        roots,
    };
    check_acyclic(&scene)?;

    let doc = SceneDocument {
        id: DocumentId::new(),
        format,
        kind: DocumentKind::Gltf(scene),
    };
    let drawable = doc.drawable_primitive_count();
    if drawable == 0 {
        return Err(LoadError::malformed("document contains no drawable meshes"));
    }

    tracing::debug!("Parsed {}: {drawable} primitive instance(s)", format.label());
    Ok(doc)
}

/// Buffer bytes by index. Only embedded data is accepted.
fn resolve_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>, LoadError> {
    let mut out = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| LoadError::malformed("GLB is missing its BIN chunk"))?,
            gltf::buffer::Source::Uri(uri) => decode_data_uri(uri)?,
        };
        if data.len() < buffer.length() {
            return Err(LoadError::malformed(format!(
                "buffer {} holds {} bytes, {} declared",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        out.push(data);
    }
    Ok(out)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, LoadError> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Err(LoadError::malformed(format!(
            "external buffer '{uri}' is not supported"
        )));
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LoadError::malformed("invalid data URI"))?;
    if !header.ends_with(";base64") {
        return Err(LoadError::malformed("data URI is not base64"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| LoadError::malformed(format!("data URI: {e}")))
}

/// The accessor's bytes must lie inside its view, and the view inside its buffer
fn check_accessor(accessor: &gltf::Accessor, buffers: &[Vec<u8>]) -> Result<(), LoadError> {
    if accessor.sparse().is_some() {
        return Err(LoadError::malformed("sparse accessors are not supported"));
    }
    let view = accessor.view().ok_or_else(|| {
        LoadError::malformed(format!("accessor {} has no buffer view", accessor.index()))
    })?;
    let data = buffers
        .get(view.buffer().index())
        .ok_or_else(|| LoadError::malformed(format!("view {} has no buffer", view.index())))?;
    let view_end = view.offset().checked_add(view.length());
    if view_end.map_or(true, |end| end > data.len()) {
        return Err(LoadError::malformed(format!(
            "view {} exceeds its buffer",
            view.index()
        )));
    }
    let stride = view.stride().unwrap_or(accessor.size());
    let needed = match accessor.count() {
        0 => Some(0),
        n => stride
            .checked_mul(n - 1)
            .and_then(|span| span.checked_add(accessor.offset()))
            .and_then(|span| span.checked_add(accessor.size())),
    };
    if needed.map_or(true, |needed| needed > view.length()) {
        return Err(LoadError::malformed(format!(
            "accessor {} exceeds its view",
            accessor.index()
        )));
    }
    Ok(())
}

fn read_primitive(
    mesh: &gltf::Mesh,
    prim: &gltf::Primitive,
    buffers: &[Vec<u8>],
) -> Result<PrimitiveDef, LoadError> {
    let label = mesh.name().map(str::to_string).unwrap_or_else(|| format!("mesh {}", mesh.index()));

    let pos_accessor = prim
        .get(&gltf::Semantic::Positions)
        .ok_or_else(|| LoadError::malformed(format!("{label}: primitive has no positions")))?;
    check_accessor(&pos_accessor, buffers)?;
    if let Some(n) = prim.get(&gltf::Semantic::Normals) {
        check_accessor(&n, buffers)?;
    }
    if let Some(i) = prim.indices() {
        check_accessor(&i, buffers)?;
    }

    let reader = prim.reader(|b| buffers.get(b.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| LoadError::malformed(format!("{label}: unreadable positions")))?
        .collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(Iterator::collect);
    let indices: Vec<u32> = match reader.read_indices() {
        Some(idx) => idx.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normals = match normals {
        Some(n) if n.len() == positions.len() => n,
        Some(_) => {
            return Err(LoadError::malformed(format!(
                "{label}: normal count does not match position count"
            )))
        }
        None => smooth_normals(&positions, &indices),
    };

    let geometry = MeshData::from_streams(&positions, Some(&normals), indices);
    check_geometry(&geometry, &label)?;

    Ok(PrimitiveDef {
        geometry: Arc::new(geometry),
        material: prim.material().index(),
    })
}

/// Area-weighted vertex normals for primitives that ship without them
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let n = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

fn check_geometry(geometry: &MeshData, label: &str) -> Result<(), LoadError> {
    match MeshValidator::new(geometry).validate_all().into_iter().next() {
        Some(err) => Err(LoadError::malformed(format!("{label}: {err}"))),
        None => Ok(()),
    }
}

/// Nodes nobody lists as a child
fn orphan_nodes(nodes: &[NodeDef]) -> Vec<usize> {
    let children: HashSet<usize> = nodes.iter().flat_map(|n| n.children.iter().copied()).collect();
    (0..nodes.len()).filter(|i| !children.contains(i)).collect()
}

fn check_acyclic(scene: &GltfScene) -> Result<(), LoadError> {
    fn walk(scene: &GltfScene, idx: usize, path: &mut Vec<usize>) -> Result<(), LoadError> {
        if path.contains(&idx) {
            return Err(LoadError::malformed(format!("cyclic node graph at node {idx}")));
        }
        let node = scene
            .nodes
            .get(idx)
            .ok_or_else(|| LoadError::malformed(format!("node {idx} does not exist")))?;
        path.push(idx);
        for &child in &node.children {
            walk(scene, child, path)?;
        }
        path.pop();
        Ok(())
    }

    let mut path = Vec::new();
    for &root in &scene.roots {
        walk(scene, root, &mut path)?;
    }
    Ok(())
}

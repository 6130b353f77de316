//! In-memory model files for tests and the headless harness.
//!
//! GLB/glTF fixtures are assembled by a small glTF writer; STL fixtures are
//! written directly in the binary or ASCII framing.

use base64::Engine as _;
use glam::Vec3;
use serde_json::{json, Value};

use crate::viewport::mesh::{cube, MeshData};

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
/// GLB version 2
const GLB_VERSION: u32 = 2;
/// JSON chunk type
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// BIN chunk type
const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// glTF component types
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// glTF buffer view targets
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// glTF primitive mode for line lists
const MODE_LINES: u32 = 1;

/// Base color shared by both meshes of [`two_mesh_glb`]
pub const SHARED_BASE_COLOR: [f32; 4] = [0.2, 0.6, 0.9, 1.0];
/// X positions of the two cubes in [`two_mesh_glb`]
pub const TWO_MESH_LEFT_X: f32 = -1.5;
pub const TWO_MESH_RIGHT_X: f32 = 1.5;

// ── glTF writer ─────────────────────────────────────────────────

#[derive(Default)]
struct GltfBuilder {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    nodes: Vec<Value>,
    roots: Vec<usize>,
    materials: Vec<Value>,
}

impl GltfBuilder {
    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        // Pad to 4-byte alignment
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
            "target": target
        }));
        self.views.len() - 1
    }

    fn push_accessor(&mut self, accessor: Value) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// Positions + normals + u32 indices
    fn primitive(&mut self, mesh: &MeshData, material: Option<usize>) -> Value {
        let mut positions = Vec::with_capacity(mesh.vertex_count() * 3);
        let mut normals = Vec::with_capacity(mesh.vertex_count() * 3);
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            positions.extend_from_slice(&p.to_array());
            normals.extend_from_slice(&mesh.normal(i).to_array());
            min = min.min(p);
            max = max.max(p);
        }

        let pos_view = self.push_view(&floats_to_bytes(&positions), ARRAY_BUFFER);
        let norm_view = self.push_view(&floats_to_bytes(&normals), ARRAY_BUFFER);
        let idx_view = self.push_view(&u32s_to_bytes(&mesh.indices), ELEMENT_ARRAY_BUFFER);

        let pos = self.push_accessor(json!({
            "bufferView": pos_view,
            "componentType": FLOAT,
            "count": mesh.vertex_count(),
            "type": "VEC3",
            "min": min.to_array(),
            "max": max.to_array()
        }));
        let norm = self.push_accessor(json!({
            "bufferView": norm_view,
            "componentType": FLOAT,
            "count": mesh.vertex_count(),
            "type": "VEC3"
        }));
        let idx = self.push_accessor(json!({
            "bufferView": idx_view,
            "componentType": UNSIGNED_INT,
            "count": mesh.indices.len(),
            "type": "SCALAR"
        }));

        let mut prim = json!({
            "attributes": { "POSITION": pos, "NORMAL": norm },
            "indices": idx
        });
        if let Some(m) = material {
            prim["material"] = json!(m);
        }
        prim
    }

    fn add_mesh(&mut self, name: &str, primitives: Vec<Value>) -> usize {
        self.meshes.push(json!({ "name": name, "primitives": primitives }));
        self.meshes.len() - 1
    }

    fn add_node(&mut self, node: Value) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn add_material(&mut self, name: &str, color: [f32; 4]) -> usize {
        self.materials.push(json!({
            "name": name,
            "pbrMetallicRoughness": {
                "baseColorFactor": color,
                "metallicFactor": 0.3,
                "roughnessFactor": 0.5
            }
        }));
        self.materials.len() - 1
    }

    fn document(&self, buffer: Value) -> Value {
        let mut doc = json!({
            "asset": { "version": "2.0", "generator": "mesh-viewer fixtures" },
            "scene": 0,
            "scenes": [{ "name": "Scene", "nodes": self.roots }],
            "nodes": self.nodes,
            "meshes": self.meshes,
            "accessors": self.accessors,
            "bufferViews": self.views,
            "buffers": [buffer]
        });
        if !self.materials.is_empty() {
            doc["materials"] = json!(self.materials);
        }
        doc
    }

    fn to_glb(&self) -> Vec<u8> {
        let json_str = serde_json::to_string(&self.document(json!({ "byteLength": self.bin.len() })))
            .unwrap_or_default();
        let mut json_bytes = json_str.into_bytes();

        // Pad JSON to 4-byte alignment with spaces (GLB chunk rule)
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(b' ');
        }

        let json_chunk_length = json_bytes.len() as u32;
        let bin_chunk_length = self.bin.len() as u32;
        let total_length: u32 = 12 // header
            + 8 + json_chunk_length  // JSON chunk header + data
            + 8 + bin_chunk_length; // BIN chunk header + data

        let mut glb = Vec::with_capacity(total_length as usize);
        glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
        glb.extend_from_slice(&total_length.to_le_bytes());

        glb.extend_from_slice(&json_chunk_length.to_le_bytes());
        glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
        glb.extend_from_slice(&json_bytes);

        glb.extend_from_slice(&bin_chunk_length.to_le_bytes());
        glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
        glb.extend_from_slice(&self.bin);

        glb
    }

    fn to_embedded_gltf(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bin);
        let doc = self.document(json!({
            "uri": format!("data:application/octet-stream;base64,{payload}"),
            "byteLength": self.bin.len()
        }));
        serde_json::to_string_pretty(&doc).unwrap_or_default()
    }
}

fn floats_to_bytes(data: &[f32]) -> Vec<u8> {
    data.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn u32s_to_bytes(data: &[u32]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// ── glTF / GLB fixtures ─────────────────────────────────────────

/// Two unit cubes at x = -1.5 and x = +1.5 sharing one material.
pub fn two_mesh_glb() -> Vec<u8> {
    let mut b = GltfBuilder::default();
    let mat = b.add_material("Shared", SHARED_BASE_COLOR);
    let cube_mesh = cube(1.0, 1.0, 1.0);

    let left_prim = b.primitive(&cube_mesh, Some(mat));
    let left = b.add_mesh("Left", vec![left_prim]);
    let right_prim = b.primitive(&cube_mesh, Some(mat));
    let right = b.add_mesh("Right", vec![right_prim]);

    let n0 = b.add_node(json!({ "name": "Left", "mesh": left, "translation": [TWO_MESH_LEFT_X, 0.0, 0.0] }));
    let n1 = b.add_node(json!({ "name": "Right", "mesh": right, "translation": [TWO_MESH_RIGHT_X, 0.0, 0.0] }));
    b.roots = vec![n0, n1];
    b.to_glb()
}

/// One cube, buffer embedded as a base64 data URI.
pub fn embedded_gltf() -> String {
    let mut b = GltfBuilder::default();
    let mat = b.add_material("Red", [0.8, 0.1, 0.1, 1.0]);
    let prim = b.primitive(&cube(1.0, 1.0, 1.0), Some(mat));
    let mesh = b.add_mesh("Cube", vec![prim]);
    let node = b.add_node(json!({ "name": "Cube", "mesh": mesh }));
    b.roots = vec![node];
    b.to_embedded_gltf()
}

/// Parent at x=1 with a child cube at x=2 relative to it.
pub fn nested_glb() -> Vec<u8> {
    let mut b = GltfBuilder::default();
    let prim = b.primitive(&cube(1.0, 1.0, 1.0), None);
    let mesh = b.add_mesh("Child", vec![prim]);
    b.add_node(json!({ "name": "Parent", "children": [1], "translation": [1.0, 0.0, 0.0] }));
    b.add_node(json!({ "name": "Child", "mesh": mesh, "translation": [2.0, 0.0, 0.0] }));
    b.roots = vec![0];
    b.to_glb()
}

/// One mesh with two primitives, instanced by two nodes: four drawables.
pub fn instanced_glb() -> Vec<u8> {
    let mut b = GltfBuilder::default();
    let mat = b.add_material("Body", [0.5, 0.5, 0.5, 1.0]);
    let p0 = b.primitive(&cube(1.0, 1.0, 1.0), Some(mat));
    let p1 = b.primitive(&cube(0.5, 2.0, 0.5), None);
    let mesh = b.add_mesh("Pair", vec![p0, p1]);
    let a = b.add_node(json!({ "mesh": mesh, "translation": [-2.0, 0.0, 0.0] }));
    let c = b.add_node(json!({ "mesh": mesh, "translation": [2.0, 0.0, 0.0] }));
    b.roots = vec![a, c];
    b.to_glb()
}

/// Triangle whose index buffer points past the vertex list.
pub fn bad_index_glb() -> Vec<u8> {
    let mut b = GltfBuilder::default();
    let tri = MeshData::from_streams(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        Some(&[[0.0, 0.0, 1.0]; 3]),
        vec![0, 1, 7],
    );
    let prim = b.primitive(&tri, None);
    let mesh = b.add_mesh("Broken", vec![prim]);
    let node = b.add_node(json!({ "mesh": mesh }));
    b.roots = vec![node];
    b.to_glb()
}

/// Buffer references a sidecar `.bin` file.
pub fn external_buffer_gltf() -> String {
    let mut b = GltfBuilder::default();
    let prim = b.primitive(&cube(1.0, 1.0, 1.0), None);
    let mesh = b.add_mesh("Cube", vec![prim]);
    let node = b.add_node(json!({ "mesh": mesh }));
    b.roots = vec![node];
    let doc = b.document(json!({ "uri": "model.bin", "byteLength": b.bin.len() }));
    serde_json::to_string(&doc).unwrap_or_default()
}

/// Node 0 and node 1 list each other as children.
pub fn cyclic_gltf() -> String {
    let mut b = GltfBuilder::default();
    let prim = b.primitive(&cube(1.0, 1.0, 1.0), None);
    let mesh = b.add_mesh("Loop", vec![prim]);
    b.add_node(json!({ "name": "A", "children": [1] }));
    b.add_node(json!({ "name": "B", "children": [0], "mesh": mesh }));
    b.roots = vec![0];
    b.to_embedded_gltf()
}

/// Embedded cube whose position accessor claims 2^62 elements.
pub fn oversized_accessor_gltf() -> String {
    let mut b = GltfBuilder::default();
    let prim = b.primitive(&cube(1.0, 1.0, 1.0), None);
    let mesh = b.add_mesh("Huge", vec![prim]);
    let node = b.add_node(json!({ "mesh": mesh }));
    b.roots = vec![node];
    b.accessors[0]["count"] = json!(1u64 << 62);
    b.to_embedded_gltf()
}

/// One mesh with a triangle primitive and a LINES primitive.
pub fn mixed_modes_glb() -> Vec<u8> {
    let mut b = GltfBuilder::default();
    let solid = b.primitive(&cube(1.0, 1.0, 1.0), None);
    let mut outline = b.primitive(&cube(1.0, 1.0, 1.0), None);
    outline["mode"] = json!(MODE_LINES);
    let mesh = b.add_mesh("Outlined", vec![solid, outline]);
    let node = b.add_node(json!({ "mesh": mesh }));
    b.roots = vec![node];
    b.to_glb()
}

/// Only a LINES primitive, nothing to draw as a surface.
pub fn lines_only_glb() -> Vec<u8> {
    let mut b = GltfBuilder::default();
    let mut outline = b.primitive(&cube(1.0, 1.0, 1.0), None);
    outline["mode"] = json!(MODE_LINES);
    let mesh = b.add_mesh("Wire", vec![outline]);
    let node = b.add_node(json!({ "mesh": mesh }));
    b.roots = vec![node];
    b.to_glb()
}

// ── STL fixtures ────────────────────────────────────────────────

/// Triangles of a 2x2x2 cube centered on `center`.
pub fn offset_cube_triangles(center: Vec3) -> Vec<[Vec3; 3]> {
    let mesh = cube(2.0, 2.0, 2.0);
    (0..mesh.triangle_count())
        .map(|t| mesh.triangle(t).map(|v| v + center))
        .collect()
}

/// Binary STL. The header deliberately does not start with "solid".
pub fn binary_stl(triangles: &[[Vec3; 3]]) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    let header = b"binary stl fixture";
    out[..header.len()].copy_from_slice(header);
    out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for tri in triangles {
        let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
        for v in std::iter::once(n).chain(tri.iter().copied()) {
            for c in v.to_array() {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

/// ASCII STL: a single triangle
pub fn ascii_stl() -> String {
    "solid fixture\n\
     facet normal 0 0 1\n\
     outer loop\n\
     vertex 0 0 0\n\
     vertex 1 0 0\n\
     vertex 0 1 0\n\
     endloop\n\
     endfacet\n\
     endsolid fixture\n"
        .to_string()
}

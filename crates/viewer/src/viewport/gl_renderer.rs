use std::sync::Arc;

use glow::HasContext;
use mesh_viewer_lib::document::DocumentId;
use mesh_viewer_lib::normalize::{MeshSet, Rgba};
use mesh_viewer_lib::state::settings::GridSettings;
use shared::EnvironmentPreset;

use super::mesh::{self, LineMeshData, MeshData, VERTEX_STRIDE};

/// Placeholder box color (#666)
const PLACEHOLDER_COLOR: Rgba = [0.4, 0.4, 0.4, 1.0];
const AMBIENT_INTENSITY: f32 = 0.4;
const LIGHT_POSITION: glam::Vec3 = glam::Vec3::new(10.0, 10.0, 5.0);
const LIGHT_INTENSITY: f32 = 1.0;

// ── Environment ──────────────────────────────────────────────

/// How a preset looks: clear color and ambient light tint
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentLook {
    pub background: [f32; 3],
    pub ambient_tint: [f32; 3],
}

pub fn environment_look(preset: EnvironmentPreset) -> EnvironmentLook {
    let (background, ambient_tint) = match preset {
        EnvironmentPreset::Sunset => ([0.23, 0.15, 0.16], [1.0, 0.85, 0.7]),
        EnvironmentPreset::Dawn => ([0.20, 0.18, 0.24], [0.95, 0.85, 0.9]),
        EnvironmentPreset::Night => ([0.05, 0.06, 0.10], [0.55, 0.6, 0.85]),
        EnvironmentPreset::Warehouse => ([0.17, 0.16, 0.15], [1.0, 0.95, 0.85]),
        EnvironmentPreset::Forest => ([0.11, 0.16, 0.12], [0.8, 1.0, 0.8]),
        EnvironmentPreset::Apartment => ([0.21, 0.19, 0.17], [1.0, 0.92, 0.82]),
        EnvironmentPreset::Studio => ([0.16, 0.16, 0.17], [1.0, 1.0, 1.0]),
        EnvironmentPreset::City => ([0.14, 0.16, 0.19], [0.9, 0.95, 1.0]),
        EnvironmentPreset::Park => ([0.15, 0.19, 0.22], [0.9, 1.0, 0.9]),
        EnvironmentPreset::Lobby => ([0.19, 0.17, 0.15], [1.0, 0.93, 0.86]),
    };
    EnvironmentLook {
        background,
        ambient_tint,
    }
}

// ── Frame snapshot ───────────────────────────────────────────

/// Per-draw uniforms
#[derive(Clone, Copy, Debug)]
pub struct MeshStyle {
    pub color: Rgba,
    pub wireframe: bool,
    pub double_sided: bool,
    /// Plane equation (a, b, c, d); fragments with a·x + b·y + c·z + d > 0 are dropped
    pub clip: Option<[f32; 4]>,
}

const PLACEHOLDER_STYLE: MeshStyle = MeshStyle {
    color: PLACEHOLDER_COLOR,
    wireframe: true,
    double_sided: true,
    clip: None,
};

/// One record as the GPU needs it
pub struct DrawItem {
    pub geometry: Arc<MeshData>,
    pub style: MeshStyle,
}

/// Everything the paint callback reads, captured on the UI thread
pub struct FrameScene {
    pub document: Option<DocumentId>,
    pub items: Vec<DrawItem>,
}

impl FrameScene {
    pub fn capture(meshes: &MeshSet) -> Self {
        let items = meshes
            .iter()
            .map(|r| DrawItem {
                geometry: r.geometry.clone(),
                style: MeshStyle {
                    color: r.material.color(),
                    wireframe: r.material.wireframe(),
                    double_sided: r.material.double_sided,
                    clip: r.material.clip_planes().first().map(|p| p.equation()),
                },
            })
            .collect();
        Self {
            document: meshes.document(),
            items,
        }
    }
}

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub view_proj: glam::Mat4,
    pub environment: EnvironmentPreset,
    pub grid_visible: bool,
    /// Draw the loading placeholder box
    pub placeholder: bool,
}

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    grid: Option<GpuLines>,
    /// Cached grid settings to detect changes
    cached_grid_settings: Option<(i32, f32, f32)>,
    placeholder: GpuMesh,
    /// One entry per record, same order as the mesh set
    scene_meshes: Vec<GpuMesh>,
    /// Document the uploaded meshes belong to
    synced_document: Option<DocumentId>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG)?;
        let placeholder = upload_mesh(gl, &mesh::cube(1.0, 1.0, 1.0))?;

        Ok(Self {
            mesh_program,
            line_program,
            grid: None,
            cached_grid_settings: None,
            placeholder,
            scene_meshes: Vec::new(),
            synced_document: None,
        })
    }

    /// Update grid mesh based on settings
    pub fn update_grid(&mut self, gl: &glow::Context, settings: &GridSettings) {
        let new_settings = (settings.range, settings.size, settings.opacity);
        if self.cached_grid_settings == Some(new_settings) {
            return;
        }

        if let Some(old) = self.grid.take() {
            delete_lines(gl, &old);
        }

        let grid_data = mesh::grid(settings.range, settings.size, settings.opacity);
        match upload_lines(gl, &grid_data) {
            Ok(lines) => self.grid = Some(lines),
            Err(e) => tracing::error!("Grid upload failed: {e}"),
        }
        self.cached_grid_settings = Some(new_settings);
    }

    /// Re-upload geometry when the displayed document changes.
    /// Display-only changes (color, wireframe, clip) are uniforms and need no upload.
    pub fn sync(&mut self, gl: &glow::Context, scene: &FrameScene) {
        if scene.document == self.synced_document && self.scene_meshes.len() == scene.items.len() {
            return;
        }
        for old in self.scene_meshes.drain(..) {
            delete_mesh(gl, &old);
        }
        for item in &scene.items {
            match upload_mesh(gl, &item.geometry) {
                Ok(m) => self.scene_meshes.push(m),
                Err(e) => {
                    tracing::error!("Mesh upload failed: {e}");
                    break;
                }
            }
        }
        self.synced_document = scene.document;
    }

    /// Render the scene
    pub fn paint(&self, gl: &glow::Context, scene: &FrameScene, params: &RenderParams) {
        let look = environment_look(params.environment);
        let ambient = glam::Vec3::from(look.ambient_tint) * AMBIENT_INTENSITY;
        let light_dir = LIGHT_POSITION.normalize();
        let [x, y, w, h] = params.viewport.map(|v| v as i32);

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(look.background[0], look.background[1], look.background[2], 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

            // Grid
            gl.use_program(Some(self.line_program));
            set_uniform_mat4(gl, self.line_program, "u_mvp", &params.view_proj);
            if params.grid_visible {
                if let Some(ref grid) = self.grid {
                    draw_lines(gl, grid);
                }
            }

            // Model
            gl.use_program(Some(self.mesh_program));
            set_uniform_mat4(gl, self.mesh_program, "u_mvp", &params.view_proj);
            set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &light_dir);
            set_uniform_vec3(gl, self.mesh_program, "u_ambient", &ambient);
            set_uniform_f32(gl, self.mesh_program, "u_light_intensity", LIGHT_INTENSITY);

            for (item, mesh) in scene.items.iter().zip(&self.scene_meshes) {
                self.draw_styled(gl, mesh, &item.style);
            }

            if params.placeholder {
                self.draw_styled(gl, &self.placeholder, &PLACEHOLDER_STYLE);
            }

            gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
            gl.disable(glow::CULL_FACE);
            gl.disable(glow::BLEND);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    unsafe fn draw_styled(&self, gl: &glow::Context, mesh: &GpuMesh, item: &MeshStyle) {
        let program = self.mesh_program;
        let c = item.color;
        let loc = gl.get_uniform_location(program, "u_color");
        gl.uniform_4_f32(loc.as_ref(), c[0], c[1], c[2], c[3]);

        let plane = item.clip.unwrap_or([0.0; 4]);
        let loc = gl.get_uniform_location(program, "u_clip_plane");
        gl.uniform_4_f32(loc.as_ref(), plane[0], plane[1], plane[2], plane[3]);
        let loc = gl.get_uniform_location(program, "u_clip_enabled");
        gl.uniform_1_i32(loc.as_ref(), item.clip.is_some() as i32);

        if item.double_sided || item.clip.is_some() {
            gl.disable(glow::CULL_FACE);
        } else {
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
        }
        let mode = if item.wireframe { glow::LINE } else { glow::FILL };
        gl.polygon_mode(glow::FRONT_AND_BACK, mode);

        draw_mesh(gl, mesh);
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.line_program);
        }
        if let Some(grid) = self.grid.take() {
            delete_lines(gl, &grid);
        }
        delete_mesh(gl, &self.placeholder);
        for mesh in self.scene_meshes.drain(..) {
            delete_mesh(gl, &mesh);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (VERTEX_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck_cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn upload_lines(gl: &glow::Context, data: &LineMeshData) -> Result<GpuLines, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 7 * 4; // 7 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // color: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        Ok(GpuLines {
            vao,
            vbo,
            vertex_count: (data.vertices.len() / 7) as i32,
        })
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

fn delete_lines(gl: &glow::Context, lines: &GpuLines) {
    unsafe {
        gl.delete_vertex_array(lines.vao);
        gl.delete_buffer(lines.vbo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_shader(gl: &glow::Context, kind: u32, src: &str) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl.create_shader(kind)?;
        gl.shader_source(shader, src);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            tracing::error!("Shader compile error: {log}");
            return Err(log);
        }
        Ok(shader)
    }
}

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let vert = compile_shader(gl, glow::VERTEX_SHADER, vert_src)?;
        let frag = compile_shader(gl, glow::FRAGMENT_SHADER, frag_src)?;

        let program = gl.create_program()?;
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            tracing::error!("Program link error: {log}");
            return Err(log);
        }
        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

out vec3 v_world;
out vec3 v_normal;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_world = a_position;
    v_normal = a_normal;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec4 u_color;
uniform vec3 u_light_dir;
uniform vec3 u_ambient;
uniform float u_light_intensity;
uniform vec4 u_clip_plane;
uniform int u_clip_enabled;

in vec3 v_world;
in vec3 v_normal;

out vec4 frag_color;

void main() {
    if (u_clip_enabled != 0 && dot(u_clip_plane.xyz, v_world) + u_clip_plane.w > 0.0) {
        discard;
    }
    vec3 n = normalize(v_normal);
    if (!gl_FrontFacing) {
        n = -n;
    }
    float diffuse = max(dot(n, u_light_dir), 0.0) * u_light_intensity;
    vec3 light = u_ambient + vec3(diffuse);
    frag_color = vec4(u_color.rgb * light, u_color.a);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_has_a_distinct_background() {
        let mut seen: Vec<[f32; 3]> = Vec::new();
        for preset in EnvironmentPreset::all() {
            let look = environment_look(*preset);
            assert!(!seen.contains(&look.background), "{preset:?}");
            seen.push(look.background);
        }
    }
}

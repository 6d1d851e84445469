/// WebGL2 renderer bound to a canvas element
use texcube_core::{
    drawing_buffer_size, Color, Error, Mesh, PerspectiveCamera, Renderer, Result, Scene, Texture,
};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
uniform mat4 u_mvp;
out vec2 v_uv;
void main() {
    // Image rows are uploaded top first; flip v so uv (0, 1) hits the top
    v_uv = vec2(a_uv.x, 1.0 - a_uv.y);
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec2 v_uv;
uniform sampler2D u_map;
uniform bool u_has_map;
uniform vec3 u_color;
out vec4 frag_color;
void main() {
    vec3 texel = u_has_map ? texture(u_map, v_uv).rgb : vec3(1.0);
    frag_color = vec4(u_color * texel, 1.0);
}
"#;

/// GPU-side copy of the mesh, created on first draw
struct MeshBuffers {
    vao: WebGlVertexArrayObject,
    _vertices: WebGlBuffer,
    vertex_count: i32,
}

struct UploadedTexture {
    texture: WebGlTexture,
    generation: u64,
    ready: bool,
}

pub struct WebGlRenderer {
    canvas: HtmlCanvasElement,
    gl: Gl,
    program: WebGlProgram,
    u_mvp: Option<WebGlUniformLocation>,
    u_map: Option<WebGlUniformLocation>,
    u_has_map: Option<WebGlUniformLocation>,
    u_color: Option<WebGlUniformLocation>,
    pixel_ratio: f64,
    mesh: Option<MeshBuffers>,
    texture: Option<UploadedTexture>,
}

impl WebGlRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let gl: Gl = canvas
            .get_context("webgl2")
            .map_err(|err| Error::Render(format!("getContext failed: {err:?}")))?
            .ok_or_else(|| Error::Render("WebGL2 is not available".to_string()))?
            .dyn_into()
            .map_err(|_| Error::Render("context is not WebGL2".to_string()))?;

        let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;

        gl.enable(Gl::DEPTH_TEST);
        gl.enable(Gl::CULL_FACE);
        gl.cull_face(Gl::BACK);

        Ok(Self {
            u_mvp: gl.get_uniform_location(&program, "u_mvp"),
            u_map: gl.get_uniform_location(&program, "u_map"),
            u_has_map: gl.get_uniform_location(&program, "u_has_map"),
            u_color: gl.get_uniform_location(&program, "u_color"),
            canvas,
            gl,
            program,
            pixel_ratio: 1.0,
            mesh: None,
            texture: None,
        })
    }

    fn upload_mesh(&self, mesh: &Mesh) -> Result<MeshBuffers> {
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| Error::Render("could not create vertex array".to_string()))?;
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| Error::Render("could not create vertex buffer".to_string()))?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        let data = js_sys::Float32Array::from(mesh.geometry.interleaved_position_uv().as_slice());
        gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &data, Gl::STATIC_DRAW);

        let stride = 5 * std::mem::size_of::<f32>() as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 2, Gl::FLOAT, false, stride, 3 * 4);
        gl.bind_vertex_array(None);

        Ok(MeshBuffers {
            vao,
            _vertices: buffer,
            vertex_count: mesh.geometry.vertex_count() as i32,
        })
    }

    /// Upload the map when its slot changed since the last upload. Returns
    /// whether a usable texture is bound.
    fn sync_texture(&mut self, map: &Texture) -> Result<bool> {
        let generation = map.generation();
        if let Some(uploaded) = &self.texture {
            if uploaded.generation == generation {
                return Ok(uploaded.ready);
            }
        }

        let Some(image) = map.image() else {
            self.texture = self.texture.take().map(|uploaded| UploadedTexture {
                generation,
                ready: false,
                ..uploaded
            });
            return Ok(false);
        };

        let gl = &self.gl;
        let texture = match self.texture.take() {
            Some(uploaded) => uploaded.texture,
            None => gl
                .create_texture()
                .ok_or_else(|| Error::Render("could not create texture".to_string()))?,
        };
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA as i32,
            image.width() as i32,
            image.height() as i32,
            0,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            Some(image.pixels()),
        )
        .map_err(|err| Error::Render(format!("texImage2D failed: {err:?}")))?;
        gl.generate_mipmap(Gl::TEXTURE_2D);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::LINEAR_MIPMAP_LINEAR as i32);
        gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::LINEAR as i32);

        self.texture = Some(UploadedTexture {
            texture,
            generation,
            ready: true,
        });
        Ok(true)
    }

    fn clear(&self, background: Color) {
        self.gl.clear_color(background.r, background.g, background.b, 1.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }
}

impl Renderer for WebGlRenderer {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    /// Resizes the drawing buffer and pins the CSS size so the canvas does
    /// not grow with the pixel ratio
    fn set_size(&mut self, width: u32, height: u32) {
        let (buffer_width, buffer_height) = drawing_buffer_size(width, height, self.pixel_ratio);
        self.canvas.set_width(buffer_width);
        self.canvas.set_height(buffer_height);

        let style = self.canvas.style();
        let pinned = style
            .set_property("width", &format!("{width}px"))
            .and_then(|_| style.set_property("height", &format!("{height}px")));
        if let Err(err) = pinned {
            tracing::warn!(?err, "could not set canvas CSS size");
        }

        self.gl.viewport(0, 0, buffer_width as i32, buffer_height as i32);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        if self.gl.is_context_lost() {
            return Err(Error::Render("WebGL context lost".to_string()));
        }

        self.clear(scene.background.unwrap_or(Color::BLACK));
        let Some(mesh) = scene.mesh() else {
            return Ok(());
        };

        if self.mesh.is_none() {
            self.mesh = Some(self.upload_mesh(mesh)?);
        }
        let has_map = match &mesh.material.map {
            Some(map) => self.sync_texture(map)?,
            None => false,
        };

        let gl = &self.gl;
        gl.use_program(Some(&self.program));

        let mvp = camera.view_projection() * mesh.model_matrix();
        gl.uniform_matrix4fv_with_f32_array(self.u_mvp.as_ref(), false, mvp.as_slice());
        let color = mesh.material.color;
        gl.uniform3f(self.u_color.as_ref(), color.r, color.g, color.b);
        gl.uniform1i(self.u_has_map.as_ref(), has_map as i32);
        gl.uniform1i(self.u_map.as_ref(), 0);
        if has_map {
            gl.active_texture(Gl::TEXTURE0);
            gl.bind_texture(Gl::TEXTURE_2D, self.texture.as_ref().map(|t| &t.texture));
        }

        if let Some(buffers) = &self.mesh {
            gl.bind_vertex_array(Some(&buffers.vao));
            gl.draw_arrays(Gl::TRIANGLES, 0, buffers.vertex_count);
            gl.bind_vertex_array(None);
        }
        Ok(())
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Render("could not create shader".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        Err(Error::Render(format!("shader compilation failed: {log}")))
    }
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Render("could not create program".to_string()))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        Err(Error::Render(format!("program link failed: {log}")))
    }
}

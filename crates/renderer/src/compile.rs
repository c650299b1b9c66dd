use std::borrow::Cow;

use anyhow::{anyhow, Result};
use iris::IRIS_GLSL;
use wgpu::naga::ShaderStage;

/// The shader programs that make up one iris scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SceneShader {
    LensVertex,
    LensFragment,
    RingVertex,
    RingFragment,
    MarkerVertex,
    MarkerFragment,
}

impl SceneShader {
    fn label(self) -> &'static str {
        match self {
            Self::LensVertex => "lens vertex",
            Self::LensFragment => "lens fragment",
            Self::RingVertex => "ring vertex",
            Self::RingFragment => "ring fragment",
            Self::MarkerVertex => "marker vertex",
            Self::MarkerFragment => "marker fragment",
        }
    }

    fn stage(self) -> ShaderStage {
        match self {
            Self::LensVertex | Self::RingVertex | Self::MarkerVertex => ShaderStage::Vertex,
            Self::LensFragment | Self::RingFragment | Self::MarkerFragment => ShaderStage::Fragment,
        }
    }

    /// Complete GLSL 450 source: version line, shared uniform block, body.
    pub(crate) fn source(self) -> String {
        let body = match self {
            Self::LensVertex => LENS_VERTEX,
            Self::LensFragment => return wrap_lens_fragment(IRIS_GLSL),
            Self::RingVertex => RING_VERTEX,
            Self::RingFragment => RING_FRAGMENT,
            Self::MarkerVertex => MARKER_VERTEX,
            Self::MarkerFragment => MARKER_FRAGMENT,
        };
        format!("{HEADER}{body}")
    }
}

/// Compiles one scene shader through naga's GLSL frontend.
///
/// Validation errors are captured in an error scope and returned instead of
/// reaching the device's uncaptured-error handler.
pub(crate) fn compile_shader(
    device: &wgpu::Device,
    shader: SceneShader,
) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader.label()),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(shader.source()),
            stage: shader.stage(),
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(anyhow!("failed to compile {}: {err}", shader.label()));
    }
    tracing::trace!(shader = shader.label(), "compiled shader module");
    Ok(module)
}

/// Places the iris colour function between the lens prologue and a `main`
/// that premultiplies its output.
fn wrap_lens_fragment(iris_source: &str) -> String {
    format!("{HEADER}{LENS_FRAGMENT_PROLOGUE}\n#line 1\n{iris_source}{LENS_FRAGMENT_FOOTER}")
}

/// Version line plus the uniform block shared by every stage.
///
/// The layout must match `SceneUniforms` in `gpu/uniforms.rs`: three matrices
/// followed by four vec4s, 256 bytes in total. `primary.w` carries the shader
/// time and `surface.z` the marker radius.
const HEADER: &str = r"#version 450

layout(std140, set = 0, binding = 0) uniform SceneParams {
    mat4 view_proj;
    mat4 ring_model;
    mat4 lens_model;
    vec4 primary;
    vec4 secondary;
    vec4 glint;
    vec4 surface;
} scene;
";

const LENS_VERTEX: &str = r"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = scene.view_proj * scene.lens_model * vec4(a_position, 1.0);
}
";

const LENS_FRAGMENT_PROLOGUE: &str = r"
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
";

const LENS_FRAGMENT_FOOTER: &str = r"
void main() {
    vec4 color = iris_color(
        v_uv,
        scene.primary.w,
        scene.primary.rgb,
        scene.secondary.rgb,
        scene.glint.rgb
    );
    out_color = vec4(color.rgb * color.a, color.a);
}
";

const RING_VERTEX: &str = r"
layout(location = 0) in vec3 a_position;

void main() {
    gl_Position = scene.view_proj * scene.ring_model * vec4(a_position, 1.0);
}
";

const RING_FRAGMENT: &str = r"
layout(location = 0) out vec4 out_color;

const float RING_ALPHA = 0.35;

void main() {
    out_color = vec4(scene.glint.rgb * RING_ALPHA, RING_ALPHA);
}
";

const MARKER_VERTEX: &str = r"
layout(location = 0) in vec3 a_center;
layout(location = 0) out vec2 v_corner;

const vec2 corners[6] = vec2[6](
    vec2(-1.0, -1.0),
    vec2(1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(-1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    vec2 corner = corners[gl_VertexIndex];
    v_corner = corner;
    vec3 position = a_center + vec3(corner * scene.surface.z, 0.0);
    gl_Position = scene.view_proj * scene.ring_model * vec4(position, 1.0);
}
";

const MARKER_FRAGMENT: &str = r"
layout(location = 0) in vec2 v_corner;
layout(location = 0) out vec4 out_color;

const float MARKER_ALPHA = 0.8;

void main() {
    float coverage = 1.0 - smoothstep(0.7, 1.0, length(v_corner));
    float alpha = coverage * MARKER_ALPHA;
    out_color = vec4(scene.glint.rgb * alpha, alpha);
}
";

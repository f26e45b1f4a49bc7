/// WGSL shader shared by the rope and flag pipelines.
///
/// Lighting follows the scene rig: warm ambient plus two directional lights.
/// Cloth is rendered double-sided, so the fragment stage flips the normal on
/// back faces before shading.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,    // rgb, intensity
    key_dir: vec4<f32>,    // xyz: direction toward light, w: intensity
    key_color: vec4<f32>,
    back_dir: vec4<f32>,
    back_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_normal = vertex.normal;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(
    in: VertexOutput,
    @builtin(front_facing) front_facing: bool,
) -> @location(0) vec4<f32> {
    let n0 = normalize(in.world_normal);
    let n = select(-n0, n0, front_facing);

    var light = uniforms.ambient.rgb * uniforms.ambient.a;
    light += uniforms.key_color.rgb
        * uniforms.key_dir.w
        * max(dot(n, uniforms.key_dir.xyz), 0.0);
    light += uniforms.back_color.rgb
        * uniforms.back_dir.w
        * max(dot(n, uniforms.back_dir.xyz), 0.0);

    return vec4<f32>(in.color.rgb * light, in.color.a);
}
"#;

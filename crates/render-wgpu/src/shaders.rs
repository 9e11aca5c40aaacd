/// WGSL shader for matcap-shaded meshes, with a lit fallback when the
/// material has no matcap texture.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    ambient: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var matcap_texture: texture_2d<f32>;
@group(1) @binding(1)
var matcap_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) flags: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) flags: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.color = instance.color;
    out.flags = instance.flags;
    return out;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var n = normalize(in.world_normal);
    if !front {
        n = -n;
    }

    // Matcap lookup in view space.
    let view_normal = normalize((uniforms.view * vec4<f32>(n, 0.0)).xyz);
    let view_dir = normalize(-(uniforms.view * vec4<f32>(in.world_position, 1.0)).xyz);
    let x = normalize(vec3<f32>(view_dir.z, 0.0, -view_dir.x));
    let y = cross(view_dir, x);
    let uv = vec2<f32>(dot(x, view_normal), dot(y, view_normal)) * 0.495 + 0.5;
    let matcap = textureSample(matcap_texture, matcap_sampler, vec2<f32>(uv.x, 1.0 - uv.y)).rgb;

    let to_light = normalize(uniforms.light_position.xyz - in.world_position);
    let diffuse = max(dot(n, to_light), 0.0) * uniforms.light_color.rgb * uniforms.light_color.w;
    let lit = uniforms.ambient.rgb * uniforms.ambient.w + diffuse;

    let shade = select(lit, matcap, in.flags.x > 0.5);
    return vec4<f32>(in.color.rgb * shade, 1.0);
}
"#;

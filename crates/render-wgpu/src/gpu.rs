use crate::FrameState;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use showcase_assets::{Texture, TextureId};
use showcase_geometry::{Geometry, GeometryId};
use showcase_scene::{Lighting, SceneState};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_position: [f32; 4],
    light_color: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, view: Mat4, lighting: &Lighting) -> Self {
        let ambient = lighting.ambient.color.to_array();
        let light = lighting.point.color.to_array();
        let p = lighting.point.position;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            ambient: [ambient[0], ambient[1], ambient[2], lighting.ambient.intensity],
            light_position: [p.x, p.y, p.z, 1.0],
            light_color: [light[0], light[1], light[2], lighting.point.intensity],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    /// x: 1 when shaded by the matcap texture.
    flags: [f32; 4],
}

/// Buffers for one uploaded geometry.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    wire_index_buffer: wgpu::Buffer,
    wire_index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let mesh = &geometry.mesh;
        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        let wire_indices = mesh.wireframe_indices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_wire_index_buffer"),
            contents: bytemuck::cast_slice(&wire_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(
            kind = geometry.descriptor.kind(),
            vertices = vertices.len(),
            "uploaded mesh"
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            wire_index_buffer,
            wire_index_count: wire_indices.len() as u32,
        }
    }
}

/// A run of instances sharing mesh, pipeline and matcap texture.
#[derive(Debug, Clone, PartialEq)]
struct Batch {
    geometry: GeometryId,
    wireframe: bool,
    texture: Option<TextureId>,
    instances: std::ops::Range<u32>,
}

/// Group drawable objects into batches. Objects without a material, or with
/// an empty mesh, are skipped.
fn build_batches(scene: &SceneState) -> (Vec<InstanceData>, Vec<Batch>) {
    let mut keyed: Vec<((GeometryId, bool, Option<TextureId>), InstanceData)> = Vec::new();
    for object in scene.objects() {
        let Some(material) = &object.material else {
            continue;
        };
        if object.geometry.mesh.is_empty() {
            continue;
        }
        let texture = material.matcap.texture().map(|t| t.id);
        let cols = object.transform.matrix().to_cols_array_2d();
        let c = material.color.to_array();
        keyed.push((
            (object.geometry.id, material.wireframe, texture),
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: [c[0], c[1], c[2], 1.0],
                flags: [if texture.is_some() { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            },
        ));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut instances = Vec::with_capacity(keyed.len());
    let mut batches: Vec<Batch> = Vec::new();
    for ((geometry, wireframe, texture), data) in keyed {
        let index = instances.len() as u32;
        instances.push(data);
        match batches.last_mut() {
            Some(b) if b.geometry == geometry && b.wireframe == wireframe && b.texture == texture => {
                b.instances.end = index + 1;
            }
            _ => batches.push(Batch {
                geometry,
                wireframe,
                texture,
                instances: index..index + 1,
            }),
        }
    }
    (instances, batches)
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    fill_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_bind_group: wgpu::BindGroup,
    texture_bind_groups: HashMap<TextureId, wgpu::BindGroup>,
    meshes: HashMap<GeometryId, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u32,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                &Lighting::default(),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("matcap_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("matcap_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // 1x1 white stand-in so the bind group is always valid.
        let fallback = Texture {
            id: TextureId(0),
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        };
        let fallback_bind_group =
            Self::create_texture_bind_group(device, queue, &texture_layout, &sampler, &fallback);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let fill_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            "fill_pipeline",
        );
        let wire_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            "wire_pipeline",
        );

        let instance_capacity = 256u32;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);
        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            fill_pipeline,
            wire_pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            sampler,
            fallback_bind_group,
            texture_bind_groups: HashMap::new(),
            meshes: HashMap::new(),
            instance_buffer,
            instance_capacity,
            depth_texture,
        }
    }

    /// Recreate size-dependent targets. Takes the drawing-buffer size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame of the scene into `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        frame: &FrameState,
        scene: &SceneState,
    ) {
        let camera = &frame.camera;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(
                camera.view_projection(),
                camera.view_matrix(),
                &scene.lighting,
            )),
        );

        self.upload_resources(device, queue, scene);

        let (instances, batches) = build_batches(scene);
        if instances.len() as u32 > self.instance_capacity {
            self.instance_capacity = (instances.len() as u32).next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.instance_capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for batch in &batches {
                let Some(mesh) = self.meshes.get(&batch.geometry) else {
                    continue;
                };
                let textures = batch
                    .texture
                    .and_then(|id| self.texture_bind_groups.get(&id))
                    .unwrap_or(&self.fallback_bind_group);
                pass.set_bind_group(1, textures, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));

                if batch.wireframe {
                    pass.set_pipeline(&self.wire_pipeline);
                    pass.set_index_buffer(mesh.wire_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.wire_index_count, 0, batch.instances.clone());
                } else {
                    pass.set_pipeline(&self.fill_pipeline);
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Upload meshes and matcap textures seen for the first time.
    fn upload_resources(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &SceneState) {
        for object in scene.objects() {
            let Some(material) = &object.material else {
                continue;
            };
            if !object.geometry.mesh.is_empty() && !self.meshes.contains_key(&object.geometry.id) {
                self.meshes
                    .insert(object.geometry.id, GpuMesh::upload(device, &object.geometry));
            }
            if let Some(texture) = material.matcap.texture() {
                if !self.texture_bind_groups.contains_key(&texture.id) {
                    let group = Self::create_texture_bind_group(
                        device,
                        queue,
                        &self.texture_layout,
                        &self.sampler,
                        texture,
                    );
                    self.texture_bind_groups.insert(texture.id, group);
                    tracing::debug!(url = material.matcap.url(), "uploaded matcap texture");
                }
            }
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
        label: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Flat shapes (plane, circle, ring) are seen from both sides.
            primitive: wgpu::PrimitiveState {
                topology,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        let gpu_texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("matcap_texture"),
                size: wgpu::Extent3d {
                    width: texture.width.max(1),
                    height: texture.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &texture.rgba,
        );
        let view = gpu_texture.create_view(&Default::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("matcap_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: capacity as u64 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_assets::{AssetLoader, AssetRequest, TextureHandle};
    use showcase_scene::CollectionKind;
    use std::sync::Arc;

    fn scene(matcap: TextureHandle) -> SceneState {
        SceneState::with_assets(AssetLoader::default(), matcap, AssetRequest::pending("font.json"))
    }

    fn instance_total(batches: &[Batch]) -> u32 {
        batches.iter().map(|b| b.instances.end - b.instances.start).sum()
    }

    #[test]
    fn decorations_share_one_batch() {
        let scene = scene(TextureHandle::failed("missing.png"));
        let (instances, batches) = build_batches(&scene);
        assert_eq!(instances.len(), scene.object_count());
        assert_eq!(instance_total(&batches), instances.len() as u32);
        // 15 distinct shapes plus one shared decoration mesh.
        assert_eq!(batches.len(), 16);
        assert!(batches.iter().any(|b| b.instances.len() == 100));
    }

    #[test]
    fn objects_without_material_are_skipped() {
        let mut scene = scene(TextureHandle::failed("missing.png"));
        let total = scene.object_count();
        scene
            .collection_mut(CollectionKind::Decorations)
            .for_each(|object| object.material = None);
        let (instances, _) = build_batches(&scene);
        assert_eq!(instances.len(), total - 100);
    }

    #[test]
    fn wireframe_splits_batches() {
        let mut scene = scene(TextureHandle::failed("missing.png"));
        scene.set_wireframe_all(true);
        let (_, batches) = build_batches(&scene);
        assert!(batches.iter().all(|b| b.wireframe));
    }

    #[test]
    fn matcap_flag_follows_texture() {
        let texture = Arc::new(Texture {
            id: TextureId(7),
            width: 1,
            height: 1,
            rgba: vec![200; 4],
        });
        let textured = scene(TextureHandle::ready("matcap.png", texture));
        let (instances, batches) = build_batches(&textured);
        assert!(instances.iter().all(|i| i.flags[0] == 1.0));
        assert!(batches.iter().all(|b| b.texture == Some(TextureId(7))));

        let untextured = scene(TextureHandle::failed("missing.png"));
        let (instances, _) = build_batches(&untextured);
        assert!(instances.iter().all(|i| i.flags[0] == 0.0));
    }

    #[test]
    fn uniforms_carry_lighting() {
        let lighting = Lighting::default();
        let u = Uniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &lighting);
        assert_eq!(u.ambient[3], lighting.ambient.intensity);
        assert_eq!(u.light_position[0], lighting.point.position.x);
    }
}

use crate::camera::SceneCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use flagline_scene::{FlagScene, LightRig};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    back_dir: [f32; 4],
    back_color: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, lights: &LightRig) -> Self {
        let dir = |position: Vec3| position.normalize();
        let key = dir(lights.key.position);
        let back = dir(lights.back.position);
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            ambient: [
                lights.ambient_color[0],
                lights.ambient_color[1],
                lights.ambient_color[2],
                lights.ambient_intensity,
            ],
            key_dir: [key.x, key.y, key.z, lights.key.intensity],
            key_color: [
                lights.key.color[0],
                lights.key.color[1],
                lights.key.color[2],
                0.0,
            ],
            back_dir: [back.x, back.y, back.z, lights.back.intensity],
            back_color: [
                lights.back.color[0],
                lights.back.color[1],
                lights.back.color[2],
                0.0,
            ],
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
    color: [f32; 4],
}

/// Interleave a deformed grid into GPU vertices, placing the flag on the line.
fn flag_vertices(positions: &[Vec3], normals: &[Vec3], x_offset: f32) -> Vec<Vertex> {
    positions
        .iter()
        .zip(normals)
        .map(|(p, n)| Vertex {
            position: [p.x + x_offset, p.y, p.z],
            normal: [n.x, n.y, n.z],
        })
        .collect()
}

/// wgpu-based flag line renderer.
///
/// Built against one scene: buffer sizes follow the scene's flag count and
/// grid resolution, which never change at runtime.
pub struct WgpuRenderer {
    flag_pipeline: wgpu::RenderPipeline,
    rope_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    flag_vertex_buffers: Vec<wgpu::Buffer>,
    flag_index_buffer: wgpu::Buffer,
    flag_index_count: u32,
    flag_instance_buffer: wgpu::Buffer,
    rope_vertex_buffer: wgpu::Buffer,
    rope_index_buffer: wgpu::Buffer,
    rope_index_count: u32,
    rope_instance_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &FlagScene,
    ) -> Self {
        // Uniform buffer
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(Mat4::IDENTITY, scene.lights())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
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
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let vertex_buffers = [
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
                ],
            },
        ];

        let depth_stencil = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        };

        // Flag pipeline: double-sided cloth with alpha blending.
        let flag_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flag_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Rope pipeline: opaque closed tube.
        let rope_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("rope_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Flag meshes: shared topology, per-flag vertex buffer rewritten
        // every frame.
        let first = scene.flags()[0].grid();
        let flag_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flag_index_buffer"),
            contents: bytemuck::cast_slice(first.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let flag_index_count = first.indices().len() as u32;

        let flag_vertex_size =
            (first.positions().len() * std::mem::size_of::<Vertex>()) as u64;
        let flag_vertex_buffers = (0..scene.flags().len())
            .map(|i| {
                let label = format!("flag_vertex_buffer_{i}");
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&label),
                    size: flag_vertex_size,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let opacity = scene.config().opacity;
        let flag_instances: Vec<InstanceData> = scene
            .flags()
            .iter()
            .map(|f| {
                let [r, g, b] = f.color();
                InstanceData {
                    color: [r, g, b, opacity],
                }
            })
            .collect();
        let flag_instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flag_instance_buffer"),
            contents: bytemuck::cast_slice(&flag_instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Rope mesh: static, uploaded once.
        let rope = scene.rope();
        let rope_verts = flag_vertices(rope.positions(), rope.normals(), 0.0);
        let rope_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rope_vertex_buffer"),
            contents: bytemuck::cast_slice(&rope_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let rope_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rope_index_buffer"),
            contents: bytemuck::cast_slice(rope.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let rope_index_count = rope.indices().len() as u32;

        let rope_color = flagline_common::parse_hex_rgb(&scene.config().rope_color)
            .unwrap_or([0.55, 0.45, 0.33]);
        let rope_instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rope_instance_buffer"),
            contents: bytemuck::bytes_of(&InstanceData {
                color: [rope_color[0], rope_color[1], rope_color[2], 1.0],
            }),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let [cr, cg, cb] = scene.clear_color();
        let clear_color = wgpu::Color {
            r: cr as f64,
            g: cg as f64,
            b: cb as f64,
            a: 1.0,
        };

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(
            flags = scene.flags().len(),
            flag_indices = flag_index_count,
            rope_indices = rope_index_count,
            "created flag line renderer"
        );

        Self {
            flag_pipeline,
            rope_pipeline,
            uniform_buffer,
            uniform_bind_group,
            flag_vertex_buffers,
            flag_index_buffer,
            flag_index_count,
            flag_instance_buffer,
            rope_vertex_buffer,
            rope_index_buffer,
            rope_index_count,
            rope_instance_buffer,
            depth_texture,
            surface_format,
            clear_color,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: rope tube + deformed flags.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &SceneCamera,
        scene: &FlagScene,
    ) {
        debug_assert_eq!(scene.flags().len(), self.flag_vertex_buffers.len());

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(camera.view_projection(), scene.lights())),
        );

        // Upload this frame's deformed cloth before the pass is encoded.
        for (flag, buffer) in scene.flags().iter().zip(&self.flag_vertex_buffers) {
            let verts = flag_vertices(
                flag.grid().positions(),
                flag.grid().normals(),
                flag.x_offset(),
            );
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&verts));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
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

            // Rope first: opaque geometry under the translucent cloth.
            pass.set_pipeline(&self.rope_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.rope_vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.rope_instance_buffer.slice(..));
            pass.set_index_buffer(self.rope_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.rope_index_count, 0, 0..1);

            pass.set_pipeline(&self.flag_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.flag_instance_buffer.slice(..));
            pass.set_index_buffer(self.flag_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for (i, buffer) in self.flag_vertex_buffers.iter().enumerate() {
                pass.set_vertex_buffer(0, buffer.slice(..));
                // Instance index selects this flag's color.
                pass.draw_indexed(0..self.flag_index_count, 0, i as u32..i as u32 + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
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

    #[test]
    fn gpu_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<InstanceData>(), 16);
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 5 * 16);
    }

    #[test]
    fn flag_vertices_apply_line_placement() {
        let positions = vec![Vec3::new(-0.5, 0.1, 0.02)];
        let normals = vec![Vec3::Z];
        let verts = flag_vertices(&positions, &normals, 1.25);
        assert_eq!(verts[0].position, [0.75, 0.1, 0.02]);
        assert_eq!(verts[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn uniforms_normalize_light_directions() {
        let u = Uniforms::new(Mat4::IDENTITY, &LightRig::default());
        let len = (u.key_dir[0].powi(2) + u.key_dir[1].powi(2) + u.key_dir[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert_eq!(u.key_dir[3], 0.5);
        assert_eq!(u.ambient[3], 0.7);
    }
}

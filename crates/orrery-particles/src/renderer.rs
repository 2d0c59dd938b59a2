//! Instanced billboard rendering of a [`ParticleSimulator`].

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use log::info;
use orrery_render::{BufferAllocator, DepthBuffer, ShaderError, ShaderLibrary};

use crate::simulator::{ParticleSimulator, billboard_axes};

pub const PARTICLE_SHADER_SOURCE: &str = include_str!("particle.wgsl");

/// Unit quad corners, drawn as a triangle strip.
const QUAD_CORNERS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [-0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ParticleUniforms {
    view_projection: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
}

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const POSITION_SIZE_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![1 => Float32x4];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Unorm8x4];

/// Vertex slots: 0 quad corner per vertex, 1 centre+size and 2 colour per instance.
pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &QUAD_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &POSITION_SIZE_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[u8; 4]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR_ATTRIBUTES,
        },
    ]
}

pub struct ParticleRenderer {
    pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
    position_size: wgpu::Buffer,
    colors: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    instance_count: u32,
}

impl ParticleRenderer {
    /// Pipeline and instance buffers sized for `capacity` particles.
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        capacity: usize,
        shaders: &mut ShaderLibrary,
    ) -> Result<Self, ShaderError> {
        let shader = shaders.load(device, "particle", "particle.wgsl", PARTICLE_SHADER_SOURCE)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("particle-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ParticleUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_layouts(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            // Tested against the bodies, never written.
            depth_stencil: Some(DepthBuffer::depth_stencil_state(false)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let allocator = BufferAllocator::new(device);
        let quad =
            allocator.create_vertex_buffer("particle-quad", bytemuck::cast_slice(&QUAD_CORNERS));
        let position_size = allocator.create_streaming_vertex_buffer(
            "particle-position-size",
            (capacity * std::mem::size_of::<[f32; 4]>()) as u64,
        );
        let colors = allocator.create_streaming_vertex_buffer(
            "particle-colors",
            (capacity * std::mem::size_of::<[u8; 4]>()) as u64,
        );
        let uniforms =
            allocator.create_uniform_buffer("particle-uniforms", &ParticleUniforms::zeroed());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle-bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        info!("Particle renderer ready for {capacity} particles");

        Ok(Self {
            pipeline,
            quad,
            position_size,
            colors,
            uniforms,
            bind_group,
            capacity,
            instance_count: 0,
        })
    }

    /// Upload the simulator's alive prefix and this frame's camera.
    pub fn prepare(
        &mut self,
        queue: &wgpu::Queue,
        simulator: &ParticleSimulator,
        view: Mat4,
        projection: Mat4,
    ) {
        let count = simulator.alive_count().min(self.capacity);
        if count > 0 {
            queue.write_buffer(
                &self.position_size,
                0,
                bytemuck::cast_slice(&simulator.position_size_data()[..count]),
            );
            queue.write_buffer(
                &self.colors,
                0,
                bytemuck::cast_slice(&simulator.color_data()[..count]),
            );
        }

        let (right, up) = billboard_axes(view);
        let uniforms = ParticleUniforms {
            view_projection: (projection * view).to_cols_array_2d(),
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
        };
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));
        self.instance_count = count as u32;
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// One instanced strip draw of every prepared particle.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad.slice(..));
        pass.set_vertex_buffer(1, self.position_size.slice(..));
        pass.set_vertex_buffer(2, self.colors.slice(..));
        pass.draw(0..QUAD_CORNERS.len() as u32, 0..self.instance_count);
    }
}

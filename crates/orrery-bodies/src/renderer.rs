//! GPU side of the body system: per-kind pipelines, the icosphere LOD chain,
//! per-body uniform buffers and shadow maps.

use std::collections::HashMap;

use log::{error, info, warn};
use orrery_render::{
    BufferAllocator, DepthBuffer, MeshBuffer, ShaderLibrary, ShadowCaster,
    VertexPositionNormalUv, capture_validation, create_shadow_sampler,
};
use thiserror::Error;

use crate::body::BodyKindTag;
use crate::icosphere;
use crate::system::{BodySystem, FramePacket};
use crate::uniforms::{BodyUniforms, PassKind};

/// Uniform layout, noise and lighting helpers shared by every kind.
pub const COMMON_SHADER_SOURCE: &str = include_str!("shaders/common.wgsl");
pub const BODY_SHADER_SOURCE: &str = include_str!("shaders/body.wgsl");
pub const STAR_SHADER_SOURCE: &str = include_str!("shaders/star.wgsl");
pub const EARTH_SHADER_SOURCE: &str = include_str!("shaders/earth.wgsl");

#[derive(Debug, Error, PartialEq)]
pub enum BodyRenderError {
    #[error("body {index} is a {kind}, which has no render pipeline")]
    MissingPipeline { index: usize, kind: &'static str },

    #[error("scene has {scene} bodies but the renderer was built for {renderer}")]
    SceneMismatch { scene: usize, renderer: usize },
}

fn kind_shader(kind: BodyKindTag) -> (&'static str, &'static str) {
    match kind {
        BodyKindTag::Body => ("body.wgsl", BODY_SHADER_SOURCE),
        BodyKindTag::Star => ("star.wgsl", STAR_SHADER_SOURCE),
        BodyKindTag::Earth => ("earth.wgsl", EARTH_SHADER_SOURCE),
    }
}

struct KindPipelines {
    color: wgpu::RenderPipeline,
    depth: wgpu::RenderPipeline,
}

struct BodySlot {
    shadow: Option<ShadowCaster>,
    depth_uniforms: wgpu::Buffer,
    color_uniforms: wgpu::Buffer,
    depth_bind_group: wgpu::BindGroup,
    color_bind_group: wgpu::BindGroup,
    level: usize,
}

/// Draws every body of a [`BodySystem`].
///
/// Call [`prepare`](Self::prepare) once per frame, record
/// [`render_shadow_passes`](Self::render_shadow_passes) into the frame's
/// encoder, then [`render_color_passes`](Self::render_color_passes) inside
/// the scene colour pass.
pub struct BodyRenderer {
    pipelines: HashMap<BodyKindTag, KindPipelines>,
    lods: Vec<MeshBuffer>,
    slots: Vec<BodySlot>,
    _sampler: wgpu::Sampler,
    _placeholder_shadow: ShadowCaster,
}

impl BodyRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        system: &BodySystem,
        shaders: &mut ShaderLibrary,
    ) -> Self {
        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(BodyUniforms::SIZE),
            },
            count: None,
        };
        let depth_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-depth-bgl"),
            entries: &[uniform_entry],
        });
        let color_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-color-bgl"),
            entries: &[
                uniform_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let mut pipelines = HashMap::new();
        for kind in BodyKindTag::ALL {
            let built = build_kind_pipelines(
                device,
                shaders,
                kind,
                color_format,
                &depth_layout,
                &color_layout,
            );
            match built {
                Ok(kind_pipelines) => {
                    pipelines.insert(kind, kind_pipelines);
                }
                Err(err) => error!("No {} pipeline: {err}", kind.label()),
            }
        }

        let max_level = system.settings().tessellation.max_subdivision;
        let allocator = BufferAllocator::new(device);
        let lods = icosphere::lod_chain(max_level)
            .iter()
            .enumerate()
            .map(|(level, sphere)| {
                allocator.create_mesh(
                    &format!("icosphere-{level}"),
                    &sphere.vertices(),
                    &sphere.indices,
                )
            })
            .collect();

        let sampler = create_shadow_sampler(device);
        let placeholder_shadow = ShadowCaster::new(device, 1, "placeholder-shadow-map");
        let resolution = system.settings().shadow_map_resolution;
        let shadows_enabled = system.settings().enable_shadow_maps;

        let slots = system
            .bodies()
            .iter()
            .enumerate()
            .map(|(index, body)| {
                let shadow = body.needs_shadow_map(shadows_enabled).then(|| {
                    ShadowCaster::new(device, resolution, &format!("body-{index}-shadow-map"))
                });
                let shadow_view = shadow
                    .as_ref()
                    .map_or(placeholder_shadow.view(), ShadowCaster::view);

                let zeroed: BodyUniforms = bytemuck::Zeroable::zeroed();
                let depth_uniforms = allocator
                    .create_uniform_buffer(&format!("body-{index}-depth-uniforms"), &zeroed);
                let color_uniforms = allocator
                    .create_uniform_buffer(&format!("body-{index}-color-uniforms"), &zeroed);

                let depth_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("body-depth-bg"),
                    layout: &depth_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: depth_uniforms.as_entire_binding(),
                    }],
                });
                let color_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("body-color-bg"),
                    layout: &color_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: color_uniforms.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(shadow_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });

                BodySlot {
                    shadow,
                    depth_uniforms,
                    color_uniforms,
                    depth_bind_group,
                    color_bind_group,
                    level: 0,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "Body renderer ready: {} bodies, {} pipelines, LOD 0..={max_level}",
            slots.len(),
            pipelines.len()
        );

        Self {
            pipelines,
            lods,
            slots,
            _sampler: sampler,
            _placeholder_shadow: placeholder_shadow,
        }
    }

    pub fn has_pipeline(&self, kind: BodyKindTag) -> bool {
        self.pipelines.contains_key(&kind)
    }

    /// Icosphere level chosen for body `index` by the last [`prepare`](Self::prepare).
    pub fn level(&self, index: usize) -> Option<usize> {
        self.slots.get(index).map(|slot| slot.level)
    }

    pub fn shadow_map_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.shadow.is_some()).count()
    }

    /// Upload this frame's uniforms and pick each body's mesh level.
    pub fn prepare(&mut self, queue: &wgpu::Queue, system: &BodySystem, frame: &FramePacket) {
        let finest = self.lods.len().saturating_sub(1);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.shadow.is_some() {
                if let Some(uniforms) = system.body_uniforms(index, PassKind::ShadowDepth, frame) {
                    queue.write_buffer(&slot.depth_uniforms, 0, bytemuck::bytes_of(&uniforms));
                }
            }
            if let Some(uniforms) = system.body_uniforms(index, PassKind::Color, frame) {
                queue.write_buffer(&slot.color_uniforms, 0, bytemuck::bytes_of(&uniforms));
            }
            slot.level = (system.subdivision_for(index, frame) as usize).min(finest);
        }
    }

    /// Record one depth pass per shadow-casting body into `encoder`.
    pub fn render_shadow_passes(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        system: &BodySystem,
    ) -> Result<(), BodyRenderError> {
        self.check_scene(system)?;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(shadow) = &slot.shadow else {
                continue;
            };
            let pipelines = self.pipelines_for(system, index)?;
            let mut pass = shadow.begin_write_pass(encoder);
            pass.set_pipeline(&pipelines.depth);
            pass.set_bind_group(0, &slot.depth_bind_group, &[]);
            self.draw_level(&mut pass, slot.level);
        }
        Ok(())
    }

    /// Draw every body into the current colour pass.
    pub fn render_color_passes(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        system: &BodySystem,
    ) -> Result<(), BodyRenderError> {
        self.check_scene(system)?;
        for (index, slot) in self.slots.iter().enumerate() {
            let pipelines = self.pipelines_for(system, index)?;
            pass.set_pipeline(&pipelines.color);
            pass.set_bind_group(0, &slot.color_bind_group, &[]);
            self.draw_level(pass, slot.level);
        }
        Ok(())
    }

    fn check_scene(&self, system: &BodySystem) -> Result<(), BodyRenderError> {
        if system.len() != self.slots.len() {
            return Err(BodyRenderError::SceneMismatch {
                scene: system.len(),
                renderer: self.slots.len(),
            });
        }
        Ok(())
    }

    fn pipelines_for(
        &self,
        system: &BodySystem,
        index: usize,
    ) -> Result<&KindPipelines, BodyRenderError> {
        let kind = system.bodies()[index].kind().tag();
        self.pipelines
            .get(&kind)
            .ok_or(BodyRenderError::MissingPipeline {
                index,
                kind: kind.label(),
            })
    }

    fn draw_level(&self, pass: &mut wgpu::RenderPass<'_>, level: usize) {
        let Some(mesh) = self.lods.get(level).or(self.lods.last()) else {
            warn!("No icosphere meshes to draw");
            return;
        };
        mesh.bind(pass);
        mesh.draw(pass);
    }
}

fn build_kind_pipelines(
    device: &wgpu::Device,
    shaders: &mut ShaderLibrary,
    kind: BodyKindTag,
    color_format: wgpu::TextureFormat,
    depth_layout: &wgpu::BindGroupLayout,
    color_layout: &wgpu::BindGroupLayout,
) -> Result<KindPipelines, orrery_render::ShaderError> {
    let (filename, embedded) = kind_shader(kind);
    let common = shaders.source("common.wgsl", COMMON_SHADER_SOURCE)?;
    let fragment = shaders.source(filename, embedded)?;
    let source = format!("{common}\n{fragment}");
    let name = format!("body-{}", kind.label());
    let module = shaders.compile(device, &name, &source)?;

    capture_validation(device, &name, || {
        let depth_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("body-depth-pipeline-layout"),
                bind_group_layouts: &[depth_layout],
                immediate_size: 0,
            });
        let color_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("body-color-pipeline-layout"),
                bind_group_layouts: &[color_layout],
                immediate_size: 0,
            });

        let vertex = wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        };
        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        };

        let depth = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("body-{}-depth-pipeline", kind.label())),
            layout: Some(&depth_pipeline_layout),
            vertex: vertex.clone(),
            primitive,
            depth_stencil: Some(ShadowCaster::depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: None,
            multiview_mask: None,
            cache: None,
        });

        let color = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("body-{}-color-pipeline", kind.label())),
            layout: Some(&color_pipeline_layout),
            vertex,
            primitive,
            depth_stencil: Some(DepthBuffer::depth_stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        KindPipelines { color, depth }
    })
}

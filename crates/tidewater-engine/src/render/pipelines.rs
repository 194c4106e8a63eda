use std::num::NonZeroU64;

use crate::scene::DrawLayer;

use super::{MaterialConstants, ObjectConstants, PassConstants, SpriteVertex, Vertex};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Named pipeline states.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PipelineKey {
    Opaque,
    OpaqueWireframe,
    AlphaTested,
    TreeSprites,
    Transparent,
}

impl PipelineKey {
    pub const ALL: [PipelineKey; 5] = [
        PipelineKey::Opaque,
        PipelineKey::OpaqueWireframe,
        PipelineKey::AlphaTested,
        PipelineKey::TreeSprites,
        PipelineKey::Transparent,
    ];

    /// Pipeline used for `layer`.
    pub fn for_layer(layer: DrawLayer, wireframe: bool) -> Self {
        match layer {
            DrawLayer::Opaque if wireframe => PipelineKey::OpaqueWireframe,
            DrawLayer::Opaque => PipelineKey::Opaque,
            DrawLayer::AlphaTested => PipelineKey::AlphaTested,
            DrawLayer::AlphaTestedSprites => PipelineKey::TreeSprites,
            DrawLayer::Transparent => PipelineKey::Transparent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PipelineKey::Opaque => "opaque",
            PipelineKey::OpaqueWireframe => "opaque-wireframe",
            PipelineKey::AlphaTested => "alpha-tested",
            PipelineKey::TreeSprites => "point-sprite",
            PipelineKey::Transparent => "transparent-blend",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            PipelineKey::TreeSprites => wgpu::PrimitiveTopology::TriangleStrip,
            _ => wgpu::PrimitiveTopology::TriangleList,
        }
    }

    fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            PipelineKey::Opaque | PipelineKey::Transparent => Some(wgpu::Face::Back),
            _ => None,
        }
    }

    fn polygon_mode(self) -> wgpu::PolygonMode {
        match self {
            PipelineKey::OpaqueWireframe => wgpu::PolygonMode::Line,
            _ => wgpu::PolygonMode::Fill,
        }
    }

    fn blend(self) -> Option<wgpu::BlendState> {
        match self {
            PipelineKey::Transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
            _ => None,
        }
    }

    fn vertex_entry(self) -> &'static str {
        match self {
            PipelineKey::TreeSprites => "vs_sprite",
            _ => "vs_main",
        }
    }

    fn fragment_entry(self) -> &'static str {
        match self {
            PipelineKey::AlphaTested | PipelineKey::TreeSprites => "fs_alpha_tested",
            _ => "fs_main",
        }
    }

    fn vertex_layout(self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            PipelineKey::TreeSprites => SpriteVertex::layout(),
            _ => Vertex::layout(),
        }
    }

    fn required_features(self) -> wgpu::Features {
        match self {
            PipelineKey::OpaqueWireframe => wgpu::Features::POLYGON_MODE_LINE,
            _ => wgpu::Features::empty(),
        }
    }
}

fn uniform_entry(
    visibility: wgpu::ShaderStages,
    dynamic: bool,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

/// Bind group layouts shared by every pipeline.
pub(crate) struct SceneLayouts {
    pub pass: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let vs_fs = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        let pass = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tidewater pass bgl"),
            entries: &[uniform_entry(vs_fs, false, size_of::<PassConstants>())],
        });

        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tidewater object bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX,
                true,
                size_of::<ObjectConstants>(),
            )],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tidewater material bgl"),
            entries: &[uniform_entry(vs_fs, true, size_of::<MaterialConstants>())],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tidewater texture bgl"),
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

        Self {
            pass,
            object,
            material,
            texture,
        }
    }
}

/// The fixed set of render pipelines, built once per surface format.
pub(crate) struct PipelineSet {
    pipelines: [Option<wgpu::RenderPipeline>; PipelineKey::ALL.len()],
    warned_fallback: bool,
}

impl PipelineSet {
    pub fn new(
        device: &wgpu::Device,
        layouts: &SceneLayouts,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tidewater scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tidewater scene pipeline layout"),
            bind_group_layouts: &[
                &layouts.pass,
                &layouts.object,
                &layouts.material,
                &layouts.texture,
            ],
            immediate_size: 0,
        });

        let features = device.features();
        let pipelines = PipelineKey::ALL.map(|key| {
            if !features.contains(key.required_features()) {
                log::warn!(
                    "pipeline '{}' unavailable: missing {:?}",
                    key.name(),
                    key.required_features()
                );
                return None;
            }
            Some(create_pipeline(device, &layout, &shader, color_format, key))
        });

        Self {
            pipelines,
            warned_fallback: false,
        }
    }

    /// Returns the pipeline for `key`, falling back to `Opaque` for missing variants.
    pub fn get(&mut self, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        if self.pipelines[key.index()].is_none() && !self.warned_fallback {
            log::warn!("pipeline '{}' not built; drawing with 'opaque'", key.name());
            self.warned_fallback = true;
        }
        self.pipelines[key.index()]
            .as_ref()
            .or(self.pipelines[PipelineKey::Opaque.index()].as_ref())
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let label = format!("tidewater {} pipeline", key.name());

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(key.vertex_entry()),
            compilation_options: Default::default(),
            buffers: &[key.vertex_layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(key.fragment_entry()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: key.blend(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: key.topology(),
            strip_index_format: None,
            // Left-handed scene, clockwise front faces.
            front_face: wgpu::FrontFace::Cw,
            cull_mode: key.cull_mode(),
            polygon_mode: key.polygon_mode(),
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

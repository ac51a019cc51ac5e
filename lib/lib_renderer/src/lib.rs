use std::mem::offset_of;

mod colormap;
mod point_buffer;
pub use colormap::*;
pub use point_buffer::*;

use bytemuck::{Pod, Zeroable};
use lib_app::AppContext;
use lib_gpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState, Buffer, BufferBindingType,
    BufferDescriptor, BufferUsages, Color, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, CompareFunction, DepthBiasState, DepthStencilState, Device,
    Extent3d, FilterMode, FragmentState, FrontFace, LoadOp, MultisampleState, Operations,
    Origin3d, PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode, PrimitiveState,
    PrimitiveTopology, Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, SamplerBindingType,
    SamplerDescriptor, ShaderStages, StencilState, StoreOp, TexelCopyBufferLayout,
    TexelCopyTextureInfo, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
    VertexAttribute, VertexBufferLayout, VertexFormat, VertexState, VertexStepMode, include_wgsl,
};
use lib_math::{Mat4, Vec4};
use tracing::debug;

/// Edge length of a rendered point, in pixels.
pub const POINT_SIZE: f32 = 4.0;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

// Filterable without optional device features.
const COLORMAP_FORMAT: TextureFormat = TextureFormat::Rgba16Float;
const COLORMAP_FORMAT_BYTES: u32 = 8;

/// Draws a point cloud as screen-space squares colored by stress through a
/// 1D colormap texture, with depth testing.
#[derive(Debug)]
pub struct PointRenderer {
    uniform_buf: Buffer,
    bind_group: BindGroup,
    pipeline: RenderPipeline,
    depth_view: TextureView,
    depth_size: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub clear_color: Vec4,
}

#[derive(Debug, Clone, Copy)]
pub struct RendererContext<'a> {
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct Uniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    viewport: [f32; 2],
    point_size: f32,
    _pad: f32,
}

impl PointRenderer {
    pub fn new(colormap: &Colormap, ctx: RendererContext<'_>) -> Self {
        let uniform_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("lib_renderer uniform buffer"),
            size: size_of::<Uniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let colormap_texture = ctx.device.create_texture(&TextureDescriptor {
            label: Some("lib_renderer colormap texture"),
            size: Extent3d {
                width: colormap.len() as u32,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D1,
            format: COLORMAP_FORMAT,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &colormap_texture,
                aspect: TextureAspect::All,
                mip_level: 0,
                origin: Origin3d::ZERO,
            },
            &colormap.to_rgba16f(),
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(colormap.len() as u32 * COLORMAP_FORMAT_BYTES),
                rows_per_image: None,
            },
            colormap_texture.size(),
        );

        let colormap_view = colormap_texture.create_view(&TextureViewDescriptor {
            dimension: Some(TextureViewDimension::D1),
            ..Default::default()
        });

        let sampler = ctx.device.create_sampler(&SamplerDescriptor {
            label: Some("lib_renderer colormap sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            anisotropy_clamp: 1,
            border_color: None,
            compare: None,
            lod_max_clamp: 32.0,
            lod_min_clamp: 0.0,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Nearest,
        });

        let shader = ctx
            .device
            .create_shader_module(include_wgsl!("shader.wgsl"));

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("lib_renderer bind group layout"),
                entries: &[
                    BindGroupLayoutEntry {
                        binding: 0,
                        ty: BindingType::Buffer {
                            ty: BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                        visibility: ShaderStages::VERTEX,
                    },
                    BindGroupLayoutEntry {
                        binding: 1,
                        ty: BindingType::Texture {
                            sample_type: TextureSampleType::Float { filterable: true },
                            view_dimension: TextureViewDimension::D1,
                            multisampled: false,
                        },
                        count: None,
                        visibility: ShaderStages::FRAGMENT,
                    },
                    BindGroupLayoutEntry {
                        binding: 2,
                        ty: BindingType::Sampler(SamplerBindingType::Filtering),
                        count: None,
                        visibility: ShaderStages::FRAGMENT,
                    },
                ],
            });

        let bind_group = ctx.device.create_bind_group(&BindGroupDescriptor {
            label: Some("lib_renderer bind group"),
            layout: &bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&colormap_view),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline = ctx
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("lib_renderer pipeline"),
                cache: None,
                depth_stencil: Some(DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: CompareFunction::Less,
                    stencil: StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                layout: Some(
                    &ctx.device
                        .create_pipeline_layout(&PipelineLayoutDescriptor {
                            label: Some("lib_renderer pipeline layout"),
                            bind_group_layouts: &[&bind_group_layout],
                            push_constant_ranges: &[],
                        }),
                ),
                multiview: None,
                primitive: PrimitiveState {
                    front_face: FrontFace::Ccw,
                    conservative: false,
                    cull_mode: None,
                    polygon_mode: PolygonMode::Fill,
                    strip_index_format: None,
                    topology: PrimitiveTopology::TriangleList,
                    unclipped_depth: false,
                },
                vertex: VertexState {
                    module: &shader,
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[POINT_BUFFER_LAYOUT],
                },
                fragment: Some(FragmentState {
                    module: &shader,
                    targets: &[Some(ColorTargetState {
                        blend: Some(BlendState::REPLACE),
                        format: ctx.surface_format,
                        write_mask: ColorWrites::all(),
                    })],
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                multisample: MultisampleState::default(),
            });

        let depth_view = create_depth_view(1, 1, ctx.device);

        Self {
            uniform_buf,
            bind_group,
            pipeline,
            depth_view,
            depth_size: (1, 1),
        }
    }

    /// Clears `output` and draws every point in `points` in one instanced
    /// draw call.
    pub fn render(
        &mut self,
        points: PointBufferSlice<'_>,
        cam: &Camera,
        output: &TextureView,
        ctx: RendererContext<'_>,
    ) {
        let width = output.texture().width();
        let height = output.texture().height();

        if self.depth_size != (width, height) {
            debug!(width, height, "recreating depth texture");

            self.depth_view = create_depth_view(width, height, ctx.device);
            self.depth_size = (width, height);
        }

        let uniforms = Uniforms {
            model: cam.model.to_cols_array_2d(),
            view: cam.view.to_cols_array_2d(),
            projection: cam.projection.to_cols_array_2d(),
            viewport: [width as f32, height as f32],
            point_size: POINT_SIZE,
            _pad: 0.0,
        };

        ctx.queue
            .write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("lib_renderer render pass"),
            timestamp_writes: None,
            occlusion_query_set: None,
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: output,
                depth_slice: None,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: cam.clear_color.x as f64,
                        g: cam.clear_color.y as f64,
                        b: cam.clear_color.z as f64,
                        a: cam.clear_color.w as f64,
                    }),
                    store: StoreOp::Store,
                },
                resolve_target: None,
            })],
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);

        if !points.is_empty() {
            pass.set_vertex_buffer(0, points.buf.slice(points.byte_range()));
            pass.draw(0..6, 0..points.len() as u32);
        }

        drop(pass);

        ctx.queue.submit([encoder.finish()]);
    }
}

impl<'a> From<AppContext<'a>> for RendererContext<'a> {
    fn from(value: AppContext<'a>) -> Self {
        Self {
            device: value.device,
            queue: value.queue,
            surface_format: value.surface_format,
        }
    }
}

fn create_depth_view(width: u32, height: u32, device: &Device) -> TextureView {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("lib_renderer depth texture"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    texture.create_view(&TextureViewDescriptor::default())
}

// One instance per point, six vertices each for the two triangles of its quad.
const POINT_BUFFER_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<Point>() as u64,
    step_mode: VertexStepMode::Instance,
    attributes: &[
        VertexAttribute {
            format: VertexFormat::Float32x3,
            offset: offset_of!(Point, position) as u64,
            shader_location: 0,
        },
        VertexAttribute {
            format: VertexFormat::Float32,
            offset: offset_of!(Point, stress) as u64,
            shader_location: 1,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_shader_layout() {
        // 3 mat4x4<f32> + vec2<f32> + f32, rounded up to 16-byte alignment.
        assert_eq!(size_of::<Uniforms>(), 208);
        assert_eq!(offset_of!(Uniforms, viewport), 192);
        assert_eq!(offset_of!(Uniforms, point_size), 200);
    }

    #[test]
    fn colormap_texel_size_matches_format() {
        assert_eq!(
            COLORMAP_FORMAT.block_copy_size(None),
            Some(COLORMAP_FORMAT_BYTES)
        );
        assert_eq!(
            Colormap::new().to_rgba16f().len(),
            COLORMAP_LEN * COLORMAP_FORMAT_BYTES as usize
        );
    }

    #[test]
    fn point_layout_covers_whole_point() {
        assert_eq!(POINT_BUFFER_LAYOUT.array_stride, 16);
        assert_eq!(POINT_BUFFER_LAYOUT.attributes.len(), 2);
        assert_eq!(POINT_BUFFER_LAYOUT.attributes[1].offset, 12);
    }
}

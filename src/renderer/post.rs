//! Post-processing chain
//!
//! The scene renders into a full-resolution HDR target. A bright pass pulls
//! out everything above the bloom threshold into a half-resolution buffer,
//! which is blurred horizontally then vertically. The composite pass adds
//! the blurred glow back, tone maps, and applies vignette and film noise
//! on the way to the swapchain.

use bytemuck::{Pod, Zeroable};

pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub const BLOOM_THRESHOLD: f32 = 1.0;
pub const VIGNETTE_OFFSET: f32 = 0.1;
pub const VIGNETTE_DARKNESS: f32 = 1.1;
pub const NOISE_OPACITY: f32 = 0.02;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PostUniforms {
    /// Size of the texture being sampled, in pixels
    pub resolution: [f32; 2],
    pub time: f32,
    pub bloom_intensity: f32,
    pub blur_dir: [f32; 2],
    pub threshold: f32,
    pub noise: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    /// 1.0 when the composite output needs sRGB encoding in the shader
    pub encode_srgb: f32,
    pub _pad: f32,
}

impl PostUniforms {
    pub fn new(resolution: [f32; 2], time: f32, bloom_intensity: f32) -> Self {
        Self {
            resolution,
            time,
            bloom_intensity,
            blur_dir: [0.0, 0.0],
            threshold: BLOOM_THRESHOLD,
            noise: NOISE_OPACITY,
            vignette_offset: VIGNETTE_OFFSET,
            vignette_darkness: VIGNETTE_DARKNESS,
            encode_srgb: 0.0,
            _pad: 0.0,
        }
    }

    pub fn with_blur(mut self, dir: [f32; 2]) -> Self {
        self.blur_dir = dir;
        self
    }

    pub fn with_srgb_encode(mut self, encode: bool) -> Self {
        self.encode_srgb = if encode { 1.0 } else { 0.0 };
        self
    }
}

/// Half the viewport, never zero
pub fn bloom_size(width: u32, height: u32) -> (u32, u32) {
    ((width.max(1) / 2).max(1), (height.max(1) / 2).max(1))
}

fn color_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Offscreen targets; recreated on resize
struct Targets {
    _hdr: wgpu::Texture,
    hdr_view: wgpu::TextureView,
    _bloom_a: wgpu::Texture,
    bloom_a_view: wgpu::TextureView,
    _bloom_b: wgpu::Texture,
    bloom_b_view: wgpu::TextureView,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (bw, bh) = bloom_size(width, height);
        let (hdr, hdr_view) = color_target(device, "hdr", width.max(1), height.max(1));
        let (bloom_a, bloom_a_view) = color_target(device, "bloom_a", bw, bh);
        let (bloom_b, bloom_b_view) = color_target(device, "bloom_b", bw, bh);
        Self {
            _hdr: hdr,
            hdr_view,
            _bloom_a: bloom_a,
            bloom_a_view,
            _bloom_b: bloom_b,
            bloom_b_view,
        }
    }
}

/// Bind groups that reference the targets
struct BindGroups {
    bright: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite_scene: wgpu::BindGroup,
    composite_bloom: wgpu::BindGroup,
}

/// Uniform buffers, one per pass
struct Uniforms {
    bright: wgpu::Buffer,
    blur_h: wgpu::Buffer,
    blur_v: wgpu::Buffer,
    composite: wgpu::Buffer,
}

pub struct PostProcess {
    bgl_sampled: wgpu::BindGroupLayout,
    bgl_texture: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniforms: Uniforms,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    targets: Targets,
    bind_groups: BindGroups,
    /// Output view is not sRGB, so the composite encodes
    encode_srgb: bool,
    size: (u32, u32),
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

impl PostProcess {
    /// `output_format` is the format of the view passed to `run`
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("post.wgsl").into()),
        });

        // Group 0: texture + sampler + uniforms; group 1: second texture + sampler
        let bgl_sampled = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl_sampled"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bgl_texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl_texture"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("post_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<PostUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let uniforms = Uniforms {
            bright: uniform("post_bright_uniforms"),
            blur_h: uniform("post_blur_h_uniforms"),
            blur_v: uniform("post_blur_v_uniforms"),
            composite: uniform("post_composite_uniforms"),
        };

        let single_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_single_layout"),
            bind_group_layouts: &[&bgl_sampled],
            immediate_size: 0,
        });
        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_composite_layout"),
            bind_group_layouts: &[&bgl_sampled, &bgl_texture],
            immediate_size: 0,
        });

        let bright_pipeline = fullscreen_pipeline(
            device,
            "post_bright",
            &single_layout,
            &shader,
            "fs_bright",
            HDR_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "post_blur",
            &single_layout,
            &shader,
            "fs_blur",
            HDR_FORMAT,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "post_composite",
            &composite_layout,
            &shader,
            "fs_composite",
            output_format,
        );

        let targets = Targets::new(device, width, height);
        let bind_groups =
            Self::bind_groups(device, &bgl_sampled, &bgl_texture, &sampler, &uniforms, &targets);

        Self {
            bgl_sampled,
            bgl_texture,
            sampler,
            uniforms,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            targets,
            bind_groups,
            encode_srgb: !output_format.is_srgb(),
            size: (width, height),
        }
    }

    fn bind_groups(
        device: &wgpu::Device,
        bgl_sampled: &wgpu::BindGroupLayout,
        bgl_texture: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        uniforms: &Uniforms,
        targets: &Targets,
    ) -> BindGroups {
        let sampled = |label: &str, view: &wgpu::TextureView, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: bgl_sampled,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffer.as_entire_binding(),
                    },
                ],
            })
        };

        BindGroups {
            bright: sampled("post_bg_bright", &targets.hdr_view, &uniforms.bright),
            blur_h: sampled("post_bg_blur_h", &targets.bloom_a_view, &uniforms.blur_h),
            blur_v: sampled("post_bg_blur_v", &targets.bloom_b_view, &uniforms.blur_v),
            composite_scene: sampled(
                "post_bg_composite",
                &targets.hdr_view,
                &uniforms.composite,
            ),
            composite_bloom: device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("post_bg_bloom"),
                layout: bgl_texture,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            }),
        }
    }

    /// View the scene pass renders into
    pub fn hdr_view(&self) -> &wgpu::TextureView {
        &self.targets.hdr_view
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) == self.size || width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.targets = Targets::new(device, width, height);
        self.bind_groups = Self::bind_groups(
            device,
            &self.bgl_sampled,
            &self.bgl_texture,
            &self.sampler,
            &self.uniforms,
            &self.targets,
        );
        log::debug!("Post targets resized to {}x{}", width, height);
    }

    /// Record the bloom passes and the final composite into `output`
    pub fn run(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
        time: f32,
        bloom_intensity: f32,
    ) {
        let (w, h) = self.size;
        let (bw, bh) = bloom_size(w, h);
        let full = PostUniforms::new([w as f32, h as f32], time, bloom_intensity);
        let half = PostUniforms::new([bw as f32, bh as f32], time, bloom_intensity);

        queue.write_buffer(&self.uniforms.bright, 0, bytemuck::bytes_of(&full));
        queue.write_buffer(
            &self.uniforms.blur_h,
            0,
            bytemuck::bytes_of(&half.with_blur([1.0, 0.0])),
        );
        queue.write_buffer(
            &self.uniforms.blur_v,
            0,
            bytemuck::bytes_of(&half.with_blur([0.0, 1.0])),
        );
        queue.write_buffer(
            &self.uniforms.composite,
            0,
            bytemuck::bytes_of(&full.with_srgb_encode(self.encode_srgb)),
        );

        blit(
            encoder,
            "bright_pass",
            &self.targets.bloom_a_view,
            &self.bright_pipeline,
            &self.bind_groups.bright,
            None,
        );
        blit(
            encoder,
            "blur_h",
            &self.targets.bloom_b_view,
            &self.blur_pipeline,
            &self.bind_groups.blur_h,
            None,
        );
        blit(
            encoder,
            "blur_v",
            &self.targets.bloom_a_view,
            &self.blur_pipeline,
            &self.bind_groups.blur_v,
            None,
        );
        blit(
            encoder,
            "composite",
            output,
            &self.composite_pipeline,
            &self.bind_groups.composite_scene,
            Some(&self.bind_groups.composite_bloom),
        );
    }
}

fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    group0: &wgpu::BindGroup,
    group1: Option<&wgpu::BindGroup>,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, group0, &[]);
    if let Some(group1) = group1 {
        pass.set_bind_group(1, group1, &[]);
    }
    pass.draw(0..3, 0..1);
}

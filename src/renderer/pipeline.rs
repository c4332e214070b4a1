//! WebGPU render state
//!
//! Owns the device, surface and scene pipeline. Each frame the scene is
//! flattened into one instance buffer, drawn per mesh into the HDR target,
//! then handed to the post chain for the swapchain.

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::camera::OrbitCamera;
use super::instances::{MeshKind, SceneInstances, build_instances};
use super::lights::{Globals, build_globals};
use super::post::{HDR_FORMAT, PostProcess};
use super::vertex::{InstanceRaw, Vertex, colors};
use crate::settings::SceneConfig;
use crate::sim::SceneState;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Instance slots allocated up front: storm dust, sky and the tree itself
const INITIAL_INSTANCE_CAPACITY: usize = 6_000;

struct Mesh {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

fn depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

/// Swapchain format and the format frames are viewed through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormats {
    pub surface: wgpu::TextureFormat,
    pub view: wgpu::TextureFormat,
}

/// Pick output formats from the surface's supported list.
///
/// Prefers an sRGB surface. Failing that, takes the first format with an
/// sRGB view variant (WebGPU canvases only list `*Unorm`). Otherwise the
/// first format is viewed as-is and the composite pass encodes.
pub fn output_formats(available: &[wgpu::TextureFormat]) -> Option<OutputFormats> {
    if let Some(&format) = available.iter().find(|f| f.is_srgb()) {
        return Some(OutputFormats {
            surface: format,
            view: format,
        });
    }
    if let Some(&format) = available.iter().find(|f| f.add_srgb_suffix().is_srgb()) {
        return Some(OutputFormats {
            surface: format,
            view: format.add_srgb_suffix(),
        });
    }
    available.first().map(|&format| OutputFormats {
        surface: format,
        view: format,
    })
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    meshes: Vec<Mesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    /// Reused every frame
    instances: SceneInstances,
    flat: Vec<InstanceRaw>,
    depth: wgpu::TextureView,
    post: PostProcess,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> crate::Result<Self> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("arix-tree-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let formats =
            output_formats(&surface_caps.formats).ok_or(crate::Error::UnsupportedSurface)?;
        log::info!(
            "Using surface format: {:?} (view {:?})",
            formats.surface,
            formats.view
        );
        if !formats.view.is_srgb() {
            log::warn!("No sRGB view available, encoding in the composite pass");
        }
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: formats.surface,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: if formats.view == formats.surface {
                vec![]
            } else {
                vec![formats.view]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
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

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Open cones are seen from both sides
                cull_mode: None,
                ..Default::default()
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
        });

        let meshes = MeshKind::ALL
            .iter()
            .map(|kind| {
                let vertices = kind.vertices();
                Mesh {
                    buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("mesh_vertices"),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    vertex_count: vertices.len() as u32,
                }
            })
            .collect();

        let instance_buffer = Self::create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);
        let depth = depth_view(&device, width, height);
        let post = PostProcess::new(&device, formats.view, width, height);

        log::info!("Render state ready ({}x{})", width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format: formats.view,
            pipeline,
            globals_buffer,
            globals_bind_group,
            meshes,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            instances: SceneInstances::default(),
            flat: Vec::with_capacity(INITIAL_INSTANCE_CAPACITY),
            depth,
            post,
            size: (width, height),
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instances"),
            size: (std::mem::size_of::<InstanceRaw>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth = depth_view(&self.device, new_width, new_height);
            self.post.resize(&self.device, new_width, new_height);
        }
    }

    pub fn aspect(&self) -> f32 {
        self.size.0 as f32 / self.size.1.max(1) as f32
    }

    /// Upload the scene and draw one frame
    pub fn render(
        &mut self,
        state: &SceneState,
        settings: &SceneConfig,
        camera: &OrbitCamera,
    ) -> Result<(), wgpu::SurfaceError> {
        // Invalid colours are reset when the config is normalized
        let spot_color = settings
            .light_rgb()
            .map(colors::linear)
            .unwrap_or([1.0; 3]);
        let globals = build_globals(state, camera, self.aspect(), spot_color);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        build_instances(state, &mut self.instances);
        let ranges = self.instances.flatten(&mut self.flat);
        if self.flat.len() > self.instance_capacity {
            self.instance_capacity = self.flat.len().next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("Instance buffer grown to {}", self.instance_capacity);
        }
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.flat));

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        self.draw_scene(&mut encoder, &ranges);
        self.post.run(
            &self.queue,
            &mut encoder,
            &view,
            state.shader_time(),
            settings.bloom_intensity,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn draw_scene(&self, encoder: &mut wgpu::CommandEncoder, ranges: &[Range<u32>; 6]) {
        let [r, g, b] = colors::hex(colors::BACKGROUND);
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.post.hdr_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
        let stride = std::mem::size_of::<InstanceRaw>() as u64;
        for (mesh, range) in self.meshes.iter().zip(ranges) {
            if range.is_empty() {
                continue;
            }
            // Slice per batch rather than using a base instance
            let bytes = range.start as u64 * stride..range.end as u64 * stride;
            render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(bytes));
            render_pass.draw(0..mesh.vertex_count, 0..range.len() as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn test_webgpu_canvas_gets_srgb_view() {
        let formats = output_formats(&[F::Bgra8Unorm, F::Rgba8Unorm, F::Rgba16Float]);
        assert_eq!(
            formats,
            Some(OutputFormats {
                surface: F::Bgra8Unorm,
                view: F::Bgra8UnormSrgb,
            })
        );
    }

    #[test]
    fn test_srgb_surface_preferred() {
        let formats = output_formats(&[F::Rgba16Float, F::Rgba8UnormSrgb, F::Rgba8Unorm]);
        assert_eq!(
            formats,
            Some(OutputFormats {
                surface: F::Rgba8UnormSrgb,
                view: F::Rgba8UnormSrgb,
            })
        );
    }

    #[test]
    fn test_float_only_surface_is_viewed_as_is() {
        let formats = output_formats(&[F::Rgba16Float]).map(|f| f.view);
        assert_eq!(formats, Some(F::Rgba16Float));
        assert!(!F::Rgba16Float.is_srgb());
    }

    #[test]
    fn test_no_formats() {
        assert_eq!(output_formats(&[]), None);
    }
}

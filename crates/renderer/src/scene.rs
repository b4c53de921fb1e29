//! The demo scene: textured ground and cube, the OBJ guard drawn per material,
//! and the text overlay.

use std::num::NonZeroU64;
use std::path::PathBuf;

use anyhow::{Context, Result};
use asset::obj::load_obj_by_material;
use asset::primitives;
use asset::texture::TextureData;
use corelib::input::InputState;
use corelib::overlay::{OverlayBatch, TextStyle};
use corelib::palette::MaterialPalette;
use corelib::scene::SceneState;
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device, FragmentState, LoadOp,
    Operations, PipelineLayoutDescriptor, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource, ShaderStages,
    StoreOp, TextureFormat, VertexState, util::DeviceExt,
};

use crate::mesh::{GpuMesh, MESH_VERTEX_LAYOUT, upload_material_groups};
use crate::overlay::OverlayRenderer;
use crate::texture::GpuTexture;
use crate::uniforms::{FrameUniform, ObjectUniform};
use crate::{DEPTH_FORMAT, GpuState, Scene, SurfaceError};

/// Files and colours the scene is built from.
#[derive(Clone, Debug)]
pub struct SceneAssets {
    pub guard_obj: PathBuf,
    pub floor_texture: PathBuf,
    pub cube_texture: PathBuf,
    pub palette: MaterialPalette,
}

/// Ground colour used when the floor texture is not sampled.
const GROUND_COLOR: Vec3 = vec3(0.28, 0.30, 0.28);
const CUBE_COLOR: Vec3 = vec3(0.80, 0.80, 0.86);

/// One draw call: vertex buffer plus its own object uniform and texture.
struct DrawItem {
    label: String,
    mesh: GpuMesh,
    object_bg: BindGroup,
    texture_bg: BindGroup,
    // Keeps the uniform alive for the bind group.
    #[allow(dead_code)]
    object_buf: Buffer,
}

/// Everything created in `init`.
struct Resources {
    pipeline: RenderPipeline,
    frame_buf: Buffer,
    frame_bg: BindGroup,
    draws: Vec<DrawItem>,
    overlay: OverlayRenderer,
}

pub struct GuardScene {
    pub state: SceneState,
    assets: SceneAssets,
    overlay_batch: OverlayBatch,
    viewport: (u32, u32),
    resources: Option<Resources>,
}

impl GuardScene {
    pub fn new(state: SceneState, assets: SceneAssets) -> Self {
        Self {
            state,
            assets,
            overlay_batch: OverlayBatch::new(),
            viewport: (1, 1),
            resources: None,
        }
    }

    pub fn guard_transform() -> Transform {
        Transform::from_translation(vec3(2.0, -0.5, -1.5)).with_yaw(-0.6)
    }

    fn build_overlay(&mut self) {
        let (width, height) = self.viewport;
        self.overlay_batch.begin(width, height);
        let lines = self.state.overlay_lines();
        let style = TextStyle {
            scale: 2.0,
            color: [1.0, 1.0, 0.9, 1.0],
        };
        self.overlay_batch.panel(12.0, 12.0, &lines, style, 6.0);
    }
}

impl Scene for GuardScene {
    fn init(&mut self, gpu: &GpuState) -> Result<()> {
        let device = &gpu.device;
        let queue = &gpu.queue;

        // A missing guard model is fatal; textures fall back to a checkerboard.
        let groups = load_obj_by_material(&self.assets.guard_obj)
            .with_context(|| format!("Failed to load guard model {:?}", self.assets.guard_obj))?;
        let floor_tex = GpuTexture::upload(
            device,
            queue,
            &TextureData::load_or_checkerboard(&self.assets.floor_texture, true),
            "Floor Texture",
        );
        let cube_tex = GpuTexture::upload(
            device,
            queue,
            &TextureData::load_or_checkerboard(&self.assets.cube_texture, true),
            "Cube Texture",
        );
        let white_tex = GpuTexture::white(device, queue);

        // ==== Bind group layouts ====
        let frame_bgl = uniform_layout(
            device,
            "Frame BGL",
            ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<FrameUniform>(),
        );
        let object_bgl = uniform_layout(
            device,
            "Object BGL",
            ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<ObjectUniform>(),
        );
        let texture_bgl = texture_layout(device);

        let frame_init = FrameUniform::from_state(&self.state);
        let frame_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame UBO"),
            contents: bytemuck::bytes_of(&frame_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buf.as_entire_binding(),
            }],
        });

        let pipeline = scene_pipeline(
            device,
            gpu.surface_format(),
            &[&frame_bgl, &object_bgl, &texture_bgl],
        );

        // ==== Geometry ====
        let mut draws = Vec::new();
        let mut push_draw = |label: String,
                             mesh: Option<GpuMesh>,
                             object: ObjectUniform,
                             texture: &GpuTexture| {
            let Some(mesh) = mesh else {
                log::warn!("Skipping empty mesh '{}'", label);
                return;
            };
            let object_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: bytemuck::bytes_of(&object),
                usage: BufferUsages::UNIFORM,
            });
            let object_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&label),
                layout: &object_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buf.as_entire_binding(),
                }],
            });
            let texture_bg = texture_bind_group(device, &texture_bgl, texture, &label);
            draws.push(DrawItem {
                label,
                mesh,
                object_bg,
                texture_bg,
                object_buf,
            });
        };

        push_draw(
            "Ground".into(),
            GpuMesh::from_vertices(
                device,
                "Ground VB",
                &primitives::ground_plane(10.0, -0.5, 10.0),
            ),
            ObjectUniform::new(&Transform::identity(), GROUND_COLOR, true),
            &floor_tex,
        );
        push_draw(
            "Cube".into(),
            GpuMesh::from_vertices(device, "Cube VB", &primitives::cube()),
            ObjectUniform::new(&Transform::identity(), CUBE_COLOR, true),
            &cube_tex,
        );

        let guard = Self::guard_transform();
        for part in upload_material_groups(device, &groups, &self.assets.palette) {
            push_draw(
                format!("Guard [{}]", part.name),
                Some(part.mesh),
                ObjectUniform::new(&guard, part.color, false),
                &white_tex,
            );
        }
        log::info!("Scene ready: {} draw(s)", draws.len());

        self.resources = Some(Resources {
            pipeline,
            frame_buf,
            frame_bg,
            draws,
            overlay: OverlayRenderer::new(device, gpu.surface_format(), DEPTH_FORMAT),
        });

        let (width, height) = gpu.size();
        self.resize(width, height);
        Ok(())
    }

    fn update(&mut self, t: f32, input: &mut InputState) {
        self.state.update(t, input);
    }

    fn render(&mut self, gpu: &GpuState) -> Result<(), SurfaceError> {
        self.build_overlay();
        let Some(res) = self.resources.as_mut() else {
            log::warn!("render() called before init()");
            return Ok(());
        };

        let frame_u = FrameUniform::from_state(&self.state);
        gpu.queue
            .write_buffer(&res.frame_buf, 0, bytemuck::bytes_of(&frame_u));
        res.overlay
            .prepare(&gpu.device, &gpu.queue, &self.overlay_batch);

        let (frame, view) = gpu.acquire()?;
        let mut encoder = gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        let sky = self.state.lighting().clear_color;
        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: f64::from(sky.x),
                            g: f64::from(sky.y),
                            b: f64::from(sky.z),
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&res.pipeline);
            rpass.set_bind_group(0, &res.frame_bg, &[]);
            for item in &res.draws {
                rpass.set_bind_group(1, &item.object_bg, &[]);
                rpass.set_bind_group(2, &item.texture_bg, &[]);
                rpass.set_vertex_buffer(0, item.mesh.vertex_buf.slice(..));
                rpass.draw(0..item.mesh.vertex_count, 0..1);
            }

            res.overlay.draw(&mut rpass);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.state.camera.set_viewport(width, height);
        log::debug!("Scene viewport {}x{}", self.viewport.0, self.viewport.1);
    }
}

impl GuardScene {
    /// Labels of the draw calls created by `init`, in draw order.
    pub fn draw_labels(&self) -> Vec<&str> {
        self.resources
            .as_ref()
            .map(|res| res.draws.iter().map(|d| d.label.as_str()).collect())
            .unwrap_or_default()
    }
}

fn uniform_layout(
    device: &Device,
    label: &str,
    visibility: ShaderStages,
    size: usize,
) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}

fn texture_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Texture BGL"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn texture_bind_group(
    device: &Device,
    layout: &BindGroupLayout,
    texture: &GpuTexture,
    label: &str,
) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

fn scene_pipeline(
    device: &Device,
    color_format: TextureFormat,
    layouts: &[&BindGroupLayout],
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Scene WGSL"),
        source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Scene PipelineLayout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MESH_VERTEX_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: color_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::input::Action;

    fn scene() -> GuardScene {
        GuardScene::new(
            SceneState::default(),
            SceneAssets {
                guard_obj: "assets/guard.obj".into(),
                floor_texture: "assets/wood.png".into(),
                cube_texture: "assets/brick.png".into(),
                palette: MaterialPalette::guard(),
            },
        )
    }

    #[test]
    fn resize_updates_camera_and_overlay_viewport() {
        let mut scene = scene();
        scene.resize(1000, 500);
        assert_eq!(scene.state.camera.aspect, 2.0);
        scene.build_overlay();
        assert!(!scene.overlay_batch.is_empty());
        assert!(scene.draw_labels().is_empty());
    }

    #[test]
    fn update_forwards_input_to_state() {
        let mut scene = scene();
        let mut input = InputState::new();
        input.set(Action::ToggleFog, true);
        scene.update(0.0, &mut input);
        assert!(scene.state.fog_enabled);
    }

    #[test]
    fn guard_stands_on_the_ground() {
        let m = GuardScene::guard_transform().matrix();
        let feet = m.transform_point3(Vec3::ZERO);
        assert!((feet.y + 0.5).abs() < 1e-6);
    }
}

//! Renderer: wgpu device/surface, the `Scene` capability and the guard scene.
//! wgpu = 26.x, winit = 0.30.x

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use corelib::input::InputState;
use wgpu::{
    Backends, Device, DeviceDescriptor, Extent3d, Features, Instance, InstanceDescriptor, Limits,
    PowerPreference, PresentMode, Queue, Surface, SurfaceConfiguration, SurfaceTexture,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};
use winit::{dpi::PhysicalSize, window::Window};

pub mod mesh;
pub mod overlay;
pub mod scene;
pub mod texture;
pub mod uniforms;

pub use scene::{GuardScene, SceneAssets};
pub use wgpu::SurfaceError;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Something that can be driven by the platform loop.
pub trait Scene {
    /// Create GPU resources and load assets. Errors abort startup.
    fn init(&mut self, gpu: &GpuState) -> Result<()>;
    /// Advance to absolute time `t` (seconds) using this frame's input.
    fn update(&mut self, t: f32, input: &mut InputState);
    /// Draw one frame into the current surface texture.
    fn render(&mut self, gpu: &GpuState) -> Result<(), SurfaceError>;
    /// Framebuffer size changed; `gpu` has already been reconfigured.
    fn resize(&mut self, width: u32, height: u32);
}

/// Surface, device and depth buffer shared by everything that draws.
pub struct GpuState {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    depth_view: TextureView,
}

impl GpuState {
    /// Create GPU state bound to an `Arc<Window>`.
    pub async fn new(window: Arc<Window>, backends: Backends) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();

        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No suitable GPU adapter: {e}"))?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Nightguard Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        let depth_view = create_depth_view(&device, &surface_config);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            depth_view,
        })
    }

    /// Blocking wrapper around [`GpuState::new`].
    pub fn new_blocking(window: Arc<Window>, backends: Backends) -> Result<Self> {
        pollster::block_on(Self::new(window, backends))
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn depth_view(&self) -> &TextureView {
        &self.depth_view
    }

    /// Next swapchain image and a view onto it.
    pub fn acquire(&self) -> Result<(SurfaceTexture, TextureView), SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        Ok((frame, view))
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        let (width, height) = self.size();
        self.resize(width, height);
    }
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

//! Application configuration: optional TOML file, then `--flag=value` overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use corelib::camera::FpsCamera;
use corelib::palette::MaterialPalette;
use corelib::scene::{DayNight, SceneState};
use corelib::{Vec3, vec3};
use renderer::SceneAssets;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// GPU backend selection, `auto` by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum GpuBackend {
    #[default]
    Auto,
    Vulkan,
    Dx12,
    Metal,
    Gl,
}

impl GpuBackend {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            GpuBackend::Auto => wgpu::Backends::all(),
            GpuBackend::Vulkan => wgpu::Backends::VULKAN,
            GpuBackend::Dx12 => wgpu::Backends::DX12,
            GpuBackend::Metal => wgpu::Backends::METAL,
            GpuBackend::Gl => wgpu::Backends::GL,
        }
    }
}

impl FromStr for GpuBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(GpuBackend::Auto),
            "vulkan" | "vk" => Ok(GpuBackend::Vulkan),
            "dx12" | "d3d12" => Ok(GpuBackend::Dx12),
            "metal" | "mtl" => Ok(GpuBackend::Metal),
            "gl" | "opengl" | "gles" => Ok(GpuBackend::Gl),
            other => Err(format!("unknown GPU backend '{other}'")),
        }
    }
}

impl TryFrom<String> for GpuBackend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Nightguard".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub gpu_backend: GpuBackend,
    pub show_fps: bool,
    pub fog: bool,
    pub night: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let cam = FpsCamera::default();
        Self {
            position: cam.position.to_array(),
            yaw_deg: cam.yaw_deg,
            pitch_deg: cam.pitch_deg,
            move_speed: cam.move_speed,
            mouse_sensitivity: cam.mouse_sensitivity,
        }
    }
}

/// Asset file names, resolved against `dir`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub guard_obj: PathBuf,
    pub floor_texture: PathBuf,
    pub cube_texture: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            guard_obj: PathBuf::from("guard.obj"),
            floor_texture: PathBuf::from("wood.png"),
            cube_texture: PathBuf::from("brick.png"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
    /// Extra or replacement material colours, e.g. `Helmet = [0.2, 0.2, 0.25]`.
    pub materials: BTreeMap<String, [f32; 3]>,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Apply command-line overrides. Unparseable values are reported and ignored.
    ///
    /// Accepts: `--gpu-backend=auto|vulkan|dx12|metal|gl`, `--size=WxH`,
    /// `--width=N`, `--height=N`, `--show-fps[=on|off]`, `--fog[=on|off]`,
    /// `--night`, `--assets=DIR`.
    pub fn apply_args<I, A>(&mut self, args: I)
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if let Some(val) = arg.strip_prefix("--gpu-backend=") {
                self.render.gpu_backend = val.parse().unwrap_or_else(|e| {
                    log::warn!("{e}, falling back to auto");
                    GpuBackend::Auto
                });
            } else if let Some(val) = arg.strip_prefix("--size=") {
                match parse_size(val) {
                    Some((w, h)) => {
                        self.window.width = w;
                        self.window.height = h;
                    }
                    None => log::warn!("Ignoring malformed --size={val}"),
                }
            } else if let Some(val) = arg.strip_prefix("--width=") {
                match val.parse::<u32>() {
                    Ok(w) => self.window.width = w,
                    Err(_) => log::warn!("Ignoring malformed --width={val}"),
                }
            } else if let Some(val) = arg.strip_prefix("--height=") {
                match val.parse::<u32>() {
                    Ok(h) => self.window.height = h,
                    Err(_) => log::warn!("Ignoring malformed --height={val}"),
                }
            } else if let Some(flag) = parse_switch(arg, "--show-fps") {
                self.render.show_fps = flag;
            } else if let Some(flag) = parse_switch(arg, "--fog") {
                self.render.fog = flag;
            } else if let Some(flag) = parse_switch(arg, "--night") {
                self.render.night = flag;
            } else if let Some(dir) = arg.strip_prefix("--assets=") {
                self.assets.dir = PathBuf::from(dir);
            } else if arg.starts_with("--config=") {
                // Consumed by `config_path_from_args`.
            } else {
                log::warn!("Unknown argument '{arg}'");
            }
        }
        self.window.width = self.window.width.max(1);
        self.window.height = self.window.height.max(1);
    }

    pub fn mode(&self) -> DayNight {
        if self.render.night {
            DayNight::Night
        } else {
            DayNight::Day
        }
    }

    pub fn build_camera(&self) -> FpsCamera {
        let c = &self.camera;
        let mut cam = FpsCamera::new(
            Vec3::from_array(c.position),
            c.yaw_deg,
            c.pitch_deg,
            self.window.width as f32 / self.window.height.max(1) as f32,
        );
        cam.move_speed = c.move_speed;
        cam.mouse_sensitivity = c.mouse_sensitivity;
        cam
    }

    pub fn scene_state(&self) -> SceneState {
        SceneState::new(
            self.build_camera(),
            self.mode(),
            self.render.fog,
            self.render.show_fps,
        )
    }

    /// Guard palette with `[materials]` entries layered on top.
    pub fn palette(&self) -> MaterialPalette {
        let mut palette = MaterialPalette::guard();
        palette.extend(
            self.materials
                .iter()
                .map(|(name, [r, g, b])| (name.clone(), vec3(*r, *g, *b))),
        );
        palette
    }

    pub fn scene_assets(&self) -> SceneAssets {
        let dir = &self.assets.dir;
        SceneAssets {
            guard_obj: dir.join(&self.assets.guard_obj),
            floor_texture: dir.join(&self.assets.floor_texture),
            cube_texture: dir.join(&self.assets.cube_texture),
            palette: self.palette(),
        }
    }
}

/// Value of `--config=PATH`, if given.
pub fn config_path_from_args<A: AsRef<str>>(args: &[A]) -> Option<PathBuf> {
    args.iter()
        .filter_map(|a| a.as_ref().strip_prefix("--config="))
        .next_back()
        .map(PathBuf::from)
}

fn parse_size(val: &str) -> Option<(u32, u32)> {
    let (w, h) = val.split_once('x').or_else(|| val.split_once('X'))?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// `--name` is on; `--name=on|off` (or 1/0, true/false, yes/no) sets it explicitly.
fn parse_switch(arg: &str, name: &str) -> Option<bool> {
    let rest = arg.strip_prefix(name)?;
    if rest.is_empty() {
        return Some(true);
    }
    let val = rest.strip_prefix('=')?;
    Some(matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    ))
}

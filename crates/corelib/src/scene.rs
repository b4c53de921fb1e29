//! Per-frame scene state owned by the application: camera, toggles and
//! the lighting/fog parameters derived from them.

use crate::Vec3;
use crate::camera::FpsCamera;
use crate::input::{Action, InputState, ToggleLatch};
use crate::stats::FrameStats;

/// Exponential-squared fog density when fog is on.
pub const FOG_DENSITY: f32 = 0.06;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DayNight {
    #[default]
    Day,
    Night,
}

impl DayNight {
    pub fn toggled(self) -> Self {
        match self {
            DayNight::Day => DayNight::Night,
            DayNight::Night => DayNight::Day,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayNight::Day => "DAY",
            DayNight::Night => "NIGHT",
        }
    }
}

/// Flashlight cone attached to the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spotlight {
    pub inner_cutoff_deg: f32,
    pub outer_cutoff_deg: f32,
    pub color: Vec3,
}

/// Phong parameters for the current mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub clear_color: Vec3,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub ambient_strength: f32,
    pub spec_strength: f32,
    pub shininess: f32,
    pub spotlight: Option<Spotlight>,
}

impl Lighting {
    pub fn for_mode(mode: DayNight) -> Self {
        match mode {
            DayNight::Day => Self {
                clear_color: Vec3::new(0.62, 0.70, 0.85),
                light_position: Vec3::new(4.0, 10.0, 6.0),
                light_color: Vec3::new(2.5, 2.5, 2.5),
                ambient_strength: 0.30,
                spec_strength: 0.65,
                shininess: 64.0,
                spotlight: None,
            },
            DayNight::Night => Self {
                clear_color: Vec3::new(0.03, 0.03, 0.05),
                light_position: Vec3::new(4.0, 10.0, 6.0),
                light_color: Vec3::new(0.9, 0.9, 1.0),
                ambient_strength: 0.06,
                spec_strength: 0.75,
                shininess: 64.0,
                spotlight: Some(Spotlight {
                    inner_cutoff_deg: 12.5,
                    outer_cutoff_deg: 17.5,
                    color: Vec3::new(1.0, 0.95, 0.8),
                }),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    /// Zero disables fog.
    pub density: f32,
}

impl Fog {
    /// Fog blends into the sky, so it takes the clear colour.
    pub fn new(enabled: bool, lighting: &Lighting) -> Self {
        Self {
            color: lighting.clear_color,
            density: if enabled { FOG_DENSITY } else { 0.0 },
        }
    }
}

/// Mutable demo state, passed explicitly into update and render.
#[derive(Debug)]
pub struct SceneState {
    pub camera: FpsCamera,
    pub mode: DayNight,
    pub fog_enabled: bool,
    pub overlay_enabled: bool,
    pub show_fps: bool,
    pub stats: FrameStats,
    day_night_latch: ToggleLatch,
    fog_latch: ToggleLatch,
    overlay_latch: ToggleLatch,
    last_time: Option<f32>,
}

impl SceneState {
    pub fn new(camera: FpsCamera, mode: DayNight, fog_enabled: bool, show_fps: bool) -> Self {
        Self {
            camera,
            mode,
            fog_enabled,
            overlay_enabled: true,
            show_fps,
            stats: FrameStats::default(),
            day_night_latch: ToggleLatch::default(),
            fog_latch: ToggleLatch::default(),
            overlay_latch: ToggleLatch::default(),
            last_time: None,
        }
    }

    /// Advance to absolute time `t` (seconds) and apply this frame's input.
    /// Returns the frame delta; the first call yields 0.
    pub fn update(&mut self, t: f32, input: &mut InputState) -> f32 {
        let dt = self.last_time.map_or(0.0, |last| (t - last).max(0.0));
        self.last_time = Some(t);
        self.stats.tick(dt);

        let look = input.take_mouse_delta();
        self.camera.look(look.x, look.y);
        self.camera.translate(input.movement(), dt);

        if self
            .day_night_latch
            .update(input.is_held(Action::ToggleDayNight))
        {
            self.mode = self.mode.toggled();
            log::info!("Switched to {} mode", self.mode.label());
        }
        if self.fog_latch.update(input.is_held(Action::ToggleFog)) {
            self.fog_enabled = !self.fog_enabled;
            log::info!("Fog {}", on_off(self.fog_enabled));
        }
        if self
            .overlay_latch
            .update(input.is_held(Action::ToggleOverlay))
        {
            self.overlay_enabled = !self.overlay_enabled;
        }

        dt
    }

    pub fn lighting(&self) -> Lighting {
        Lighting::for_mode(self.mode)
    }

    pub fn fog(&self) -> Fog {
        Fog::new(self.fog_enabled, &self.lighting())
    }

    /// Text shown in the overlay panel; empty when the overlay is hidden.
    pub fn overlay_lines(&self) -> Vec<String> {
        if !self.overlay_enabled {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(5);
        if self.show_fps {
            match self.stats.fps() {
                Some(fps) => lines.push(format!("FPS: {fps:.0}")),
                None => lines.push("FPS: --".to_string()),
            }
        }
        lines.push(format!("MODE: {} [F]", self.mode.label()));
        lines.push(format!("FOG: {} [G]", on_off(self.fog_enabled).to_uppercase()));
        lines.push("WASD MOVE  Q/E DOWN/UP".to_string());
        lines.push("MOUSE LOOK  H HIDE  ESC QUIT".to_string());
        lines
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(FpsCamera::default(), DayNight::Day, false, false)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

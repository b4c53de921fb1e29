use crate::{Mat4, Vec3};

/// Movement intent for one frame; each axis is -1, 0 or 1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Movement {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl Movement {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }
}

/// First-person mouse-look camera (right-handed, angles in degrees).
#[derive(Clone, Copy, Debug)]
pub struct FpsCamera {
    pub position: Vec3,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
    /// Degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// World units per second.
    pub move_speed: f32,
}

impl FpsCamera {
    pub const PITCH_LIMIT_DEG: f32 = 89.0;

    pub fn new(position: Vec3, yaw_deg: f32, pitch_deg: f32, aspect: f32) -> Self {
        Self {
            position,
            yaw_deg,
            pitch_deg: pitch_deg.clamp(-Self::PITCH_LIMIT_DEG, Self::PITCH_LIMIT_DEG),
            up: Vec3::Y,
            fov_y_rad: 60f32.to_radians(),
            z_near: 0.1,
            z_far: 200.0,
            aspect,
            mouse_sensitivity: 0.1,
            move_speed: 4.0,
        }
    }

    /// Apply a mouse delta in pixels (screen y grows downwards).
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw_deg += dx * self.mouse_sensitivity;
        self.pitch_deg = (self.pitch_deg - dy * self.mouse_sensitivity)
            .clamp(-Self::PITCH_LIMIT_DEG, Self::PITCH_LIMIT_DEG);
    }

    /// Unit view direction derived from yaw/pitch.
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw_deg.to_radians(), self.pitch_deg.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(self.up).normalize()
    }

    /// Fly along front/right/up at `move_speed`.
    pub fn translate(&mut self, movement: Movement, dt: f32) {
        if movement.is_idle() {
            return;
        }
        let vel = self.move_speed * dt;
        self.position += self.front() * (movement.forward * vel)
            + self.right() * (movement.right * vel)
            + self.up * (movement.up * vel);
    }

    /// Update aspect from a framebuffer size; zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up)
    }

    /// Depth maps to [0, 1], matching wgpu clip space.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.5, 6.0), -90.0, 0.0, 16.0 / 9.0)
    }
}

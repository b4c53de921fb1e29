//! Uniform blocks shared with `shaders/scene.wgsl`. Every member is a
//! `mat4`/`vec4`, so the Rust layout matches WGSL's uniform layout rules.

use bytemuck::{Pod, Zeroable};
use corelib::scene::SceneState;
use corelib::transform::Transform;
use corelib::{Mat4, Vec3};

/// Per-frame camera, lighting and fog parameters (group 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_pos: [f32; 4],
    /// rgb = light colour, a = ambient strength.
    pub light_color: [f32; 4],
    /// x = specular strength, y = shininess, z = spotlight on (0/1).
    pub material: [f32; 4],
    /// xyz = spotlight direction, w = cos(inner cutoff).
    pub spot_dir: [f32; 4],
    /// rgb = spotlight colour, w = cos(outer cutoff).
    pub spot_color: [f32; 4],
    /// rgb = fog colour, a = density (0 disables).
    pub fog: [f32; 4],
}

impl FrameUniform {
    pub fn from_state(state: &SceneState) -> Self {
        let cam = &state.camera;
        let lighting = state.lighting();
        let fog = state.fog();

        let (spot_on, spot_color, inner, outer) = match lighting.spotlight {
            Some(spot) => (
                1.0,
                spot.color,
                spot.inner_cutoff_deg.to_radians().cos(),
                spot.outer_cutoff_deg.to_radians().cos(),
            ),
            None => (0.0, Vec3::ZERO, 1.0, 1.0),
        };

        Self {
            view_proj: cam.proj_view().to_cols_array_2d(),
            camera_pos: cam.position.extend(1.0).to_array(),
            light_pos: lighting.light_position.extend(1.0).to_array(),
            light_color: lighting
                .light_color
                .extend(lighting.ambient_strength)
                .to_array(),
            material: [lighting.spec_strength, lighting.shininess, spot_on, 0.0],
            spot_dir: cam.front().extend(inner).to_array(),
            spot_color: spot_color.extend(outer).to_array(),
            fog: fog.color.extend(fog.density).to_array(),
        }
    }
}

/// Per-object placement and colour (group 1).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb = base colour, a = 1 to take albedo from the bound texture.
    pub base_color: [f32; 4],
}

impl ObjectUniform {
    pub fn new(transform: &Transform, base_color: Vec3, textured: bool) -> Self {
        Self {
            model: transform.matrix().to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(transform.normal_matrix()).to_cols_array_2d(),
            base_color: base_color
                .extend(if textured { 1.0 } else { 0.0 })
                .to_array(),
        }
    }
}

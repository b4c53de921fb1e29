//! GPU vertex buffers for flattened triangle lists and OBJ material groups.

use asset::mesh::{MaterialGroups, MeshVertex};
use corelib::Vec3;
use corelib::palette::MaterialPalette;
use wgpu::{Buffer, BufferUsages, Device, VertexBufferLayout, VertexStepMode, util::DeviceExt};

/// Layout of [`MeshVertex`]: position, normal, uv.
pub const MESH_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<MeshVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
};

/// Non-indexed vertex buffer.
pub struct GpuMesh {
    pub vertex_buf: Buffer,
    pub vertex_count: u32,
}

impl GpuMesh {
    /// Upload `vertices` as-is. Returns `None` for an empty list.
    pub fn from_vertices(device: &Device, label: &str, vertices: &[MeshVertex]) -> Option<Self> {
        if vertices.is_empty() {
            return None;
        }
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: BufferUsages::VERTEX,
        });
        Some(Self {
            vertex_buf,
            vertex_count: vertices.len() as u32,
        })
    }
}

/// What will be uploaded for one material group.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDraw {
    pub name: String,
    pub color: Vec3,
    pub vertex_count: usize,
    pub byte_len: usize,
}

/// One draw per non-empty group, coloured from `palette`.
pub fn plan_material_draws(
    groups: &MaterialGroups,
    palette: &MaterialPalette,
) -> Vec<MaterialDraw> {
    groups
        .iter()
        .filter(|(_, vertices)| !vertices.is_empty())
        .map(|(name, vertices)| {
            if !palette.contains(name) {
                log::debug!("Material '{}' not in palette, using default colour", name);
            }
            MaterialDraw {
                name: name.to_owned(),
                color: palette.color_for(name),
                vertex_count: vertices.len(),
                byte_len: std::mem::size_of_val(vertices),
            }
        })
        .collect()
}

/// Material group living on the GPU.
pub struct MaterialMesh {
    pub name: String,
    pub color: Vec3,
    pub mesh: GpuMesh,
}

/// Upload every non-empty group into its own vertex buffer.
pub fn upload_material_groups(
    device: &Device,
    groups: &MaterialGroups,
    palette: &MaterialPalette,
) -> Vec<MaterialMesh> {
    plan_material_draws(groups, palette)
        .into_iter()
        .filter_map(|draw| {
            let vertices = groups.get(&draw.name)?;
            let label = format!("OBJ VB [{}]", draw.name);
            let mesh = GpuMesh::from_vertices(device, &label, vertices)?;
            log::debug!(
                "Uploaded material '{}': {} vertices, {} bytes",
                draw.name,
                draw.vertex_count,
                draw.byte_len
            );
            Some(MaterialMesh {
                name: draw.name,
                color: draw.color,
                mesh,
            })
        })
        .collect()
}

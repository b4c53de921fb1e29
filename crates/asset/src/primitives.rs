//! Built-in non-indexed meshes: the textured cube and the ground plane.

use crate::mesh::{MeshVertex, TriangleList};

/// Unit cube centred at the origin, 36 vertices, per-face normals and 0..1 UVs.
pub fn cube() -> TriangleList {
    // (normal, u axis, v axis) per face; corners are normal/2 +- u/2 +- v/2.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    // Two CCW triangles in (u, v) face space.
    const CORNERS: [[f32; 2]; 6] = [
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
    ];

    let mut vertices = Vec::with_capacity(36);
    for (n, u_axis, v_axis) in FACES {
        for [u, v] in CORNERS {
            let position = std::array::from_fn(|i| {
                0.5 * n[i] + (u - 0.5) * u_axis[i] + (v - 0.5) * v_axis[i]
            });
            vertices.push(MeshVertex::new(position, n, [u, v]));
        }
    }
    vertices
}

/// Square ground plane at height `y`, facing +Y, with UVs tiling `uv_repeat` times.
pub fn ground_plane(half_extent: f32, y: f32, uv_repeat: f32) -> TriangleList {
    let e = half_extent;
    let r = uv_repeat;
    let up = [0.0, 1.0, 0.0];
    let corner = |x: f32, z: f32, u: f32, v: f32| MeshVertex::new([x, y, z], up, [u, v]);
    vec![
        corner(-e, -e, 0.0, 0.0),
        corner(e, e, r, r),
        corner(e, -e, r, 0.0),
        corner(-e, -e, 0.0, 0.0),
        corner(-e, e, 0.0, r),
        corner(e, e, r, r),
    ]
}

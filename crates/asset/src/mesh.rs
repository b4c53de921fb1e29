//! CPU-side mesh representation used by loaders.

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};

/// Normal used when a face vertex does not reference one.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
/// Texture coordinate used when a face vertex does not reference one.
pub const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

/// Interleaved vertex with position/normal/uv. Values are in object space.
///
/// Laid out for direct upload: 32 bytes, `Float32x3, Float32x3, Float32x2`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl Default for MeshVertex {
    fn default() -> Self {
        Self::new([0.0; 3], DEFAULT_NORMAL, DEFAULT_UV)
    }
}

/// Flattened triangle list (three vertices per triangle, no index buffer).
pub type TriangleList = Vec<MeshVertex>;

/// Triangle lists keyed by material name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialGroups {
    groups: BTreeMap<String, TriangleList>,
}

impl MaterialGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one triangle to `material`, creating the group on first use.
    pub fn push_triangle(&mut self, material: &str, tri: [MeshVertex; 3]) {
        match self.groups.get_mut(material) {
            Some(list) => list.extend_from_slice(&tri),
            None => {
                self.groups.insert(material.to_owned(), tri.to_vec());
            }
        }
    }

    pub fn get(&self, material: &str) -> Option<&[MeshVertex]> {
        self.groups.get(material).map(Vec::as_slice)
    }

    /// Number of material groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MeshVertex])> {
        self.groups
            .iter()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }

    /// Total vertex count across all groups.
    pub fn vertex_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Remove groups that ended up without any triangle.
    pub fn drop_empty(&mut self) {
        self.groups.retain(|_, list| !list.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
        let v = MeshVertex::default();
        assert_eq!(v.normal, DEFAULT_NORMAL);
        assert_eq!(v.uv, DEFAULT_UV);
    }

    #[test]
    fn triangles_accumulate_per_material() {
        let mut groups = MaterialGroups::new();
        let tri = [MeshVertex::default(); 3];
        groups.push_triangle("Wood", tri);
        groups.push_triangle("Stone", tri);
        groups.push_triangle("Wood", tri);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("Wood").map(<[_]>::len), Some(6));
        assert_eq!(groups.get("Stone").map(<[_]>::len), Some(3));
        assert_eq!(groups.vertex_count(), 9);
    }
}

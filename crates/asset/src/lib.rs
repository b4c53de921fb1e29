//! Asset loading/parsers (meshes, textures).
//! OBJ meshes are grouped by material; primitives cover the built-in cube and ground.

pub mod mesh;
pub mod obj;
pub mod primitives;
pub mod texture;

pub use mesh::{MaterialGroups, MeshVertex};
pub use obj::{ObjError, load_obj_by_material};

//! Material name -> base colour lookup used when shading OBJ material groups.

use std::collections::HashMap;

use crate::Vec3;

/// Colour for materials the palette does not know.
pub const DEFAULT_MATERIAL_COLOR: Vec3 = Vec3::ONE;

#[derive(Clone, Debug, Default)]
pub struct MaterialPalette {
    colors: HashMap<String, Vec3>,
}

impl MaterialPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colours for the parts of the bundled guard model.
    pub fn guard() -> Self {
        [
            ("Boots", Vec3::new(0.18, 0.12, 0.08)),
            ("Trousers", Vec3::new(0.22, 0.24, 0.30)),
            ("Tunic", Vec3::new(0.55, 0.10, 0.10)),
            ("Skin", Vec3::new(0.85, 0.65, 0.50)),
            ("Helmet", Vec3::new(0.60, 0.62, 0.66)),
            ("Spear", Vec3::new(0.45, 0.35, 0.22)),
        ]
        .into_iter()
        .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, color: Vec3) {
        self.colors.insert(name.into(), color);
    }

    pub fn color_for(&self, name: &str) -> Vec3 {
        self.colors
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_MATERIAL_COLOR)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec3)> for MaterialPalette {
    fn from_iter<I: IntoIterator<Item = (S, Vec3)>>(iter: I) -> Self {
        let mut palette = Self::new();
        palette.extend(iter);
        palette
    }
}

impl<S: Into<String>> Extend<(S, Vec3)> for MaterialPalette {
    fn extend<I: IntoIterator<Item = (S, Vec3)>>(&mut self, iter: I) {
        for (name, color) in iter {
            self.insert(name, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_material_is_white() {
        let palette = MaterialPalette::guard();
        assert_eq!(palette.color_for("Mystery"), Vec3::ONE);
        assert_eq!(palette.color_for("default"), DEFAULT_MATERIAL_COLOR);
        assert_eq!(palette.color_for("Helmet"), Vec3::new(0.60, 0.62, 0.66));
    }

    #[test]
    fn overrides_replace_builtin_colours() {
        let mut palette = MaterialPalette::guard();
        let before = palette.len();
        palette.extend([("Helmet", Vec3::ZERO), ("Cape", Vec3::X)]);
        assert_eq!(palette.len(), before + 1);
        assert_eq!(palette.color_for("Helmet"), Vec3::ZERO);
        assert!(palette.contains("Cape"));
    }
}

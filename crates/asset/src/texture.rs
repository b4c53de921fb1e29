//! Texture decoding into CPU-side RGBA8 buffers.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture data is {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::Rgba8 => 4,
        }
    }
}

impl TextureData {
    /// Wrap raw RGBA8 pixels, checking the buffer length.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Decode a PNG/JPEG file. `flip_vertical` puts the first image row at v = 0
    /// for meshes authored with a bottom-left UV origin.
    pub fn load(path: impl AsRef<Path>, flip_vertical: bool) -> Result<Self, TextureError> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let img = if flip_vertical { img.flipv() } else { img };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded texture {}x{} from {:?}", width, height, path);

        Self::new_rgba8(width, height, rgba.into_raw())
    }

    /// Like [`TextureData::load`], but a missing or broken file yields a
    /// checkerboard instead of an error.
    pub fn load_or_checkerboard(path: impl AsRef<Path>, flip_vertical: bool) -> Self {
        match Self::load(path, flip_vertical) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("{err}; using checkerboard texture");
                Self::checkerboard(64)
            }
        }
    }

    /// White/gray checkerboard with 8px cells.
    pub fn checkerboard(size: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }

        Self {
            data,
            width: size,
            height: size,
            format: TextureFormat::Rgba8,
        }
    }

    /// Bytes in one row of pixels.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.format.bytes_per_pixel()
    }

    pub fn is_valid(&self) -> bool {
        let expected = (self.bytes_per_row() * self.height) as usize;
        self.data.len() == expected && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::checkerboard(16);
        assert!(tex.is_valid());
        assert_eq!(tex.bytes_per_row(), 64);
        assert_eq!(&tex.data[0..4], &[255, 255, 255, 255]);
        // x = 8 starts the second cell.
        assert_eq!(&tex.data[32..36], &[128, 128, 128, 255]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let err = TextureData::new_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, TextureError::SizeMismatch { expected: 16, .. }));
    }

    #[test]
    fn missing_file_falls_back_to_checkerboard() {
        assert!(TextureData::load("no/such/texture.png", true).is_err());
        let tex = TextureData::load_or_checkerboard("no/such/texture.png", true);
        assert!(tex.is_valid());
        assert_eq!(tex.width, 64);
    }
}

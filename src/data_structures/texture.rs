//! Decoded texture images.
//!
//! An [`Image`] is the in-memory result of decoding a texture file through an
//! [`ImageCodec`](crate::resources::texture::ImageCodec). Once stored in the
//! [`ResourceManager`](crate::context::ResourceManager) it is owned there and
//! referenced by an [`ImageHandle`](crate::context::ImageHandle).

/// A tightly packed RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major, top row first.
    pub data: Vec<u8>,
}

impl Image {
    /// Bytes per pixel of the stored layout.
    pub const CHANNELS: usize = 4;

    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// A single-colour image, handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .cycle()
            .take(Self::byte_len(width, height).unwrap_or_default())
            .copied()
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Number of bytes an RGBA8 image of the given size occupies, or `None`
    /// if that does not fit in memory.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(Self::CHANNELS)
    }

    /// Whether `data` holds exactly one RGBA8 value per pixel.
    pub fn is_consistent(&self) -> bool {
        Self::byte_len(self.width, self.height) == Some(self.data.len())
    }
}

//! Surface materials.

use crate::context::ImageHandle;

/// Longest material name (in bytes) that a model can carry.
pub const MAX_MATERIAL_NAME_LEN: usize = 64;

/// Classic MTL-style material record.
///
/// Colour coefficients are RGB triples. A material is `textured` exactly when
/// it holds an `image`; the flag is kept explicitly because the binary format
/// stores it.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// `Ni`
    pub optical_density: f32,
    /// `Ns`
    pub shininess: f32,
    /// `Ka`
    pub ambient: [f32; 3],
    /// `Ke`
    pub emission: [f32; 3],
    /// `Kd`
    pub diffuse: [f32; 3],
    /// `Ks`
    pub specular: [f32; 3],
    /// `Tf`
    pub transmission_filter: [f32; 3],
    /// `Tr`
    pub transparency: f32,
    /// `d`
    pub dissolve: f32,
    /// `illum`
    pub illumination_model: u32,
    pub textured: bool,
    pub image: Option<ImageHandle>,
}

impl Material {
    /// Sets the diffuse image and keeps the `textured` flag in sync.
    pub fn with_image(mut self, image: Option<ImageHandle>) -> Self {
        self.textured = image.is_some();
        self.image = image;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            optical_density: 1.0,
            shininess: 1.0,
            ambient: [0.0; 3],
            emission: [0.0; 3],
            diffuse: [0.0; 3],
            specular: [0.0; 3],
            transmission_filter: [0.0; 3],
            transparency: 0.0,
            dissolve: 1.0,
            illumination_model: 0,
            textured: false,
            image: None,
        }
    }
}

/// Cuts `name` down to [`MAX_MATERIAL_NAME_LEN`] bytes without splitting a
/// character. Returns the input unchanged when it already fits.
pub fn bounded_name(name: &str) -> String {
    if name.len() <= MAX_MATERIAL_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_MATERIAL_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    log::warn!(
        "Material name '{}' exceeds {} bytes and was truncated.",
        name,
        MAX_MATERIAL_NAME_LEN
    );
    name[..end].to_string()
}

//! The fixed-size vertex record shared by the dedup engine, the pools and the
//! binary codec.

/// One renderer vertex: position, normal, texture coordinates and colour.
///
/// The layout is `#[repr(C)]` and [`bytemuck::Pod`] so that pool slices can be
/// written to and read from model files without per-field encoding.
/// Equality is plain structural equality over every component and is the key
/// used for deduplication.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Opaque white. Source colours are never read.
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            color: Self::WHITE,
        }
    }

    /// Bit pattern used as a hash key. `-0.0` is folded onto `0.0` so that
    /// every pair of vertices that compare equal share a key.
    pub(crate) fn hash_key(&self) -> [u32; 12] {
        let mut key = [0u32; 12];
        let floats: &[f32; 12] = bytemuck::cast_ref(self);
        for (k, f) in key.iter_mut().zip(floats) {
            *k = if *f == 0.0 { 0 } else { f.to_bits() };
        }
        key
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new([0.0; 3], [1.0, 0.0, 0.0], [0.0; 2])
    }
}

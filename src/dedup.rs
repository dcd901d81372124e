//! Vertex deduplication.
//!
//! Face corners reference positions, normals and texture coordinates through
//! independent indices. The renderer wants a single index per vertex, so every
//! corner is resolved into a full [`Vertex`] and collapsed onto the first
//! structurally equal vertex seen so far.
//!
//! A [`VertexDeduplicator`] is shared by all shapes of one model: each shape
//! gets its own local index list while the unique vertex set keeps growing,
//! which lets every surface of the model reference a single vertex range.

use std::collections::HashMap;

use cgmath::Zero;

use crate::{
    data_structures::vertex::Vertex,
    resources::{FaceVertex, MeshAttributes},
};

/// Growing set of unique vertices.
///
/// Lookups go through a hash of the vertex bit pattern; candidates in a bucket
/// are confirmed with `==`, so the result matches a linear scan for the first
/// equal vertex.
#[derive(Debug, Default)]
pub struct VertexDeduplicator {
    unique: Vec<Vertex>,
    lookup: HashMap<[u32; 12], Vec<u32>>,
}

impl VertexDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of `vertex` in the unique set, appending it if no
    /// equal vertex exists yet.
    pub fn insert(&mut self, vertex: Vertex) -> u32 {
        let bucket = self.lookup.entry(vertex.hash_key()).or_default();
        if let Some(&existing) = bucket
            .iter()
            .find(|&&i| self.unique[i as usize] == vertex)
        {
            return existing;
        }
        let index = self.unique.len() as u32;
        bucket.push(index);
        self.unique.push(vertex);
        index
    }

    /// Resolves and deduplicates the corners of one shape. The returned list
    /// has one entry per corner, in order.
    pub fn dedup_shape<'a>(
        &mut self,
        attributes: &MeshAttributes,
        corners: impl IntoIterator<Item = &'a FaceVertex>,
    ) -> Vec<u32> {
        corners
            .into_iter()
            .map(|corner| self.insert(resolve_vertex(attributes, corner)))
            .collect()
    }

    pub fn unique(&self) -> &[Vertex] {
        &self.unique
    }

    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    pub fn into_unique(self) -> Vec<Vertex> {
        self.unique
    }
}

/// Deduplicates a single corner sequence. Returns the unique vertices and one
/// index per input corner.
pub fn deduplicate<'a>(
    attributes: &MeshAttributes,
    corners: impl IntoIterator<Item = &'a FaceVertex>,
) -> (Vec<Vertex>, Vec<u32>) {
    let mut dedup = VertexDeduplicator::new();
    let indices = dedup.dedup_shape(attributes, corners);
    (dedup.into_unique(), indices)
}

/// Builds the vertex a corner describes.
///
/// Missing or out-of-range references fall back to defaults: the origin for
/// positions, `+X` for normals (so lighting never sees a zero normal) and
/// `(0, 0)` for texture coordinates. Colour is always opaque white. Texture
/// coordinates are normalized with [`normalize_uv`].
pub fn resolve_vertex(attributes: &MeshAttributes, corner: &FaceVertex) -> Vertex {
    let position = lookup(&attributes.positions, corner.position)
        .unwrap_or_else(cgmath::Vector3::zero);
    let normal = lookup(&attributes.normals, corner.normal)
        .unwrap_or_else(cgmath::Vector3::unit_x);
    let uv = lookup(&attributes.uvs, corner.uv).unwrap_or_else(cgmath::Vector2::zero);

    Vertex::new(position.into(), normal.into(), normalize_uv(uv.into()))
}

fn lookup<T: Copy>(values: &[T], index: i64) -> Option<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| values.get(i))
        .copied()
}

/// Maps source texture coordinates into the renderer's `[0, 1]` top-left
/// convention.
///
/// Components above `1` lose their integer part, the result is clamped to
/// `[0, 1]` (negative values clamp to `0` rather than wrapping), and `v` is
/// flipped.
pub fn normalize_uv(uv: [f32; 2]) -> [f32; 2] {
    let saturate = |c: f32| {
        let c = if c > 1.0 { c - c.floor() } else { c };
        if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }
    };
    [saturate(uv[0]), 1.0 - saturate(uv[1])]
}

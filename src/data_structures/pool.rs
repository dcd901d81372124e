//! Append-only vertex and index pools.

use std::ops::Range;

use crate::data_structures::vertex::Vertex;

/// An append-only buffer whose first element sits at logical offset `base`.
///
/// Offsets handed out by a pool are always logical: `base + position`. Fresh
/// pools start at `0`; the model loader recreates pools at the base offset
/// recorded in a file so that stored ranges stay valid verbatim.
#[derive(Clone, Debug, Default)]
pub struct BufferPool<T> {
    base: u32,
    data: Vec<T>,
}

pub type VertexPool = BufferPool<Vertex>;
pub type IndexPool = BufferPool<u32>;

impl<T: Copy> BufferPool<T> {
    pub fn new() -> Self {
        Self::with_base(0)
    }

    pub fn with_base(base: u32) -> Self {
        Self {
            base,
            data: Vec::new(),
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// The write cursor: logical offset of the next element.
    pub fn offset(&self) -> u32 {
        self.base + self.data.len() as u32
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.data.extend_from_slice(values);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in the logical range, or `None` if it leaves the pool.
    pub fn slice(&self, range: Range<u32>) -> Option<&[T]> {
        if range.start < self.base || range.start > range.end {
            return None;
        }
        let start = (range.start - self.base) as usize;
        let end = (range.end - self.base) as usize;
        self.data.get(start..end)
    }
}

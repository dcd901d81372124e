//! Models and their surfaces.
//!
//! A [`Model`] never owns geometry. Its [`Surface`]s are ranges into vertex and
//! index pools owned by the [`ResourceManager`], and its material table holds
//! handles to materials stored there as well.

use std::ops::Range;

use crate::{
    context::{IndexPoolHandle, MaterialHandle, ResourceManager, VertexPoolHandle},
    data_structures::material::Material,
    error::Result,
};

/// One drawable partition of a model.
///
/// `[vb_offset, vb_end)` and `[ib_offset, ib_end)` are logical pool offsets.
/// Index values stored in `[ib_offset, ib_end)` are pool-absolute and fall
/// inside `[vb_offset, vb_end)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Surface {
    pub vb_offset: u32,
    pub vb_end: u32,
    pub ib_offset: u32,
    pub ib_end: u32,
    /// Index into the owning model's material table.
    pub material_id: u32,
}

impl Surface {
    pub fn vertex_range(&self) -> Range<u32> {
        self.vb_offset..self.vb_end
    }

    pub fn index_range(&self) -> Range<u32> {
        self.ib_offset..self.ib_end
    }

    pub fn vertex_count(&self) -> u32 {
        self.vb_end.saturating_sub(self.vb_offset)
    }

    pub fn index_count(&self) -> u32 {
        self.ib_end.saturating_sub(self.ib_offset)
    }

    pub fn triangle_count(&self) -> u32 {
        self.index_count() / 3
    }

    /// Checks the range invariants: ordered bounds and whole triangles.
    pub fn is_well_formed(&self) -> bool {
        self.vb_offset <= self.vb_end
            && self.ib_offset <= self.ib_end
            && self.index_count() % 3 == 0
    }
}

/// A converted model: a name, surfaces in source shape order, a material
/// table and the pools it was built against.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub name: String,
    pub surfaces: Vec<Surface>,
    pub materials: Vec<MaterialHandle>,
    pub vb: VertexPoolHandle,
    pub ib: IndexPoolHandle,
}

impl Model {
    /// Number of populated entries in the material table.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Smallest vertex range covering every surface; empty when there are no
    /// surfaces.
    pub fn vertex_range(&self) -> Range<u32> {
        covering(self.surfaces.iter().map(Surface::vertex_range))
    }

    /// Smallest index range covering every surface; empty when there are no
    /// surfaces.
    pub fn index_range(&self) -> Range<u32> {
        covering(self.surfaces.iter().map(Surface::index_range))
    }

    /// Looks up the material a surface refers to.
    ///
    /// Surfaces default to material id `0` even when the model has no
    /// materials at all. That case, like any id past the end of the table,
    /// resolves to `None` and the renderer is expected to fall back to its
    /// default material.
    pub fn resolve_material<'a>(
        &self,
        rm: &'a ResourceManager,
        surface: &Surface,
    ) -> Result<Option<&'a Material>> {
        match self.materials.get(surface.material_id as usize) {
            Some(handle) => rm.material(*handle).map(Some),
            None => Ok(None),
        }
    }
}

fn covering(mut ranges: impl Iterator<Item = Range<u32>>) -> Range<u32> {
    let Some(first) = ranges.next() else {
        return 0..0;
    };
    ranges.fold(first, |acc, r| acc.start.min(r.start)..acc.end.max(r.end))
}

//! The resource manager: the owned context every conversion runs against.
//!
//! It is the allocator and registry for vertex pools, index pools, models,
//! materials and images. Every entity is addressed by a typed generational
//! handle, so stale or foreign handles are reported as
//! [`ConvertError::InvalidHandle`] instead of aliasing another entry.
//!
//! There is no global instance. Callers construct one per conversion (or one
//! per batch when models should share pools) and pass it explicitly.

use std::ops::Range;

use slotmap::{SlotMap, new_key_type};

use crate::{
    data_structures::{
        material::Material,
        model::Model,
        pool::{IndexPool, VertexPool},
        texture::Image,
        vertex::Vertex,
    },
    error::{ConvertError, Result},
};

new_key_type! {
    pub struct VertexPoolHandle;
    pub struct IndexPoolHandle;
    pub struct ModelHandle;
    pub struct MaterialHandle;
    pub struct ImageHandle;
}

#[derive(Debug, Default)]
pub struct ResourceManager {
    vertex_pools: SlotMap<VertexPoolHandle, VertexPool>,
    index_pools: SlotMap<IndexPoolHandle, IndexPool>,
    models: SlotMap<ModelHandle, Model>,
    materials: SlotMap<MaterialHandle, Material>,
    images: SlotMap<ImageHandle, Image>,
    current_vb: Option<VertexPoolHandle>,
    current_ib: Option<IndexPoolHandle>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager with one empty vertex pool and one empty index pool, both
    /// already pushed.
    pub fn with_fresh_pools() -> Self {
        let mut rm = Self::new();
        rm.current_vb = Some(rm.alloc_vb());
        rm.current_ib = Some(rm.alloc_ib());
        rm
    }

    /// Allocates an empty vertex pool starting at offset `0`.
    pub fn alloc_vb(&mut self) -> VertexPoolHandle {
        self.alloc_vb_at(0)
    }

    /// Allocates an empty index pool starting at offset `0`.
    pub fn alloc_ib(&mut self) -> IndexPoolHandle {
        self.alloc_ib_at(0)
    }

    /// Allocates an empty vertex pool whose first element lands at `base`.
    pub fn alloc_vb_at(&mut self, base: u32) -> VertexPoolHandle {
        self.vertex_pools.insert(VertexPool::with_base(base))
    }

    /// Allocates an empty index pool whose first element lands at `base`.
    pub fn alloc_ib_at(&mut self, base: u32) -> IndexPoolHandle {
        self.index_pools.insert(IndexPool::with_base(base))
    }

    /// Makes `handle` the vertex pool that [`add_vertex`](Self::add_vertex)
    /// writes to. Replaces any previously pushed pool.
    pub fn push_vb(&mut self, handle: VertexPoolHandle) -> Result<()> {
        self.vertex_pool(handle)?;
        self.current_vb = Some(handle);
        Ok(())
    }

    /// Makes `handle` the index pool that [`add_index`](Self::add_index)
    /// writes to. Replaces any previously pushed pool.
    pub fn push_ib(&mut self, handle: IndexPoolHandle) -> Result<()> {
        self.index_pool(handle)?;
        self.current_ib = Some(handle);
        Ok(())
    }

    pub fn current_vb(&self) -> Result<VertexPoolHandle> {
        self.current_vb.ok_or(ConvertError::NoCurrentPool("vertex"))
    }

    pub fn current_ib(&self) -> Result<IndexPoolHandle> {
        self.current_ib.ok_or(ConvertError::NoCurrentPool("index"))
    }

    /// Write cursor of the current vertex pool.
    pub fn vb_offset(&self) -> Result<u32> {
        Ok(self.vertex_pool(self.current_vb()?)?.offset())
    }

    /// Write cursor of the current index pool.
    pub fn ib_offset(&self) -> Result<u32> {
        Ok(self.index_pool(self.current_ib()?)?.offset())
    }

    /// Appends to the current vertex pool. No duplicate check is made.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<()> {
        let handle = self.current_vb()?;
        self.vertex_pool_mut(handle)?.push(vertex);
        Ok(())
    }

    /// Appends to the current index pool.
    pub fn add_index(&mut self, index: u32) -> Result<()> {
        let handle = self.current_ib()?;
        self.index_pool_mut(handle)?.push(index);
        Ok(())
    }

    pub fn vertex_pool(&self, handle: VertexPoolHandle) -> Result<&VertexPool> {
        self.vertex_pools
            .get(handle)
            .ok_or(ConvertError::InvalidHandle("vertex pool"))
    }

    pub fn index_pool(&self, handle: IndexPoolHandle) -> Result<&IndexPool> {
        self.index_pools
            .get(handle)
            .ok_or(ConvertError::InvalidHandle("index pool"))
    }

    fn vertex_pool_mut(&mut self, handle: VertexPoolHandle) -> Result<&mut VertexPool> {
        self.vertex_pools
            .get_mut(handle)
            .ok_or(ConvertError::InvalidHandle("vertex pool"))
    }

    fn index_pool_mut(&mut self, handle: IndexPoolHandle) -> Result<&mut IndexPool> {
        self.index_pools
            .get_mut(handle)
            .ok_or(ConvertError::InvalidHandle("index pool"))
    }

    /// Vertices of `pool` in the logical `range`.
    pub fn vertices(&self, pool: VertexPoolHandle, range: Range<u32>) -> Result<&[Vertex]> {
        self.vertex_pool(pool)?
            .slice(range)
            .ok_or(ConvertError::InvalidHandle("vertex range"))
    }

    /// Indices of `pool` in the logical `range`.
    pub fn indices(&self, pool: IndexPoolHandle, range: Range<u32>) -> Result<&[u32]> {
        self.index_pool(pool)?
            .slice(range)
            .ok_or(ConvertError::InvalidHandle("index range"))
    }

    /// Reserves an empty model record.
    pub fn alloc_model(&mut self) -> ModelHandle {
        self.models.insert(Model::default())
    }

    pub fn model(&self, handle: ModelHandle) -> Result<&Model> {
        self.models
            .get(handle)
            .ok_or(ConvertError::InvalidHandle("model"))
    }

    pub fn model_mut(&mut self, handle: ModelHandle) -> Result<&mut Model> {
        self.models
            .get_mut(handle)
            .ok_or(ConvertError::InvalidHandle("model"))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Stores a copy of `material`. Equal materials still get distinct handles.
    pub fn store_material_copy(&mut self, material: &Material) -> MaterialHandle {
        self.materials.insert(material.clone())
    }

    /// Stores a copy of `image`. Equal images still get distinct handles.
    pub fn store_image_copy(&mut self, image: &Image) -> ImageHandle {
        self.images.insert(image.clone())
    }

    pub fn material(&self, handle: MaterialHandle) -> Result<&Material> {
        self.materials
            .get(handle)
            .ok_or(ConvertError::InvalidHandle("material"))
    }

    pub fn image(&self, handle: ImageHandle) -> Result<&Image> {
        self.images
            .get(handle)
            .ok_or(ConvertError::InvalidHandle("image"))
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

//! Turns a parsed [`SourceMesh`] into a [`Model`] inside a [`ResourceManager`].
//!
//! All shapes of a mesh are deduplicated against one shared vertex set which is
//! written to the current vertex pool once. Every surface therefore reports the
//! same `[vb_offset, vb_end)` range and only the index ranges differ.
//!
//! Each shape becomes exactly one surface whose material is the one of the
//! shape's first face. Per-face material changes inside a shape are not
//! split into further surfaces.

use std::path::{Path, PathBuf};

use crate::{
    context::{ModelHandle, ResourceManager},
    data_structures::{
        material::{Material, bounded_name},
        model::Surface,
        texture::Image,
    },
    dedup::VertexDeduplicator,
    error::Result,
    resources::{SourceMaterial, SourceMesh, texture::ImageCodec},
};

pub struct ModelBuilder<'a> {
    rm: &'a mut ResourceManager,
    codec: &'a dyn ImageCodec,
    texture_dir: PathBuf,
}

impl<'a> ModelBuilder<'a> {
    /// Textures named by materials are looked up in `texture_dir` and decoded
    /// through `codec`.
    pub fn new(rm: &'a mut ResourceManager, codec: &'a dyn ImageCodec, texture_dir: &Path) -> Self {
        Self {
            rm,
            codec,
            texture_dir: texture_dir.to_path_buf(),
        }
    }

    /// Builds one model into the currently pushed pools.
    ///
    /// Textures are decoded before anything is written, so a failing texture
    /// leaves the pools and registries untouched.
    pub fn build(&mut self, name: &str, mesh: &SourceMesh) -> Result<ModelHandle> {
        let vb = self.rm.current_vb()?;
        let ib = self.rm.current_ib()?;

        let images = mesh
            .materials
            .iter()
            .map(|m| self.decode_texture(m))
            .collect::<Result<Vec<_>>>()?;

        let mut dedup = VertexDeduplicator::new();
        let local_indices: Vec<Vec<u32>> = mesh
            .shapes
            .iter()
            .map(|shape| dedup.dedup_shape(&mesh.attributes, shape.face_vertices()))
            .collect();

        let vb_offset = self.rm.vb_offset()?;
        for vertex in dedup.unique() {
            self.rm.add_vertex(*vertex)?;
        }
        let vb_end = self.rm.vb_offset()?;

        let mut surfaces = Vec::with_capacity(mesh.shapes.len());
        for (shape, indices) in mesh.shapes.iter().zip(&local_indices) {
            let ib_offset = self.rm.ib_offset()?;
            for &local in indices {
                self.rm.add_index(vb_offset + local)?;
            }
            let ib_end = self.rm.ib_offset()?;

            let source_id = shape.first_face_material().unwrap_or(0);
            let material_id = u32::try_from(source_id).unwrap_or_else(|_| {
                log::warn!(
                    "Shape '{}' of {} references material {} which does not fit a material id.",
                    shape.name,
                    name,
                    source_id
                );
                u32::MAX
            });
            if source_id >= mesh.materials.len() && !mesh.materials.is_empty() {
                log::warn!(
                    "Shape '{}' of {} references material {} but only {} exist.",
                    shape.name,
                    name,
                    source_id,
                    mesh.materials.len()
                );
            }
            surfaces.push(Surface {
                vb_offset,
                vb_end,
                ib_offset,
                ib_end,
                material_id,
            });
        }

        let materials = mesh
            .materials
            .iter()
            .zip(images)
            .map(|(source, image)| {
                let image = image.map(|img| self.rm.store_image_copy(&img));
                let material = to_material(source).with_image(image);
                self.rm.store_material_copy(&material)
            })
            .collect::<Vec<_>>();

        log::info!(
            "Built model '{}': {} surfaces, {} unique vertices, {} indices, {} materials",
            name,
            surfaces.len(),
            vb_end - vb_offset,
            local_indices.iter().map(Vec::len).sum::<usize>(),
            mesh.materials.len()
        );
        if surfaces.is_empty() {
            log::warn!("Model '{}' has no shapes; it will have no surfaces.", name);
        }

        let handle = self.rm.alloc_model();
        let model = self.rm.model_mut(handle)?;
        model.name = name.to_string();
        model.surfaces = surfaces;
        model.materials = materials;
        model.vb = vb;
        model.ib = ib;
        Ok(handle)
    }

    fn decode_texture(&self, material: &SourceMaterial) -> Result<Option<Image>> {
        match &material.diffuse_texture {
            Some(file) => self.codec.decode(&self.texture_dir.join(file)).map(Some),
            None => Ok(None),
        }
    }
}

/// Copies the scalar fields of a source material. The image is attached by
/// the caller.
pub fn to_material(source: &SourceMaterial) -> Material {
    Material {
        name: bounded_name(&source.name),
        optical_density: source.optical_density,
        shininess: source.shininess,
        ambient: source.ambient,
        emission: source.emission,
        diffuse: source.diffuse,
        specular: source.specular,
        transmission_filter: source.transmission_filter,
        transparency: source.transparency,
        dissolve: source.dissolve,
        illumination_model: source.illumination_model,
        textured: false,
        image: None,
    }
}

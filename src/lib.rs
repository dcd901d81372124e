//! mdl-convert
//!
//! An offline converter from Wavefront OBJ/MTL assets and their textures to a
//! compact binary model format a real-time renderer can load directly. Mesh
//! parsing and image decoding are delegated to `tobj` and `image`; this crate
//! owns vertex deduplication, pool packing and the binary layout.
//!
//! High-level modules
//! - `config`: directories and optional outputs of a conversion run
//! - `context`: the resource manager owning pools, models, materials and images
//! - `data_structures`: vertices, pools, models, surfaces, materials and images
//! - `dedup`: collapses face corners into unique vertices plus indices
//! - `builder`: turns parsed meshes into models inside a resource manager
//! - `codec`: reads and writes `.mdl` files
//! - `export`: OBJ re-export and texture previews for manual checks
//! - `flow`: the per-asset and batch conversion flow
//! - `resources`: mesh parser and image codec collaborators
//!

pub mod builder;
pub mod codec;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod dedup;
pub mod error;
pub mod export;
pub mod flow;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use config::{ConverterConfig, PoolMode};
pub use context::{
    ImageHandle, IndexPoolHandle, MaterialHandle, ModelHandle, ResourceManager, VertexPoolHandle,
};
pub use data_structures::{
    material::Material,
    model::{Model, Surface},
    texture::Image,
    vertex::Vertex,
};
pub use error::{ConvertError, FormatError, Result};
pub use flow::{ConversionReport, Converter};
pub use resources::texture::PreviewFormat;

//! Converter data structures: vertices, pools, models, materials and images.
//!
//! - `vertex` holds the fixed-size [`Vertex`](vertex::Vertex) record
//! - `pool` holds the append-only vertex and index pools
//! - `model` holds [`Model`](model::Model) and its [`Surface`](model::Surface)s
//! - `material` holds the MTL-style [`Material`](material::Material)
//! - `texture` holds decoded RGBA8 [`Image`](texture::Image)s

pub mod material;
pub mod model;
pub mod pool;
pub mod texture;
pub mod vertex;

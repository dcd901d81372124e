use std::path::Path;

use crate::error::Result;

/**
 * This module contains all logic for reading meshes, materials and textures from external files.
 *
 * The parsed forms defined here are the boundary to the rest of the converter: everything after
 * this point works on `SourceMesh` and `Image` values only.
 */
pub mod mesh;
pub mod texture;

/// Index value meaning "no attribute referenced".
pub const ABSENT: i64 = -1;

/// One corner of a face: indices into the [`MeshAttributes`] arrays.
///
/// Any index may be negative or past the end of its array. That is not an
/// error; the dedup engine substitutes a default value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: i64,
    pub normal: i64,
    pub uv: i64,
}

impl FaceVertex {
    pub fn new(position: i64, normal: i64, uv: i64) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// A corner that only references a position.
    pub fn position_only(position: i64) -> Self {
        Self::new(position, ABSENT, ABSENT)
    }
}

/// A triangle plus the material the source assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFace {
    pub vertices: [FaceVertex; 3],
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceShape {
    pub name: String,
    pub faces: Vec<SourceFace>,
}

impl SourceShape {
    /// Material of the first face. The whole shape becomes one surface, so
    /// later faces never override it.
    pub fn first_face_material(&self) -> Option<usize> {
        self.faces.first().and_then(|f| f.material)
    }

    /// Corners of every face in order.
    pub fn face_vertices(&self) -> impl Iterator<Item = &FaceVertex> {
        self.faces.iter().flat_map(|f| f.vertices.iter())
    }
}

/// Attribute arrays shared by every shape of a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshAttributes {
    pub positions: Vec<cgmath::Vector3<f32>>,
    pub normals: Vec<cgmath::Vector3<f32>>,
    pub uvs: Vec<cgmath::Vector2<f32>>,
}

/// Material as described by the source, before any texture is decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emission: [f32; 3],
    pub transmission_filter: [f32; 3],
    pub transparency: f32,
    pub dissolve: f32,
    pub optical_density: f32,
    pub shininess: f32,
    pub illumination_model: u32,
    /// File name of the diffuse texture, relative to the texture directory.
    pub diffuse_texture: Option<String>,
}

impl Default for SourceMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.0; 3],
            diffuse: [0.0; 3],
            specular: [0.0; 3],
            emission: [0.0; 3],
            transmission_filter: [0.0; 3],
            transparency: 0.0,
            dissolve: 1.0,
            optical_density: 1.0,
            shininess: 1.0,
            illumination_model: 0,
            diffuse_texture: None,
        }
    }
}

/// Everything the mesh parser produces for one asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMesh {
    pub attributes: MeshAttributes,
    pub shapes: Vec<SourceShape>,
    pub materials: Vec<SourceMaterial>,
}

/// Parses a mesh description file into a [`SourceMesh`].
pub trait MeshParser {
    /// `material_dir` is searched for material libraries the mesh references.
    fn parse(&self, path: &Path, material_dir: &Path) -> Result<SourceMesh>;
}

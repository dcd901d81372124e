use std::{fs::File, io::BufReader, path::Path};

use crate::{
    error::{ConvertError, Result},
    resources::{
        ABSENT, FaceVertex, MeshAttributes, MeshParser, SourceFace, SourceMaterial, SourceMesh,
        SourceShape,
    },
};

/**
 * Wavefront OBJ/MTL parser backed by `tobj`.
 *
 * Meshes are loaded triangulated but *not* single-indexed so that every face corner keeps its
 * own position/normal/uv triple; the converter deduplicates those itself. `tobj` gives every
 * model its own attribute arrays, so they are concatenated here and the corner indices offset
 * accordingly.
 */
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjParser;

impl ObjParser {
    pub fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        }
    }
}

impl MeshParser for ObjParser {
    fn parse(&self, path: &Path, material_dir: &Path) -> Result<SourceMesh> {
        let file = File::open(path).map_err(|e| ConvertError::from_io(path, e))?;
        let mut reader = BufReader::new(file);

        let (models, obj_materials) =
            tobj::load_obj_buf(&mut reader, &Self::load_options(), |p| {
                tobj::load_mtl(material_dir.join(p))
            })
            .map_err(|e| ConvertError::ParseFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let materials = match obj_materials {
            Ok(materials) => materials,
            Err(tobj::LoadError::OpenFileFailed) => {
                log::warn!(
                    "Material library of {} could not be opened in {}; converting without materials.",
                    path.display(),
                    material_dir.display()
                );
                Vec::new()
            }
            Err(e) => {
                return Err(ConvertError::ParseFailure {
                    path: material_dir.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        Ok(to_source_mesh(&models, &materials, path))
    }
}

/// Flattens `tobj` output into one attribute set plus per-model shapes.
pub fn to_source_mesh(
    models: &[tobj::Model],
    materials: &[tobj::Material],
    path: &Path,
) -> SourceMesh {
    let mut attributes = MeshAttributes::default();
    let mut shapes = Vec::with_capacity(models.len());

    for m in models {
        let mesh = &m.mesh;
        let position_base = attributes.positions.len() as i64;
        let normal_base = attributes.normals.len() as i64;
        let uv_base = attributes.uvs.len() as i64;

        attributes.positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| cgmath::Vector3::new(p[0], p[1], p[2])),
        );
        attributes.normals.extend(
            mesh.normals
                .chunks_exact(3)
                .map(|n| cgmath::Vector3::new(n[0], n[1], n[2])),
        );
        attributes.uvs.extend(
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| cgmath::Vector2::new(t[0], t[1])),
        );

        let offset = |indices: &[u32], i: usize, base: i64| {
            indices.get(i).map_or(ABSENT, |&ix| base + ix as i64)
        };
        let corner = |i: usize| FaceVertex {
            position: offset(&mesh.indices, i, position_base),
            normal: offset(&mesh.normal_indices, i, normal_base),
            uv: offset(&mesh.texcoord_indices, i, uv_base),
        };

        if mesh.indices.len() % 3 != 0 {
            log::warn!(
                "Shape '{}' in {} has {} trailing corners that do not form a triangle.",
                m.name,
                path.display(),
                mesh.indices.len() % 3
            );
        }
        let faces = (0..mesh.indices.len() / 3)
            .map(|f| SourceFace {
                vertices: [corner(3 * f), corner(3 * f + 1), corner(3 * f + 2)],
                material: mesh.material_id,
            })
            .collect();

        shapes.push(SourceShape {
            name: m.name.clone(),
            faces,
        });
    }

    SourceMesh {
        attributes,
        shapes,
        materials: materials.iter().map(to_source_material).collect(),
    }
}

pub fn to_source_material(m: &tobj::Material) -> SourceMaterial {
    let defaults = SourceMaterial::default();
    SourceMaterial {
        name: m.name.clone(),
        ambient: m.ambient.unwrap_or(defaults.ambient),
        diffuse: m.diffuse.unwrap_or(defaults.diffuse),
        specular: m.specular.unwrap_or(defaults.specular),
        emission: unknown_vec3(m, "Ke").unwrap_or(defaults.emission),
        transmission_filter: unknown_vec3(m, "Tf").unwrap_or(defaults.transmission_filter),
        transparency: unknown_scalar(m, "Tr").unwrap_or(defaults.transparency),
        dissolve: m.dissolve.unwrap_or(defaults.dissolve),
        optical_density: m.optical_density.unwrap_or(defaults.optical_density),
        shininess: m.shininess.unwrap_or(defaults.shininess),
        illumination_model: m
            .illumination_model
            .map_or(defaults.illumination_model, u32::from),
        diffuse_texture: m.diffuse_texture.clone().filter(|t| !t.is_empty()),
    }
}

// `tobj` keeps statements it has no field for (Ke, Tf, Tr) as raw strings.
fn unknown_floats(m: &tobj::Material, key: &str) -> Option<Vec<f32>> {
    let raw = m.unknown_param.get(key)?;
    raw.split_whitespace()
        .map(|v| v.parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()
}

fn unknown_vec3(m: &tobj::Material, key: &str) -> Option<[f32; 3]> {
    match unknown_floats(m, key)?.as_slice() {
        [v] => Some([*v; 3]),
        [r, g, b, ..] => Some([*r, *g, *b]),
        _ => None,
    }
}

fn unknown_scalar(m: &tobj::Material, key: &str) -> Option<f32> {
    unknown_floats(m, key)?.first().copied()
}

//! Debug outputs for checking a conversion by eye: a Wavefront re-export of
//! the converted model and preview images of its textures.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    codec::write_atomic,
    config::ConverterConfig,
    context::{ModelHandle, ResourceManager},
    data_structures::{material::Material, model::Model, vertex::Vertex},
    error::{ConvertError, Result},
    resources::texture::{ImageCodec, PreviewFormat},
};

/// Encodes the image of every textured material of a model.
///
/// Returns one entry per material: the written file, or `None` for untextured
/// materials.
pub fn write_previews(
    config: &ConverterConfig,
    asset: &str,
    format: PreviewFormat,
    rm: &ResourceManager,
    handle: ModelHandle,
    codec: &dyn ImageCodec,
) -> Result<Vec<Option<PathBuf>>> {
    let model = rm.model(handle)?;
    let mut written = Vec::with_capacity(model.materials.len());
    for (i, &material) in model.materials.iter().enumerate() {
        let Some(image) = rm.material(material)?.image else {
            written.push(None);
            continue;
        };
        let path = config.preview_path(asset, i, format);
        codec.encode(rm.image(image)?, &path, format)?;
        log::info!("Wrote preview {}", path.display());
        written.push(Some(path));
    }
    Ok(written)
}

/// Writes `model` as OBJ to `path` and its materials as a sibling `.mtl`.
///
/// Each surface becomes one group. Texture coordinates are flipped back to
/// the bottom-left origin OBJ expects. `textures` optionally names an image
/// file per material, referenced as `map_Kd`.
///
/// Returns the path of the `.mtl` file, or `None` when the model has no
/// materials and none was written.
pub fn export_obj(
    path: &Path,
    rm: &ResourceManager,
    handle: ModelHandle,
    textures: &[Option<PathBuf>],
) -> Result<Option<PathBuf>> {
    let model = rm.model(handle)?;
    let mtl_path = path.with_extension("mtl");

    let mut materials = Vec::with_capacity(model.materials.len());
    for &m in &model.materials {
        materials.push(rm.material(m)?);
    }

    let vertex_range = model.vertex_range();
    let vertices = if vertex_range.is_empty() {
        &[][..]
    } else {
        rm.vertices(model.vb, vertex_range.clone())?
    };
    let mut surfaces = Vec::with_capacity(model.surfaces.len());
    for s in &model.surfaces {
        surfaces.push(if s.index_count() == 0 {
            &[][..]
        } else {
            rm.indices(model.ib, s.index_range())?
        });
    }

    let mtl_name = mtl_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut obj = Vec::new();
    write_obj(&mut obj, model, &materials, vertices, vertex_range.start, &surfaces, &mtl_name)
        .map_err(|e| ConvertError::write_failure(path, e))?;
    let mut mtl = Vec::new();
    write_mtl(&mut mtl, &materials, textures).map_err(|e| ConvertError::write_failure(&mtl_path, e))?;

    write_atomic(path, &obj)?;
    log::info!("Exported {} as {}", model.name, path.display());
    if materials.is_empty() {
        return Ok(None);
    }
    write_atomic(&mtl_path, &mtl)?;
    Ok(Some(mtl_path))
}

fn write_obj(
    out: &mut impl Write,
    model: &Model,
    materials: &[&Material],
    vertices: &[Vertex],
    vb_base: u32,
    surfaces: &[&[u32]],
    mtl_name: &str,
) -> std::io::Result<()> {
    writeln!(out, "# {} surfaces, {} vertices", model.surfaces.len(), vertices.len())?;
    if !materials.is_empty() {
        writeln!(out, "mtllib {mtl_name}")?;
    }
    writeln!(out, "o {}", model.name)?;
    for v in vertices {
        writeln!(out, "v {} {} {}", v.position[0], v.position[1], v.position[2])?;
    }
    for v in vertices {
        writeln!(out, "vt {} {}", v.tex_coords[0], 1.0 - v.tex_coords[1])?;
    }
    for v in vertices {
        writeln!(out, "vn {} {} {}", v.normal[0], v.normal[1], v.normal[2])?;
    }
    for (i, (surface, indices)) in model.surfaces.iter().zip(surfaces).enumerate() {
        writeln!(out, "g surface_{i}")?;
        if let Some(material) = materials.get(surface.material_id as usize) {
            writeln!(out, "usemtl {}", material.name)?;
        }
        for tri in indices.chunks_exact(3) {
            // OBJ indices are 1-based and relative to the exported vertices.
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|ix| ix - vb_base + 1);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
    }
    Ok(())
}

fn write_mtl(
    out: &mut impl Write,
    materials: &[&Material],
    textures: &[Option<PathBuf>],
) -> std::io::Result<()> {
    let rgb = |c: [f32; 3]| format!("{} {} {}", c[0], c[1], c[2]);
    for (i, m) in materials.iter().enumerate() {
        writeln!(out, "newmtl {}", m.name)?;
        writeln!(out, "Ka {}", rgb(m.ambient))?;
        writeln!(out, "Kd {}", rgb(m.diffuse))?;
        writeln!(out, "Ks {}", rgb(m.specular))?;
        writeln!(out, "Ke {}", rgb(m.emission))?;
        writeln!(out, "Tf {}", rgb(m.transmission_filter))?;
        writeln!(out, "Tr {}", m.transparency)?;
        writeln!(out, "Ns {}", m.shininess)?;
        writeln!(out, "Ni {}", m.optical_density)?;
        writeln!(out, "d {}", m.dissolve)?;
        writeln!(out, "illum {}", m.illumination_model)?;
        if let Some(Some(texture)) = textures.get(i) {
            if let Some(file) = texture.file_name() {
                writeln!(out, "map_Kd {}", file.to_string_lossy())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

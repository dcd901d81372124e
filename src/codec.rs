//! Binary model files (`.mdl`).
//!
//! A file holds one model together with the slice of the vertex and index
//! pools its surfaces reference, so it can be loaded without the resource
//! manager it was built in. Layout, little-endian throughout:
//!
//! ```text
//! magic "MDLF" | version u32
//! name                      u32 length + UTF-8
//! surface count u32         surfaces (5 x u32 each)
//! material count u32        per material: name, coefficients, then
//!                           width u32 | height u32 | u64 length | RGBA8 bytes
//!                           when textured
//! vertex base u32 | count u32 | vertices (48 bytes each)
//! index base u32  | count u32 | indices (u32 each)
//! trailer "MEND"
//! ```
//!
//! Surface ranges and index values are stored pool-absolute together with the
//! base offset of each slice. [`load`] recreates the pools at those bases, so
//! a loaded model is bit-identical to the stored one and re-encodes to the
//! same bytes. [`load_into`] appends to existing pools and rebases instead.

#[cfg(target_endian = "big")]
compile_error!("model files are written with native little-endian Pod layouts");

use std::{
    fs,
    path::{Path, PathBuf},
};

use bytemuck::{Pod, Zeroable, bytes_of, cast_slice, pod_read_unaligned};

use crate::{
    context::{ModelHandle, ResourceManager},
    data_structures::{material::Material, model::Surface, texture::Image, vertex::Vertex},
    error::{ConvertError, FormatError, Result},
};

pub const MAGIC: [u8; 4] = *b"MDLF";
pub const TRAILER: [u8; 4] = *b"MEND";
pub const VERSION: u32 = 1;

/// Fixed-size part of a stored material.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct MaterialRecord {
    optical_density: f32,
    shininess: f32,
    ambient: [f32; 3],
    emission: [f32; 3],
    diffuse: [f32; 3],
    specular: [f32; 3],
    transmission_filter: [f32; 3],
    transparency: f32,
    dissolve: f32,
    illumination_model: u32,
    textured: u32,
}

/// A material as stored in a file: the image travels inline instead of as a
/// handle. `material.image` is always `None` here.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialEntry {
    pub material: Material,
    pub image: Option<Image>,
}

/// Self-contained, in-memory form of a model file.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelFile {
    pub name: String,
    pub surfaces: Vec<Surface>,
    pub materials: Vec<MaterialEntry>,
    pub vb_base: u32,
    pub vertices: Vec<Vertex>,
    pub ib_base: u32,
    pub indices: Vec<u32>,
}

impl ModelFile {
    /// Gathers a model and the pool slices it references.
    pub fn from_model(rm: &ResourceManager, handle: ModelHandle) -> Result<Self> {
        let model = rm.model(handle)?;
        let vertex_range = model.vertex_range();
        let index_range = model.index_range();

        let vertices = if vertex_range.is_empty() {
            Vec::new()
        } else {
            rm.vertices(model.vb, vertex_range.clone())?.to_vec()
        };
        let indices = if index_range.is_empty() {
            Vec::new()
        } else {
            rm.indices(model.ib, index_range.clone())?.to_vec()
        };

        let materials = model
            .materials
            .iter()
            .map(|&h| {
                let material = rm.material(h)?;
                let image = match (material.textured, material.image) {
                    (true, Some(img)) => Some(rm.image(img)?.clone()),
                    (true, None) => return Err(ConvertError::InvalidHandle("image")),
                    (false, _) => None,
                };
                Ok(MaterialEntry {
                    material: material.clone().with_image(None),
                    image,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: model.name.clone(),
            surfaces: model.surfaces.clone(),
            materials,
            vb_base: vertex_range.start,
            vertices,
            ib_base: index_range.start,
            indices,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_buf(&mut buf);
        buf
    }

    /// Parses and validates a complete file image.
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, FormatError> {
        let mut buf = bytes;
        let file = Self::deserialize(&mut buf)?;
        file.validate()?;
        Ok(file)
    }

    /// Checks that every surface range, empty ones included, lies inside the
    /// stored slices and that every index points into its surface's vertex
    /// range.
    pub fn validate(&self) -> std::result::Result<(), FormatError> {
        let vb_end = self.vb_base as u64 + self.vertices.len() as u64;
        let ib_end = self.ib_base as u64 + self.indices.len() as u64;
        if vb_end > u32::MAX as u64 || ib_end > u32::MAX as u64 {
            return Err(FormatError::InvalidRange(
                "pool slice exceeds 32-bit offsets".to_string(),
            ));
        }

        for (i, s) in self.surfaces.iter().enumerate() {
            if !s.is_well_formed() {
                return Err(FormatError::InvalidRange(format!(
                    "surface {i} is malformed: {s:?}"
                )));
            }
            if s.vb_offset < self.vb_base || s.vb_end as u64 > vb_end {
                return Err(FormatError::InvalidRange(format!(
                    "surface {i} vertices {:?} outside stored {}..{vb_end}",
                    s.vertex_range(),
                    self.vb_base
                )));
            }
            if s.ib_offset < self.ib_base || s.ib_end as u64 > ib_end {
                return Err(FormatError::InvalidRange(format!(
                    "surface {i} indices {:?} outside stored {}..{ib_end}",
                    s.index_range(),
                    self.ib_base
                )));
            }
            let start = (s.ib_offset - self.ib_base) as usize;
            let end = (s.ib_end - self.ib_base) as usize;
            if let Some(bad) = self.indices[start..end]
                .iter()
                .find(|&&ix| !s.vertex_range().contains(&ix))
            {
                return Err(FormatError::InvalidRange(format!(
                    "surface {i} index {bad} outside vertices {:?}",
                    s.vertex_range()
                )));
            }
        }
        Ok(())
    }

    /// Adds the model to `rm`, appending geometry to the currently pushed
    /// pools. Ranges and index values are shifted by the difference between
    /// the pool cursors and the stored bases.
    pub fn install(self, rm: &mut ResourceManager) -> Result<ModelHandle> {
        let vb = rm.current_vb()?;
        let ib = rm.current_ib()?;
        let vb_offset = rm.vb_offset()?;
        let ib_offset = rm.ib_offset()?;
        let vb_shift = vb_offset as i64 - self.vb_base as i64;
        let ib_shift = ib_offset as i64 - self.ib_base as i64;

        let shifted = |value: u32, shift: i64| -> Result<u32> {
            u32::try_from(value as i64 + shift)
                .map_err(|_| ConvertError::InvalidHandle("pool offset"))
        };

        let surfaces = self
            .surfaces
            .iter()
            .map(|s| {
                Ok(Surface {
                    vb_offset: shifted(s.vb_offset, vb_shift)?,
                    vb_end: shifted(s.vb_end, vb_shift)?,
                    ib_offset: shifted(s.ib_offset, ib_shift)?,
                    ib_end: shifted(s.ib_end, ib_shift)?,
                    material_id: s.material_id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let indices = self
            .indices
            .iter()
            .map(|&index| shifted(index, vb_shift))
            .collect::<Result<Vec<_>>>()?;

        for vertex in &self.vertices {
            rm.add_vertex(*vertex)?;
        }
        for index in indices {
            rm.add_index(index)?;
        }

        let materials = self
            .materials
            .iter()
            .map(|entry| {
                let image = entry.image.as_ref().map(|img| rm.store_image_copy(img));
                rm.store_material_copy(&entry.material.clone().with_image(image))
            })
            .collect::<Vec<_>>();

        let handle = rm.alloc_model();
        let model = rm.model_mut(handle)?;
        model.name = self.name;
        model.surfaces = surfaces;
        model.materials = materials;
        model.vb = vb;
        model.ib = ib;
        Ok(handle)
    }
}

pub trait Serialize {
    fn serialize_buf(&self, buf: &mut Vec<u8>);
}

pub trait Deserialize: Sized {
    fn deserialize(buf: &mut &[u8]) -> std::result::Result<Self, FormatError>;
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

fn take<'a>(
    buf: &mut &'a [u8],
    needed: usize,
    context: &'static str,
) -> std::result::Result<&'a [u8], FormatError> {
    if buf.len() < needed {
        return Err(FormatError::Truncated {
            context,
            needed,
            remaining: buf.len(),
        });
    }
    let (head, tail) = buf.split_at(needed);
    *buf = tail;
    Ok(head)
}

fn read_pod<T: Pod>(buf: &mut &[u8], context: &'static str) -> std::result::Result<T, FormatError> {
    Ok(pod_read_unaligned(take(buf, size_of::<T>(), context)?))
}

fn read_u32(buf: &mut &[u8], context: &'static str) -> std::result::Result<u32, FormatError> {
    let bytes = take(buf, 4, context)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_pod_vec<T: Pod>(
    buf: &mut &[u8],
    count: usize,
    context: &'static str,
) -> std::result::Result<Vec<T>, FormatError> {
    let needed = count
        .checked_mul(size_of::<T>())
        .ok_or(FormatError::Truncated {
            context,
            needed: usize::MAX,
            remaining: buf.len(),
        })?;
    Ok(take(buf, needed, context)?
        .chunks_exact(size_of::<T>())
        .map(pod_read_unaligned)
        .collect())
}

fn read_str(buf: &mut &[u8], context: &'static str) -> std::result::Result<String, FormatError> {
    let len = read_u32(buf, context)? as usize;
    let bytes = take(buf, len, context)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::InvalidUtf8)
}

impl Serialize for Image {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        put_u32(buf, self.width);
        put_u32(buf, self.height);
        buf.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        buf.extend_from_slice(&self.data);
    }
}

impl Deserialize for Image {
    fn deserialize(buf: &mut &[u8]) -> std::result::Result<Self, FormatError> {
        let width = read_u32(buf, "image width")?;
        let height = read_u32(buf, "image height")?;
        let len: u64 = read_pod(buf, "image length")?;
        let len = usize::try_from(len).map_err(|_| FormatError::ImageSizeMismatch {
            width,
            height,
            len: usize::MAX,
        })?;
        if Image::byte_len(width, height) != Some(len) {
            return Err(FormatError::ImageSizeMismatch { width, height, len });
        }
        let data = take(buf, len, "image pixels")?.to_vec();
        Ok(Image::new(width, height, data))
    }
}

impl Serialize for MaterialEntry {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        let m = &self.material;
        put_str(buf, &m.name);
        let record = MaterialRecord {
            optical_density: m.optical_density,
            shininess: m.shininess,
            ambient: m.ambient,
            emission: m.emission,
            diffuse: m.diffuse,
            specular: m.specular,
            transmission_filter: m.transmission_filter,
            transparency: m.transparency,
            dissolve: m.dissolve,
            illumination_model: m.illumination_model,
            textured: self.image.is_some() as u32,
        };
        buf.extend_from_slice(bytes_of(&record));
        if let Some(image) = &self.image {
            image.serialize_buf(buf);
        }
    }
}

impl Deserialize for MaterialEntry {
    fn deserialize(buf: &mut &[u8]) -> std::result::Result<Self, FormatError> {
        let name = read_str(buf, "material name")?;
        let r: MaterialRecord = read_pod(buf, "material coefficients")?;
        let image = match r.textured {
            0 => None,
            1 => Some(Image::deserialize(buf)?),
            other => {
                return Err(FormatError::InvalidRange(format!(
                    "material '{name}' has textured flag {other}"
                )));
            }
        };
        let material = Material {
            name,
            optical_density: r.optical_density,
            shininess: r.shininess,
            ambient: r.ambient,
            emission: r.emission,
            diffuse: r.diffuse,
            specular: r.specular,
            transmission_filter: r.transmission_filter,
            transparency: r.transparency,
            dissolve: r.dissolve,
            illumination_model: r.illumination_model,
            textured: image.is_some(),
            image: None,
        };
        Ok(Self { material, image })
    }
}

impl Serialize for ModelFile {
    fn serialize_buf(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&MAGIC);
        put_u32(buf, VERSION);
        put_str(buf, &self.name);

        put_u32(buf, self.surfaces.len() as u32);
        buf.extend_from_slice(cast_slice(self.surfaces.as_slice()));

        put_u32(buf, self.materials.len() as u32);
        for m in &self.materials {
            m.serialize_buf(buf);
        }

        put_u32(buf, self.vb_base);
        put_u32(buf, self.vertices.len() as u32);
        buf.extend_from_slice(cast_slice(self.vertices.as_slice()));

        put_u32(buf, self.ib_base);
        put_u32(buf, self.indices.len() as u32);
        buf.extend_from_slice(cast_slice(self.indices.as_slice()));

        buf.extend_from_slice(&TRAILER);
    }
}

impl Deserialize for ModelFile {
    fn deserialize(buf: &mut &[u8]) -> std::result::Result<Self, FormatError> {
        if take(buf, MAGIC.len(), "magic")? != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = read_u32(buf, "version")?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion {
                found: version,
                expected: VERSION,
            });
        }
        let name = read_str(buf, "model name")?;

        let surface_count = read_u32(buf, "surface count")? as usize;
        let surfaces = read_pod_vec::<Surface>(buf, surface_count, "surfaces")?;

        let material_count = read_u32(buf, "material count")? as usize;
        let materials = (0..material_count)
            .map(|_| MaterialEntry::deserialize(buf))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let vb_base = read_u32(buf, "vertex base")?;
        let vertex_count = read_u32(buf, "vertex count")? as usize;
        let vertices = read_pod_vec::<Vertex>(buf, vertex_count, "vertices")?;

        let ib_base = read_u32(buf, "index base")?;
        let index_count = read_u32(buf, "index count")? as usize;
        let indices = (0..index_count)
            .map(|_| read_u32(buf, "indices"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match take(buf, TRAILER.len(), "trailer") {
            Ok(t) if t == TRAILER => {}
            _ => return Err(FormatError::MissingTrailer),
        }
        if !buf.is_empty() {
            return Err(FormatError::TrailingBytes(buf.len()));
        }

        Ok(Self {
            name,
            surfaces,
            materials,
            vb_base,
            vertices,
            ib_base,
            indices,
        })
    }
}

/// Encodes a model held by `rm`.
pub fn encode_model(rm: &ResourceManager, handle: ModelHandle) -> Result<Vec<u8>> {
    Ok(ModelFile::from_model(rm, handle)?.encode())
}

/// Decodes and validates a complete model file image.
pub fn decode_model(bytes: &[u8]) -> std::result::Result<ModelFile, FormatError> {
    ModelFile::decode(bytes)
}

/// Writes a model to `path`.
///
/// The bytes go to a sibling `.tmp` file that is renamed over `path` once
/// complete, so an existing file is only ever replaced by a whole one.
pub fn store(path: &Path, rm: &ResourceManager, handle: ModelHandle) -> Result<()> {
    let bytes = encode_model(rm, handle)?;
    write_atomic(path, &bytes)?;
    log::debug!("Stored {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Loads a model into a fresh resource manager whose pools start at the
/// stored base offsets.
pub fn load(path: &Path) -> Result<(ResourceManager, ModelHandle)> {
    let file = read_model_file(path)?;
    let mut rm = ResourceManager::new();
    let vb = rm.alloc_vb_at(file.vb_base);
    let ib = rm.alloc_ib_at(file.ib_base);
    rm.push_vb(vb)?;
    rm.push_ib(ib)?;
    let handle = file.install(&mut rm)?;
    Ok((rm, handle))
}

/// Loads a model into the currently pushed pools of `rm`, rebasing its
/// ranges and indices onto the pool cursors.
pub fn load_into(path: &Path, rm: &mut ResourceManager) -> Result<ModelHandle> {
    read_model_file(path)?.install(rm)
}

pub fn read_model_file(path: &Path) -> Result<ModelFile> {
    let bytes = fs::read(path).map_err(|e| ConvertError::from_io(path, e))?;
    ModelFile::decode(&bytes).map_err(|source| ConvertError::DeserializationFailure {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConvertError::write_failure(parent, e))?;
    }
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(ConvertError::write_failure(&tmp, e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ConvertError::write_failure(path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

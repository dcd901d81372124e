use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use mdl_convert::{
    ConvertError, ConverterConfig, Image, PreviewFormat,
    resources::{
        FaceVertex, MeshAttributes, SourceFace, SourceMaterial, SourceMesh, SourceShape,
        texture::ImageCodec,
    },
};

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A throwaway directory tree with `models/`, `textures/` and `converted/`
/// below a unique root. Removed again on drop.
pub(crate) struct Scratch {
    root: PathBuf,
}

impl Scratch {
    pub fn new(label: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "mdl-convert-{}-{}-{}",
            label,
            std::process::id(),
            SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&root);
        for dir in ["models", "textures", "converted"] {
            fs::create_dir_all(root.join(dir)).expect("failed to create scratch directory");
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> ConverterConfig {
        ConverterConfig::with_root(&self.root)
    }

    pub fn write_model(&self, file: &str, contents: &str) -> PathBuf {
        let path = self.root.join("models").join(file);
        fs::write(&path, contents).expect("failed to write model fixture");
        path
    }

    /// Writes a single-colour PNG into `textures/`.
    pub fn write_png(&self, file: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
        let path = self.root.join("textures").join(file);
        image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
            .save_with_format(&path, image::ImageFormat::Png)
            .expect("failed to write texture fixture");
        path
    }

    pub fn write_texture_bytes(&self, file: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root.join("textures").join(file);
        fs::write(&path, bytes).expect("failed to write texture fixture");
        path
    }

    pub fn converted(&self, file: &str) -> PathBuf {
        self.root.join("converted").join(file)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

pub(crate) const TRIANGLE_OBJ: &str = "\
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

/// A unit quad split into two triangles, textured with `quad.png`.
pub(crate) const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl painted
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

pub(crate) const QUAD_MTL: &str = "\
newmtl painted
Ka 0.1 0.1 0.1
Kd 0.8 0.2 0.2
Ks 0.5 0.5 0.5
Ns 32.0
Ni 1.45
d 1.0
illum 2
map_Kd quad.png
";

pub(crate) fn attributes(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
) -> MeshAttributes {
    MeshAttributes {
        positions: positions.iter().map(|&p| p.into()).collect(),
        normals: normals.iter().map(|&n| n.into()).collect(),
        uvs: uvs.iter().map(|&t| t.into()).collect(),
    }
}

pub(crate) fn corners(indices: &[(i64, i64, i64)]) -> Vec<FaceVertex> {
    indices
        .iter()
        .map(|&(p, n, t)| FaceVertex::new(p, n, t))
        .collect()
}

/// One shape from position-only triangles.
pub(crate) fn shape(name: &str, triangles: &[[i64; 3]], material: Option<usize>) -> SourceShape {
    SourceShape {
        name: name.to_string(),
        faces: triangles
            .iter()
            .map(|tri| SourceFace {
                vertices: tri.map(FaceVertex::position_only),
                material,
            })
            .collect(),
    }
}

/// A single triangle over three distinct positions and no materials.
pub(crate) fn triangle_mesh() -> SourceMesh {
    SourceMesh {
        attributes: attributes(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[],
            &[],
        ),
        shapes: vec![shape("tri", &[[0, 1, 2]], None)],
        materials: Vec::new(),
    }
}

/// Two shapes over four positions: `a` uses 0, 1, 2 and `b` reuses 1 and
/// adds 3.
pub(crate) fn two_shape_mesh() -> SourceMesh {
    SourceMesh {
        attributes: attributes(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            &[],
            &[],
        ),
        shapes: vec![
            shape("a", &[[0, 1, 2]], Some(0)),
            shape("b", &[[1, 3, 2]], Some(1)),
        ],
        materials: vec![
            SourceMaterial {
                name: "red".to_string(),
                diffuse: [1.0, 0.0, 0.0],
                ..Default::default()
            },
            SourceMaterial {
                name: "checker".to_string(),
                diffuse: [1.0, 1.0, 1.0],
                shininess: 16.0,
                illumination_model: 2,
                diffuse_texture: Some("checker.png".to_string()),
                ..Default::default()
            },
        ],
    }
}

/// Codec double that hands out a fixed image for every path and records
/// nothing on encode.
pub(crate) struct SolidCodec(pub Image);

impl ImageCodec for SolidCodec {
    fn decode(&self, _: &Path) -> mdl_convert::Result<Image> {
        Ok(self.0.clone())
    }

    fn encode(&self, _: &Image, _: &Path, _: PreviewFormat) -> mdl_convert::Result<()> {
        Ok(())
    }
}

/// Codec double whose decode always fails.
pub(crate) struct FailingCodec;

impl ImageCodec for FailingCodec {
    fn decode(&self, path: &Path) -> mdl_convert::Result<Image> {
        Err(ConvertError::ImageDecodeFailure {
            path: path.to_path_buf(),
            message: "corrupt".to_string(),
        })
    }

    fn encode(&self, _: &Image, _: &Path, _: PreviewFormat) -> mdl_convert::Result<()> {
        Ok(())
    }
}

//! The conversion flow: source asset in, `.mdl` file (and optional debug
//! outputs) out.
//!
//! [`Converter::convert`] runs one asset to completion. [`Converter::convert_batch`]
//! runs several and keeps going after a failing asset; the failure is logged
//! and returned in that asset's slot. A failing asset never touches its
//! previous output file because model files are replaced atomically.

use std::path::PathBuf;

use crate::{
    builder::ModelBuilder,
    codec,
    config::{ConverterConfig, PoolMode},
    context::{ModelHandle, ResourceManager},
    error::{ConvertError, FormatError, Result},
    export,
    resources::{
        MeshParser,
        mesh::ObjParser,
        texture::{ImageCodec, ImageCrateCodec},
    },
};

/// Summary of one finished conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionReport {
    pub asset: String,
    pub output: PathBuf,
    pub surfaces: usize,
    pub vertices: u32,
    pub indices: u32,
    pub materials: usize,
    pub bytes: usize,
    pub previews: Vec<PathBuf>,
    pub obj_export: Option<PathBuf>,
    /// Material library written next to `obj_export`, if the model has
    /// materials.
    pub mtl_export: Option<PathBuf>,
}

pub struct Converter<P = ObjParser, C = ImageCrateCodec> {
    pub config: ConverterConfig,
    parser: P,
    codec: C,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_collaborators(config, ObjParser, ImageCrateCodec)
    }
}

impl<P: MeshParser, C: ImageCodec> Converter<P, C> {
    pub fn with_collaborators(config: ConverterConfig, parser: P, codec: C) -> Self {
        Self {
            config,
            parser,
            codec,
        }
    }

    /// Converts one asset in a resource manager of its own.
    pub fn convert(&self, asset: &str) -> Result<ConversionReport> {
        let mut rm = ResourceManager::with_fresh_pools();
        self.convert_into(asset, &mut rm)
    }

    /// Converts one asset into the currently pushed pools of `rm`.
    pub fn convert_into(&self, asset: &str, rm: &mut ResourceManager) -> Result<ConversionReport> {
        let source = self.config.model_path(asset);
        log::info!("Converting {}", source.display());
        let mesh = self.parser.parse(&source, &self.config.models_dir)?;

        let handle = ModelBuilder::new(rm, &self.codec, &self.config.textures_dir)
            .build(asset, &mesh)?;

        let output = self.config.output_path(asset);
        let bytes = codec::encode_model(rm, handle)?;
        codec::write_atomic(&output, &bytes)?;
        if self.config.verify_round_trip {
            verify_round_trip(&output, &bytes)?;
        }

        let previews = match self.config.preview {
            Some(format) => {
                export::write_previews(&self.config, asset, format, rm, handle, &self.codec)?
            }
            None => Vec::new(),
        };
        let (obj_export, mtl_export) = if self.config.export_obj {
            let path = self.config.obj_export_path(asset);
            let mtl = export::export_obj(&path, rm, handle, &previews)?;
            (Some(path), mtl)
        } else {
            (None, None)
        };

        let mut report = report(asset, output, bytes.len(), rm, handle, previews)?;
        report.obj_export = obj_export;
        report.mtl_export = mtl_export;
        log::info!(
            "Wrote {} ({} bytes, {} surfaces, {} vertices, {} indices, {} materials)",
            report.output.display(),
            report.bytes,
            report.surfaces,
            report.vertices,
            report.indices,
            report.materials
        );
        Ok(report)
    }

    /// Converts every asset, continuing past failures. Results are returned
    /// in input order.
    pub fn convert_batch<S: AsRef<str>>(
        &self,
        assets: &[S],
    ) -> Vec<(String, Result<ConversionReport>)> {
        let mut shared = match self.config.pool_mode {
            PoolMode::Dedicated => None,
            PoolMode::Shared => Some(ResourceManager::with_fresh_pools()),
        };

        assets
            .iter()
            .map(|asset| {
                let asset = asset.as_ref();
                let result = match shared.as_mut() {
                    Some(rm) => self.convert_into(asset, rm),
                    None => self.convert(asset),
                };
                if let Err(e) = &result {
                    log::error!("Conversion of '{}' failed: {}", asset, e);
                }
                (asset.to_string(), result)
            })
            .collect()
    }
}

/// Loads `path` back and checks that it re-encodes to `expected`.
pub fn verify_round_trip(path: &std::path::Path, expected: &[u8]) -> Result<()> {
    let (rm, handle) = codec::load(path)?;
    let reencoded = codec::encode_model(&rm, handle)?;
    if reencoded != expected {
        let at = reencoded
            .iter()
            .zip(expected)
            .position(|(a, b)| a != b)
            .unwrap_or(reencoded.len().min(expected.len()));
        return Err(ConvertError::DeserializationFailure {
            path: path.to_path_buf(),
            source: FormatError::RoundTripMismatch { offset: at },
        });
    }
    log::debug!("Round trip of {} verified", path.display());
    Ok(())
}

fn report(
    asset: &str,
    output: PathBuf,
    bytes: usize,
    rm: &ResourceManager,
    handle: ModelHandle,
    previews: Vec<Option<PathBuf>>,
) -> Result<ConversionReport> {
    let model = rm.model(handle)?;
    Ok(ConversionReport {
        asset: asset.to_string(),
        output,
        surfaces: model.surfaces.len(),
        vertices: model.vertex_range().len() as u32,
        indices: model.surfaces.iter().map(|s| s.index_count()).sum(),
        materials: model.material_count(),
        bytes,
        previews: previews.into_iter().flatten().collect(),
        obj_export: None,
        mtl_export: None,
    })
}

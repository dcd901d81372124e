//! Converter configuration: where assets are read from and written to, and
//! which optional outputs are produced.

use std::path::{Path, PathBuf};

use crate::resources::texture::PreviewFormat;

pub const MODELS_DIR_VAR: &str = "MDL_MODELS_DIR";
pub const TEXTURES_DIR_VAR: &str = "MDL_TEXTURES_DIR";
pub const CONVERTED_DIR_VAR: &str = "MDL_CONVERTED_DIR";

/// Extension of written model files.
pub const MODEL_EXTENSION: &str = "mdl";

/// How resource managers and pools are shared across a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoolMode {
    /// Every asset gets its own resource manager and pools.
    #[default]
    Dedicated,
    /// All assets of a batch append to one vertex and one index pool.
    Shared,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Source `.obj` files and their `.mtl` libraries.
    pub models_dir: PathBuf,
    /// Texture images referenced by materials.
    pub textures_dir: PathBuf,
    /// Output directory for `.mdl` files and debug outputs.
    pub converted_dir: PathBuf,
    /// Write every textured material's image next to the model.
    pub preview: Option<PreviewFormat>,
    /// Re-export each converted model as OBJ/MTL.
    pub export_obj: bool,
    /// Load each written file back and compare its re-encoding byte for byte.
    pub verify_round_trip: bool,
    pub pool_mode: PoolMode,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models/"),
            textures_dir: PathBuf::from("textures/"),
            converted_dir: PathBuf::from("converted/"),
            preview: None,
            export_obj: false,
            verify_round_trip: true,
            pool_mode: PoolMode::Dedicated,
        }
    }
}

impl ConverterConfig {
    /// Defaults, with directories overridden by `MDL_MODELS_DIR`,
    /// `MDL_TEXTURES_DIR` and `MDL_CONVERTED_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let var = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
        if let Some(dir) = var(MODELS_DIR_VAR) {
            config.models_dir = dir;
        }
        if let Some(dir) = var(TEXTURES_DIR_VAR) {
            config.textures_dir = dir;
        }
        if let Some(dir) = var(CONVERTED_DIR_VAR) {
            config.converted_dir = dir;
        }
        config
    }

    /// All three directories below one root, as `models/`, `textures/` and
    /// `converted/`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            models_dir: root.join("models"),
            textures_dir: root.join("textures"),
            converted_dir: root.join("converted"),
            ..Self::default()
        }
    }

    /// Source mesh of `asset`. A trailing `.obj` in the name is accepted.
    pub fn model_path(&self, asset: &str) -> PathBuf {
        self.models_dir
            .join(format!("{}.obj", asset_stem(asset)))
    }

    pub fn output_path(&self, asset: &str) -> PathBuf {
        self.converted_dir
            .join(format!("{}.{}", asset_stem(asset), MODEL_EXTENSION))
    }

    pub fn preview_path(&self, asset: &str, material_index: usize, format: PreviewFormat) -> PathBuf {
        self.converted_dir.join(format!(
            "{}_{}.{}",
            asset_stem(asset),
            material_index,
            format.extension()
        ))
    }

    pub fn obj_export_path(&self, asset: &str) -> PathBuf {
        self.converted_dir
            .join(format!("{}.export.obj", asset_stem(asset)))
    }
}

fn asset_stem(asset: &str) -> &str {
    asset.strip_suffix(".obj").unwrap_or(asset)
}

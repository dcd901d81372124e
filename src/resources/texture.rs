use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::{
    data_structures::texture::Image,
    error::{ConvertError, Result},
};

/// Output formats for debug preview images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewFormat {
    Png,
    Bmp,
}

impl PreviewFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PreviewFormat::Png => "png",
            PreviewFormat::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            PreviewFormat::Png => ImageFormat::Png,
            PreviewFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

impl std::str::FromStr for PreviewFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(PreviewFormat::Png),
            "bmp" => Ok(PreviewFormat::Bmp),
            other => Err(format!("unknown preview format '{other}' (expected png or bmp)")),
        }
    }
}

/// Decodes texture files into RGBA8 [`Image`]s and encodes them back for
/// previews.
pub trait ImageCodec {
    fn decode(&self, path: &Path) -> Result<Image>;
    fn encode(&self, image: &Image, path: &Path, format: PreviewFormat) -> Result<()>;
}

/// [`ImageCodec`] backed by the `image` crate. The format is guessed from the
/// file contents, not the extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, path: &Path) -> Result<Image> {
        let reader = ImageReader::open(path)
            .map_err(|e| ConvertError::from_io(path, e))?
            .with_guessed_format()
            .map_err(|e| decode_failure(path, e))?;
        let img = reader.decode().map_err(|e| decode_failure(path, e))?;
        let rgba = img.to_rgba8();
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(Image::new(rgba.width(), rgba.height(), rgba.into_raw()))
    }

    fn encode(&self, image: &Image, path: &Path, format: PreviewFormat) -> Result<()> {
        if !image.is_consistent() {
            return Err(ConvertError::write_failure(
                path,
                format!(
                    "image of {}x{} holds {} bytes",
                    image.width,
                    image.height,
                    image.data.len()
                ),
            ));
        }
        image::save_buffer_with_format(
            path,
            &image.data,
            image.width,
            image.height,
            image::ColorType::Rgba8,
            format.image_format(),
        )
        .map_err(|e| ConvertError::write_failure(path, e))
    }
}

fn decode_failure(path: &Path, err: impl std::fmt::Display) -> ConvertError {
    ConvertError::ImageDecodeFailure {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

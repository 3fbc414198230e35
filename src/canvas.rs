use std::path::Path;

use image::{imageops, DynamicImage, GrayImage, ImageReader, RgbaImage};
use thiserror::Error;

use crate::config::ColorMode;

/// Errors raised by a [`Canvas`].
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("failed reading image file")]
    Io(#[from] std::io::Error),

    #[error("failed decoding image")]
    Image(#[from] image::ImageError),

    #[error("cannot create a {width}x{height} image")]
    Dimensions { width: u32, height: u32 },
}

/// The image surface maps are composed on.
pub trait Canvas: Sized {
    /// What the caller gets back once composition is done.
    type Output;

    fn create(width: u32, height: u32, color: ColorMode) -> Result<Self, CanvasError>;

    /// Loads the image file at `path` and pastes it with its top-left corner
    /// at `(x, y)`.
    fn paste_file(&mut self, path: &Path, x: u32, y: u32) -> Result<(), CanvasError>;

    fn into_output(self) -> Self::Output;
}

/// A [`Canvas`] backed by the `image` crate.
#[derive(Clone, Debug)]
pub enum ImageCanvas {
    Color(RgbaImage),
    Bw(GrayImage),
}

impl Canvas for ImageCanvas {
    type Output = DynamicImage;

    fn create(width: u32, height: u32, color: ColorMode) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::Dimensions { width, height });
        }

        Ok(match color {
            ColorMode::Color => ImageCanvas::Color(RgbaImage::new(width, height)),
            ColorMode::Bw => ImageCanvas::Bw(GrayImage::new(width, height)),
        })
    }

    fn paste_file(&mut self, path: &Path, x: u32, y: u32) -> Result<(), CanvasError> {
        // providers don't always serve what the extension says
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;

        match self {
            ImageCanvas::Color(canvas) => {
                imageops::replace(canvas, &img.to_rgba8(), i64::from(x), i64::from(y))
            }
            ImageCanvas::Bw(canvas) => {
                imageops::replace(canvas, &img.to_luma8(), i64::from(x), i64::from(y))
            }
        }

        Ok(())
    }

    fn into_output(self) -> DynamicImage {
        match self {
            ImageCanvas::Color(canvas) => DynamicImage::ImageRgba8(canvas),
            ImageCanvas::Bw(canvas) => DynamicImage::ImageLuma8(canvas),
        }
    }
}

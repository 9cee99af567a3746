//! Image to ink mask conversion
//!
//! Layer artwork is converted to grayscale, flipped so that the bottom image
//! row becomes row zero, thresholded and resampled with nearest-neighbor to the
//! working resolution (`target_width * working_scale` cells across).

use crate::mask::Mask;
use brushkit_core::ImageLoadError;
use brushkit_settings::LayerConfig;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Binarizes layer artwork into a [`Mask`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterizer {
    /// Gray levels strictly below this are ink
    pub threshold: u8,
    /// Working pixels per millimeter
    pub working_scale: f64,
    /// Physical canvas width (mm)
    pub target_width: f64,
}

impl Rasterizer {
    pub fn new(threshold: u8, working_scale: f64, target_width: f64) -> Self {
        Self {
            threshold,
            working_scale,
            target_width,
        }
    }

    pub fn from_layer(config: &LayerConfig) -> Self {
        Self::new(config.threshold, config.working_scale, config.target_width)
    }

    /// Open and decode an image file
    pub fn load_image(path: &Path, layer: &str) -> Result<DynamicImage, ImageLoadError> {
        image::open(path).map_err(|e| ImageLoadError::new(layer, path, e.to_string()))
    }

    /// Load an image file and rasterize it
    pub fn load(&self, path: &Path, layer: &str) -> Result<Mask, ImageLoadError> {
        let img = Self::load_image(path, layer)?;
        Ok(self.rasterize(&img))
    }

    /// Working resolution for a source image of `width` x `height` pixels
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let output_width = (self.target_width * self.working_scale) as u32;
        let aspect_ratio = if width == 0 {
            0.0
        } else {
            height as f64 / width as f64
        };
        let output_height = (self.target_width * aspect_ratio * self.working_scale) as u32;
        (output_width.max(1), output_height.max(1))
    }

    pub fn rasterize(&self, img: &DynamicImage) -> Mask {
        let mut gray = img.to_luma8();
        let (output_width, output_height) = self.output_size(gray.width(), gray.height());

        if gray.width() == 0 || gray.height() == 0 {
            return Mask::new(output_width as usize, output_height as usize);
        }

        image::imageops::flip_vertical_in_place(&mut gray);
        self.apply_threshold(&mut gray);

        let resized = image::imageops::resize(
            &gray,
            output_width,
            output_height,
            image::imageops::FilterType::Nearest,
        );

        Mask::from_fn(output_width as usize, output_height as usize, |x, y| {
            resized.get_pixel(x as u32, y as u32).0[0] < self.threshold
        })
    }

    fn apply_threshold(&self, image: &mut GrayImage) {
        for pixel in image.pixels_mut() {
            *pixel = if pixel.0[0] >= self.threshold {
                image::Luma([255])
            } else {
                image::Luma([0])
            };
        }
    }
}

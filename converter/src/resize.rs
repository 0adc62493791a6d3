use anyhow::Context;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};

/// Scales single-channel (luma) frames onto the character grid.
pub struct GridResizer {
    cols: u32,
    rows: u32,
    resizer: Resizer,
    options: ResizeOptions,
}

impl GridResizer {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        }
    }

    /// Resize an 8-bit luma image to `cols` x `rows`. Returns one byte per cell.
    pub fn resize(&mut self, luma: Vec<u8>, src_width: u32, src_height: u32) -> anyhow::Result<Vec<u8>> {
        if src_width == self.cols && src_height == self.rows {
            return Ok(luma);
        }

        let src_image = Image::from_vec_u8(src_width, src_height, luma, PixelType::U8)
            .context("failed to create source image")?;

        let mut dst_image = Image::new(self.cols, self.rows, PixelType::U8);

        self.resizer
            .resize(&src_image, &mut dst_image, &self.options)
            .context("resize failed")?;

        Ok(dst_image.into_vec())
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }
}

// File-based entry and exit points for the engine's raster buffers, plus the
// pre-scaling clamp applied to oversized inputs before a build. Only the demo
// binary and tests touch the filesystem; the pipeline itself never does.

pub mod image_helper {
    use crate::core_modules::raster::RasterImage;
    use image::ImageEncoder;
    use std::path::Path;

    /// Widest input a build is asked to handle; larger images are pre-scaled.
    pub const MAX_WIDTH: u32 = 680;
    /// Tallest input a build is asked to handle; larger images are pre-scaled.
    pub const MAX_HEIGHT: u32 = 680;

    /// Encodes an image to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O or encoding error.
    pub fn save(path: &Path, image: &RasterImage) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            image.data(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(())
    }

    /// Decodes any supported image file into an RGBA raster buffer.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O or decoding error.
    pub fn load(path: &Path) -> Result<RasterImage, image::error::ImageError> {
        let decoded = image::open(path)?.into_rgba8();
        let (width, height) = decoded.dimensions();
        RasterImage::from_rgba(width, height, decoded.into_raw()).map_err(|err| {
            image::error::ImageError::IoError(std::io::Error::other(err.to_string()))
        })
    }

    /// Downscales an image to fit inside `max_width` x `max_height`,
    /// preserving aspect ratio. Images already inside the bounds pass
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the bounds are zero.
    pub fn scale_to_fit(
        image: &RasterImage,
        max_width: u32,
        max_height: u32,
    ) -> crate::error::Result<RasterImage> {
        if image.width() <= max_width && image.height() <= max_height {
            return Ok(image.clone());
        }

        let mut width = f64::from(image.width());
        let mut height = f64::from(image.height());
        if width > f64::from(max_width) {
            height *= f64::from(max_width) / width;
            width = f64::from(max_width);
        }
        if height > f64::from(max_height) {
            width *= f64::from(max_height) / height;
            height = f64::from(max_height);
        }
        let target_width = (width as u32).max(1);
        let target_height = (height as u32).max(1);

        let source = image::RgbaImage::from_fn(image.width(), image.height(), |x, y| {
            let pixel = image.pixel(x, y);
            image::Rgba([pixel.red, pixel.green, pixel.blue, pixel.alpha])
        });
        let resized = image::imageops::resize(
            &source,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );
        RasterImage::from_rgba(target_width, target_height, resized.into_raw())
    }
}

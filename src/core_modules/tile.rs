// THEORY:
// A `Tile` is one cell of the mosaic grid: its position and size inside the
// source image, the pixel block copied out of that region, and the two values
// filled in as the pipeline progresses. The lifecycle is strict: a tile is
// created by the partitioner, mutated exactly twice (color, then reference
// image, each write-once), and discarded with its session after compositing.

use crate::core_modules::color::color::Rgb;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::raster::RasterImage;

/// One cell of the mosaic grid and its per-build state.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Row-major index, unique and dense within one build session.
    pub id: usize,
    /// Left edge of the tile in source image coordinates.
    pub x: u32,
    /// Top edge of the tile in source image coordinates.
    pub y: u32,
    /// Tile width in pixels. Smaller than the nominal size on the right edge.
    pub width: u32,
    /// Tile height in pixels. Smaller than the nominal size on the bottom edge.
    pub height: u32,
    /// The tile's pixel block, copied out of the source image.
    pub pixels: Vec<Pixel>,
    /// The averaged color, set once when the tile's job completes.
    pub resolved_color: Option<Rgb>,
    /// The reference image, set once when the resolver answers.
    pub resolved_image: Option<RasterImage>,
}

impl Tile {
    pub fn new(id: usize, x: u32, y: u32, width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            pixels,
            resolved_color: None,
            resolved_image: None,
        }
    }

    /// Records the averaged color. Write-once.
    pub(crate) fn record_color(&mut self, color: Rgb) {
        debug_assert!(self.resolved_color.is_none(), "tile color set twice");
        self.resolved_color = Some(color);
    }

    /// Records the resolved reference image. Write-once.
    pub(crate) fn record_image(&mut self, image: RasterImage) {
        debug_assert!(self.resolved_image.is_none(), "tile image set twice");
        self.resolved_image = Some(image);
    }
}

// THEORY:
// The `TileGrid` is the bridge between the raw image and the engine's
// tile-based paradigm. Its single job is the slicing operation: divide a
// raster image into a row-major grid of tile descriptors, each owning a
// non-aliased copy of its pixel region, without ever mutating the source.
//
// Key architectural principles:
// 1.  **Dense, stable ids**: Tiles are emitted in row-major order with ids
//     `0..rows*cols`. Every downstream component (job routing, result
//     demultiplexing, compositing) keys on these ids, so they must be dense
//     and deterministic for a given image and tile size.
// 2.  **Border clamping**: When the image dimensions are not exact multiples
//     of the tile size, edge tiles shrink to fit. The extraction math clamps
//     per tile rather than reading past the buffer.
// 3.  **No gaps, no overlaps**: Together the tiles cover the image exactly
//     once, which is what lets the compositor draw them in any order.

use crate::core_modules::raster::RasterImage;
use crate::core_modules::tile::Tile;
use crate::error::{MosaicError, Result};

/// Divides raster images into row-major grids of fixed-size tiles.
#[derive(Debug, Clone, Copy)]
pub struct TileGrid {
    /// Nominal tile width in pixels.
    tile_width: u32,
    /// Nominal tile height in pixels.
    tile_height: u32,
}

impl TileGrid {
    /// Creates a partitioner for the given nominal tile size.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if either dimension is zero.
    pub fn new(tile_width: u32, tile_height: u32) -> Result<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(MosaicError::InvalidInput {
                reason: format!("tile dimensions must be positive, got {tile_width}x{tile_height}"),
            });
        }
        Ok(Self {
            tile_width,
            tile_height,
        })
    }

    /// The grid shape `(cols, rows)` this partitioner produces for `image`.
    pub fn dimensions_for(&self, image: &RasterImage) -> (u32, u32) {
        (
            image.width().div_ceil(self.tile_width),
            image.height().div_ceil(self.tile_height),
        )
    }

    /// Slices `image` into tiles. An image smaller than one tile yields
    /// exactly one tile covering the whole image.
    pub fn partition(&self, image: &RasterImage) -> Vec<Tile> {
        let (cols, rows) = self.dimensions_for(image);
        let mut tiles = Vec::with_capacity(cols as usize * rows as usize);

        for row in 0..rows {
            for col in 0..cols {
                let x = col * self.tile_width;
                let y = row * self.tile_height;
                let width = self.tile_width.min(image.width() - x);
                let height = self.tile_height.min(image.height() - y);

                let mut pixels = Vec::with_capacity(width as usize * height as usize);
                for pixel_y in y..y + height {
                    for pixel_x in x..x + width {
                        pixels.push(image.pixel(pixel_x, pixel_y));
                    }
                }

                let id = (row * cols + col) as usize;
                tiles.push(Tile::new(id, x, y, width, height, pixels));
            }
        }

        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color::color::Rgb;

    fn image(width: u32, height: u32) -> RasterImage {
        RasterImage::filled(width, height, Rgb::new(128, 128, 128)).unwrap()
    }

    #[test]
    fn exact_multiple_produces_full_grid() {
        let grid = TileGrid::new(50, 50).unwrap();
        let tiles = grid.partition(&image(100, 100));
        assert_eq!(tiles.len(), 4);
        let positions: Vec<(u32, u32)> = tiles.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(positions, vec![(0, 0), (50, 0), (0, 50), (50, 50)]);
        assert!(tiles.iter().all(|t| t.width == 50 && t.height == 50));
    }

    #[test]
    fn edge_tiles_clamp_to_image_border() {
        let grid = TileGrid::new(50, 50).unwrap();
        let tiles = grid.partition(&image(101, 100));
        assert_eq!(grid.dimensions_for(&image(101, 100)), (3, 2));
        assert_eq!(tiles.len(), 6);
        let widths: Vec<u32> = tiles.iter().take(3).map(|t| t.width).collect();
        assert_eq!(widths, vec![50, 50, 1]);
        assert!(tiles.iter().all(|t| t.height == 50));
        assert!(tiles.iter().all(|t| t.pixels.len() == (t.width * t.height) as usize));
    }

    #[test]
    fn image_smaller_than_one_tile_yields_a_single_tile() {
        let grid = TileGrid::new(64, 64).unwrap();
        let tiles = grid.partition(&image(10, 7));
        assert_eq!(tiles.len(), 1);
        assert_eq!((tiles[0].x, tiles[0].y), (0, 0));
        assert_eq!((tiles[0].width, tiles[0].height), (10, 7));
    }

    #[test]
    fn ids_are_dense_and_row_major() {
        let grid = TileGrid::new(30, 30).unwrap();
        let tiles = grid.partition(&image(90, 60));
        let ids: Vec<usize> = tiles.iter().map(|t| t.id).collect();
        assert_eq!(ids, (0..6).collect::<Vec<_>>());
        // Row-major: tile 4 sits at column 1 of row 1.
        assert_eq!((tiles[4].x, tiles[4].y), (30, 30));
    }

    #[test]
    fn tiles_cover_the_image_exactly_once() {
        let grid = TileGrid::new(16, 16).unwrap();
        let source = image(37, 21);
        let tiles = grid.partition(&source);
        let mut covered = vec![0u8; 37 * 21];
        for tile in &tiles {
            for y in tile.y..tile.y + tile.height {
                for x in tile.x..tile.x + tile.width {
                    covered[(y * 37 + x) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&hits| hits == 1));
    }

    #[test]
    fn partitioning_is_deterministic() {
        let grid = TileGrid::new(50, 50).unwrap();
        let source = image(101, 100);
        let first = grid.partition(&source);
        let second = grid.partition(&source);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!((a.x, a.y, a.width, a.height), (b.x, b.y, b.width, b.height));
            assert_eq!(a.pixels, b.pixels);
        }
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        assert!(matches!(
            TileGrid::new(0, 50),
            Err(MosaicError::InvalidInput { .. })
        ));
        assert!(matches!(
            TileGrid::new(50, 0),
            Err(MosaicError::InvalidInput { .. })
        ));
    }
}

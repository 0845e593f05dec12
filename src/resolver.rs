// THEORY:
// The `resolver` module defines the engine's one outward-facing seam. The
// reference-tile store (a server keyed by color, a local library, anything)
// lives behind the `TileResolver` trait; the core only depends on its async
// contract: give it a color, get back an image or a failure. The builder
// tolerates arbitrary per-call latency and never serializes calls.
//
// `SwatchResolver` is the built-in stand-in for a real store: it synthesizes
// a uniform tile for any requested color, which is exactly what a color-keyed
// reference server degenerates to when its library is empty. The demo binary
// and the pipeline tests run against it.

use crate::core_modules::color::color::Rgb;
use crate::core_modules::raster::RasterImage;
use std::fmt;
use std::future::Future;

/// Failure to produce a reference image for a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    /// Description of the failure, e.g. which color key missed.
    pub reason: String,
}

impl ResolveError {
    pub fn not_found(color: Rgb) -> Self {
        Self {
            reason: format!("no reference image for color {}", color.to_hex()),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for ResolveError {}

/// Maps a computed tile color to a reference image.
///
/// Implementations may be slow and may fail per call; the builder starts one
/// call per tile as soon as that tile's color is known and lets the calls
/// proceed concurrently.
pub trait TileResolver: Send + Sync {
    fn resolve(
        &self,
        color: Rgb,
    ) -> impl Future<Output = std::result::Result<RasterImage, ResolveError>> + Send;
}

/// Synthesizes a uniform reference tile for any requested color.
#[derive(Debug, Clone, Copy)]
pub struct SwatchResolver {
    tile_width: u32,
    tile_height: u32,
}

impl SwatchResolver {
    pub fn new(tile_width: u32, tile_height: u32) -> Self {
        Self {
            tile_width,
            tile_height,
        }
    }
}

impl TileResolver for SwatchResolver {
    fn resolve(
        &self,
        color: Rgb,
    ) -> impl Future<Output = std::result::Result<RasterImage, ResolveError>> + Send {
        let swatch = RasterImage::filled(self.tile_width, self.tile_height, color);
        async move {
            swatch.map_err(|err| ResolveError {
                reason: err.to_string(),
            })
        }
    }
}

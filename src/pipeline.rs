// THEORY:
// The `pipeline` module is the top-level API for the entire mosaic engine. It
// encapsulates the full stack (partitioning, the worker pool, resolution,
// compositing) behind a single entry point: hand `MosaicBuilder::build` an
// image and a resolver, get back the composed mosaic or the first error.
//
// The orchestration is a structured fan-out/fan-in. One per-tile chain is
// created for every tile: wait for the pool's color result, then ask the
// resolver for a reference image. The chains complete in arbitrary order and
// are drained through a `FuturesUnordered`; all session state (the tile set,
// the outstanding count, the phase) is owned by the `BuildSession` on the
// orchestrator's own task and mutated only there, never from worker code.
// Workers and resolver calls communicate exclusively through channels and
// futures, which is what preserves the write-once-per-tile invariant without
// any locking.
//
// Failure is terminal and immediate: the first error transitions the session
// to `Failed`, the aggregation loop stops, and the remaining chains are
// dropped. Worker jobs already in flight complete into closed channels and
// are discarded; no new resolver calls start once the session has failed.

use crate::core_modules::raster::Canvas;
use crate::core_modules::tile::Tile;
use crate::core_modules::tile_grid::TileGrid;
use crate::error::{MosaicError, Result};
use crate::resolver::TileResolver;
use crate::worker_pool::{ColorJob, WORKER_POOL_SIZE, WorkerPool};
use futures::stream::{FuturesUnordered, StreamExt};

// Re-export key data structures for the public API.
pub use crate::core_modules::color::color::Rgb;
pub use crate::core_modules::raster::RasterImage;

/// Configuration for the MosaicBuilder, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Nominal tile width in pixels.
    pub tile_width: u32,
    /// Nominal tile height in pixels.
    pub tile_height: u32,
    /// Number of worker tasks in the pool.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tile_width: 16,
            tile_height: 16,
            workers: WORKER_POOL_SIZE,
        }
    }
}

impl PipelineConfig {
    /// The default tile size with a pool sized to the host's CPU count.
    pub fn for_host() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            ..Self::default()
        }
    }
}

/// The lifecycle of one build session. Exactly one terminal transition
/// happens per session, to either `Complete` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Partitioning,
    Dispatching,
    Aggregating,
    Compositing,
    Complete,
    Failed,
}

impl BuildPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Transient per-build aggregate: the tile set, the outstanding count, and
/// the session phase. Owned by one `build` call, never shared.
struct BuildSession {
    tiles: Vec<Tile>,
    outstanding: usize,
    phase: BuildPhase,
}

impl BuildSession {
    fn new() -> Self {
        Self {
            tiles: Vec::new(),
            outstanding: 0,
            phase: BuildPhase::Idle,
        }
    }

    fn advance(&mut self, next: BuildPhase) {
        debug_assert!(
            !self.phase.is_terminal(),
            "session already reached a terminal phase"
        );
        self.phase = next;
    }

    fn adopt_tiles(&mut self, tiles: Vec<Tile>) {
        self.outstanding = tiles.len();
        self.tiles = tiles;
    }

    /// Stores a tile's color and reference image, write-once each, and
    /// retires the tile from the outstanding count.
    fn resolve_tile(&mut self, tile_id: usize, color: Rgb, image: RasterImage) {
        let tile = &mut self.tiles[tile_id];
        tile.record_color(color);
        tile.record_image(image);
        self.outstanding -= 1;
    }

    fn is_complete(&self) -> bool {
        self.outstanding == 0
    }

    /// Draws every tile's reference image onto a canvas of the source
    /// dimensions. Tiles are non-overlapping so draw order is irrelevant.
    fn composite(&self, width: u32, height: u32) -> Result<RasterImage> {
        let mut canvas = Canvas::blank(width, height);
        for tile in &self.tiles {
            let image = tile
                .resolved_image
                .as_ref()
                .ok_or_else(|| MosaicError::InvalidInput {
                    reason: format!("tile {} has no reference image to composite", tile.id),
                })?;
            canvas.draw_image(image, tile.x, tile.y, tile.width, tile.height);
        }
        canvas.into_image()
    }
}

/// The main, top-level struct for the mosaic engine.
pub struct MosaicBuilder {
    grid: TileGrid,
    pool: WorkerPool,
}

impl MosaicBuilder {
    /// Creates a builder with its own worker pool.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configured tile size has a zero
    /// dimension.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let grid = TileGrid::new(config.tile_width, config.tile_height)?;
        let pool = WorkerPool::new(config.workers);
        Ok(Self { grid, pool })
    }

    /// Number of workers in the builder's pool.
    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Generates a photomosaic of `image`.
    ///
    /// The output has the same dimensions as the input. Several builds may
    /// run concurrently on one builder; they share the worker pool but each
    /// owns its session state.
    ///
    /// # Errors
    ///
    /// Returns the first `WorkerFailure` or `ResolutionFailure` encountered;
    /// no partial mosaic is ever returned.
    pub async fn build<R>(&self, image: &RasterImage, resolver: &R) -> Result<RasterImage>
    where
        R: TileResolver,
    {
        let mut session = BuildSession::new();

        session.advance(BuildPhase::Partitioning);
        session.adopt_tiles(self.grid.partition(image));

        // Fan-out: one averaging job per tile enters the pool now, in tile
        // order; one chain per tile continues into the resolver as soon as
        // its color is known.
        session.advance(BuildPhase::Dispatching);
        let mut chains = FuturesUnordered::new();
        for tile in &session.tiles {
            let pending = self.pool.submit(ColorJob {
                tile_id: tile.id,
                pixels: tile.pixels.clone(),
            });
            chains.push(async move {
                let result = pending.await?;
                let color = result.color.map_err(|err| MosaicError::WorkerFailure {
                    tile_id: result.tile_id,
                    reason: err.to_string(),
                })?;
                let image = resolver.resolve(color).await.map_err(|err| {
                    MosaicError::ResolutionFailure {
                        tile_id: result.tile_id,
                        reason: err.reason,
                    }
                })?;
                Ok((result.tile_id, color, image))
            });
        }

        // Fan-in: chains complete out of order. The first error wins and
        // drops the remaining chains with the stream.
        session.advance(BuildPhase::Aggregating);
        while let Some(outcome) = chains.next().await {
            match outcome {
                Ok((tile_id, color, image)) => session.resolve_tile(tile_id, color, image),
                Err(err) => {
                    session.advance(BuildPhase::Failed);
                    return Err(err);
                }
            }
        }
        debug_assert!(session.is_complete());

        session.advance(BuildPhase::Compositing);
        let composed = session.composite(image.width(), image.height())?;
        session.advance(BuildPhase::Complete);
        Ok(composed)
    }
}

//! Regular grid placement with per-building jitter.

use bevy::prelude::*;

use super::block::{AxisRect, Block, Building};
use super::rng::RandomSource;
use super::BlockGenerator;

/// Settings for the grid placer.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Exact number of buildings to place.
    pub count: usize,
    /// Footprint size (x, y) before jitter.
    pub footprint: Vec2,
    /// Distance between building origins along x.
    pub spacing: f32,
    /// Distance between rows along y.
    pub row_pitch: f32,
    /// A row wraps once x passes `xmax - wrap_margin`.
    pub wrap_margin: f32,
    /// Maximum positional jitter on each axis.
    pub jitter: f32,
    pub height_range: (f32, f32),
    /// Bound reported to bounding-volume consumers.
    pub max_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            count: 1500,
            footprint: Vec2::new(1.0, 2.0),
            spacing: 2.0,
            row_pitch: 3.0,
            wrap_margin: 3.0,
            jitter: 0.1,
            height_range: (1.0, 5.0),
            max_height: 5.0,
        }
    }
}

/// Variant B: a fixed number of small buildings packed row by row.
///
/// There is no bounds check on y. When the rectangle is too small for
/// `count` buildings, rows simply continue past `ymax`.
#[derive(Clone, Debug, Default)]
pub struct GridPlacer {
    pub config: GridConfig,
}

impl GridPlacer {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }
}

impl BlockGenerator for GridPlacer {
    fn generate(&self, rng: &mut RandomSource, bounds: AxisRect) -> Block {
        let config = &self.config;
        let mut buildings = Vec::with_capacity(config.count);
        let mut x = bounds.xmin;
        let mut y = bounds.ymin;

        for _ in 0..config.count {
            // Draw order: x jitter, y jitter, height.
            let x0 = x + rng.range_float(-config.jitter, config.jitter);
            let y0 = y + rng.range_float(-config.jitter, config.jitter);
            let height = rng.range_float(config.height_range.0, config.height_range.1);

            buildings.push(Building {
                footprint: AxisRect {
                    xmin: x0,
                    xmax: x0 + config.footprint.x,
                    ymin: y0,
                    ymax: y0 + config.footprint.y,
                },
                height,
            });

            x += config.spacing;
            if x > bounds.xmax - config.wrap_margin {
                x = bounds.xmin;
                y += config.row_pitch;
            }
        }

        Block {
            bounds,
            max_height: config.max_height,
            buildings,
        }
    }
}

/// Place `count` buildings in `bounds` with the default grid settings.
pub fn generate_grid(seed: u64, count: usize, bounds: AxisRect) -> Block {
    let placer = GridPlacer::new(GridConfig {
        count,
        ..default()
    });
    placer.generate(&mut RandomSource::new(seed), bounds)
}

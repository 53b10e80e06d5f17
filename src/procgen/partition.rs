//! Recursive lot partitioning (binary space partition with street gaps).
//!
//! A rectangle is split along its longer axis at a random coordinate, and
//! the two halves are pulled apart by a road whose width scales with the
//! rectangle. Splitting stops at the minimum lot size; every surviving
//! rectangle becomes one building.

use bevy::prelude::*;

use super::block::{AxisRect, Block, Building};
use super::rng::RandomSource;
use super::BlockGenerator;

/// When a rectangle counts as a finished lot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StopRule {
    /// Both sides below the minimum lot size.
    #[default]
    BothBelow,
    /// Either side below the minimum lot size. Produces long strip lots.
    EitherBelow,
}

/// Settings for the lot partitioner.
#[derive(Clone, Debug)]
pub struct PartitionConfig {
    /// Lots smaller than this (per [`StopRule`]) are not split further.
    pub min_lot_size: f32,
    /// Street half-width as a fraction of the side being split.
    pub road_fraction: f32,
    /// Upper clamp on the street half-width.
    pub max_road_half_width: f32,
    pub stop_rule: StopRule,
    /// Height of one floor; building height is floors × this.
    pub floor_height: f32,
    /// Each building draws three factors from this inclusive range and
    /// multiplies them into a floor count.
    pub floor_factors: (i32, i32),
    /// Bound reported to bounding-volume consumers. Deliberately not the
    /// tallest building.
    pub max_height: f32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            min_lot_size: 20.0,
            road_fraction: 0.05, // side / 10 / 2
            max_road_half_width: 25.0,
            stop_rule: StopRule::BothBelow,
            floor_height: 3.5,
            floor_factors: (1, 3),
            max_height: 100.0,
        }
    }
}

impl PartitionConfig {
    fn is_lot(&self, rect: &AxisRect) -> bool {
        let narrow = rect.width() < self.min_lot_size;
        let short = rect.height() < self.min_lot_size;
        match self.stop_rule {
            StopRule::BothBelow => narrow && short,
            StopRule::EitherBelow => narrow || short,
        }
    }

    fn road_half_width(&self, side: f32) -> f32 {
        (side * self.road_fraction).min(self.max_road_half_width)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SplitAxis {
    X,
    Y,
}

impl SplitAxis {
    /// Longer side wins; a square always splits along y.
    fn for_rect(rect: &AxisRect) -> Self {
        if rect.width() > rect.height() {
            SplitAxis::X
        } else {
            SplitAxis::Y
        }
    }

    fn span(self, rect: &AxisRect) -> (f32, f32) {
        match self {
            SplitAxis::X => (rect.xmin, rect.xmax),
            SplitAxis::Y => (rect.ymin, rect.ymax),
        }
    }

    /// Cut `rect` at `at`, leaving a street of `2 * half_width` between the
    /// two halves.
    fn cut(self, rect: &AxisRect, at: f32, half_width: f32) -> (AxisRect, AxisRect) {
        match self {
            SplitAxis::X => (
                AxisRect { xmax: at - half_width, ..*rect },
                AxisRect { xmin: at + half_width, ..*rect },
            ),
            SplitAxis::Y => (
                AxisRect { ymax: at - half_width, ..*rect },
                AxisRect { ymin: at + half_width, ..*rect },
            ),
        }
    }
}

/// Variant A: irregular lots carved out by recursive splitting.
#[derive(Clone, Debug, Default)]
pub struct LotPartitioner {
    pub config: PartitionConfig,
}

impl LotPartitioner {
    pub fn new(config: PartitionConfig) -> Self {
        Self { config }
    }

    /// Split `bounds` into lots. Lots come out in the order they are
    /// popped from the work stack.
    pub fn partition(&self, rng: &mut RandomSource, bounds: AxisRect) -> Vec<AxisRect> {
        let mut lots = Vec::new();
        let mut queue = vec![bounds];

        while let Some(item) = queue.pop() {
            if self.config.is_lot(&item) {
                lots.push(item);
                continue;
            }

            match self.split(rng, &item) {
                Some((low, high)) => {
                    queue.push(low);
                    queue.push(high);
                }
                None => lots.push(item),
            }
        }

        lots
    }

    fn split(&self, rng: &mut RandomSource, item: &AxisRect) -> Option<(AxisRect, AxisRect)> {
        let axis = SplitAxis::for_rect(item);
        let (lo, hi) = axis.span(item);
        let rw = self.config.road_half_width(hi - lo);
        if rw <= 0.0 {
            debug!("refusing split of {item:?}: no room for a street");
            return None;
        }

        match rng.checked_range_float(lo + rw * 2.0, hi - rw * 2.0) {
            Ok(at) => Some(axis.cut(item, at, rw)),
            Err(err) => {
                debug!("refusing split of {item:?}: {err}");
                None
            }
        }
    }

    fn floors(&self, rng: &mut RandomSource) -> i32 {
        let (lo, hi) = self.config.floor_factors;
        rng.range_int(lo, hi) * rng.range_int(lo, hi) * rng.range_int(lo, hi)
    }
}

impl BlockGenerator for LotPartitioner {
    fn generate(&self, rng: &mut RandomSource, bounds: AxisRect) -> Block {
        let lots = self.partition(rng, bounds);
        let buildings = lots
            .into_iter()
            .map(|footprint| Building {
                footprint,
                height: self.floors(rng) as f32 * self.config.floor_height,
            })
            .collect();

        Block {
            bounds,
            max_height: self.config.max_height,
            buildings,
        }
    }
}

/// Partition `bounds` with the default settings.
pub fn generate_partition(seed: u64, bounds: AxisRect) -> Block {
    LotPartitioner::default().generate(&mut RandomSource::new(seed), bounds)
}

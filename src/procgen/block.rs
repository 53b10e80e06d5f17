//! The geometric result of a generator: a ground footprint and its buildings.

use bevy::prelude::*;

/// Axis-aligned rectangle on the ground plane (z-up, so x/y are horizontal).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRect {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

impl AxisRect {
    /// Build a rectangle, ordering each pair of bounds.
    pub fn new(xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> Self {
        Self {
            xmin: xmin.min(xmax),
            xmax: xmin.max(xmax),
            ymin: ymin.min(ymax),
            ymax: ymin.max(ymax),
        }
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.xmin, self.ymin)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.xmax, self.ymax)
    }

    /// True if `other` lies entirely inside this rectangle (edges included).
    pub fn contains(&self, other: &AxisRect) -> bool {
        other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    /// True if the interiors intersect. Shared edges do not count.
    pub fn overlaps(&self, other: &AxisRect) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }
}

/// One box-shaped building standing on its footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Building {
    pub footprint: AxisRect,
    pub height: f32,
}

/// Ground footprint plus the buildings generated on it.
///
/// `max_height` is an upper bound handed to bounding-volume consumers, not
/// the tallest building.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub bounds: AxisRect,
    pub max_height: f32,
    pub buildings: Vec<Building>,
}

impl Block {
    /// Tallest building, or zero for an empty block.
    pub fn tallest(&self) -> f32 {
        self.buildings
            .iter()
            .map(|b| b.height)
            .fold(0.0, f32::max)
    }

    /// FNV-1a over the bit patterns of every footprint and height, in
    /// generation order.
    #[cfg(test)]
    pub(crate) fn fingerprint(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in &self.buildings {
            let r = b.footprint;
            for v in [r.xmin, r.xmax, r.ymin, r.ymax, b.height] {
                hash ^= u64::from(v.to_bits());
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
        hash
    }

    /// Bounding box in block space: from the bottom of the ground slab to
    /// `max_height`.
    pub fn bounding_box(&self, ground_depth: f32) -> (Vec3, Vec3) {
        (
            self.bounds.min().extend(ground_depth),
            self.bounds.max().extend(self.max_height),
        )
    }
}

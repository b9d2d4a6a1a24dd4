//! Circle placement
//!
//! Every ranked entry becomes a circle whose area grows with its share of
//! the batch's largest memory footprint. Identities already in the position
//! store keep their coordinate so the picture stays put between runs; new
//! identities get a randomized search for a free spot.

use crate::config::LayoutConfig;
use crate::ranker::RankedEntry;
use crate::store::PositionStore;
use rand::Rng;
use std::f64::consts::PI;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// How a circle's coordinate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Reused verbatim from the position store.
    Stored,
    /// Found by search, clear of every earlier circle.
    Placed,
    /// Search budget ran out; the last candidate was kept.
    PlacedWithOverlap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchResult {
    Placed { x: f64, y: f64 },
    PlacedWithOverlap { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCircle {
    pub identity: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub placement: Placement,
}

impl PlacedCircle {
    pub fn overlaps(&self, x: f64, y: f64, radius: f64) -> bool {
        (x - self.x).hypot(y - self.y) < radius + self.radius
    }
}

/// `sqrt(area / pi)` where area scales linearly with memory relative to the
/// batch maximum, on top of a fixed floor.
pub fn radius_for(memory_mb: f64, max_memory_mb: f64, layout: &LayoutConfig) -> f64 {
    let share = if max_memory_mb > 0.0 {
        (memory_mb / max_memory_mb).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let area = share * layout.area_scale + layout.area_floor;
    (area / PI).sqrt()
}

pub fn overlaps_any(x: f64, y: f64, radius: f64, placed: &[PlacedCircle]) -> bool {
    placed.iter().any(|c| c.overlaps(x, y, radius))
}

/// Valid center range along one axis; collapses to the middle when the
/// circle is wider than the canvas.
fn axis_range(extent: f64, radius: f64) -> (f64, f64) {
    let lo = radius;
    let hi = extent - radius;
    if lo <= hi {
        (lo, hi)
    } else {
        let mid = extent / 2.0;
        (mid, mid)
    }
}

fn pick<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo < hi {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

pub struct Packer<'a, R: Rng> {
    layout: &'a LayoutConfig,
    rng: R,
}

impl<'a, R: Rng> Packer<'a, R> {
    pub fn new(layout: &'a LayoutConfig, rng: R) -> Self {
        Self { layout, rng }
    }

    /// Bounded randomized search for a center clear of `placed`.
    pub fn search(&mut self, radius: f64, placed: &[PlacedCircle], canvas: Canvas) -> SearchResult {
        let (x_lo, x_hi) = axis_range(canvas.width, radius);
        let (y_lo, y_hi) = axis_range(canvas.height, radius);
        let attempts = self.layout.max_attempts.max(1);

        let mut last = (x_lo, y_lo);
        for _ in 0..attempts {
            let x = pick(&mut self.rng, x_lo, x_hi);
            let y = pick(&mut self.rng, y_lo, y_hi);
            if !overlaps_any(x, y, radius, placed) {
                return SearchResult::Placed { x, y };
            }
            last = (x, y);
        }
        SearchResult::PlacedWithOverlap { x: last.0, y: last.1 }
    }

    /// Places `entries` in rank order and returns the circles alongside the
    /// store with every placed identity upserted.
    pub fn place(
        &mut self,
        entries: &[RankedEntry],
        mut store: PositionStore,
        canvas: Canvas,
    ) -> (Vec<PlacedCircle>, PositionStore) {
        let max_memory_mb = entries
            .iter()
            .map(|e| e.sample.memory_mb)
            .fold(0.0_f64, f64::max);
        let mut placed: Vec<PlacedCircle> = Vec::with_capacity(entries.len());

        for entry in entries {
            let identity = &entry.sample.identity;
            let radius = radius_for(entry.sample.memory_mb, max_memory_mb, self.layout);

            let (x, y, placement) = match store.get(identity) {
                Some((x, y)) => (x, y, Placement::Stored),
                None => match self.search(radius, &placed, canvas) {
                    SearchResult::Placed { x, y } => (x, y, Placement::Placed),
                    SearchResult::PlacedWithOverlap { x, y } => {
                        warn!(
                            "No free spot for {} after {} attempts, accepting overlap",
                            identity, self.layout.max_attempts
                        );
                        (x, y, Placement::PlacedWithOverlap)
                    }
                },
            };
            debug!("{} -> ({:.1}, {:.1}) r={:.1} {:?}", identity, x, y, radius, placement);

            store.upsert(identity, x, y);
            placed.push(PlacedCircle {
                identity: identity.clone(),
                x,
                y,
                radius,
                placement,
            });
        }

        (placed, store)
    }
}

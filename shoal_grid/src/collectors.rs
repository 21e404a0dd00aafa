// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready-made collectors for common query shapes.
//!
//! These cover the frequent cases (precise box filtering, radius search,
//! k-nearest-neighbor lookup) so hosts only hand-write a collector
//! when they need something unusual. All of them filter at visit time:
//! buckets hand over every element in a visited cell, and elements outside
//! the query primitive are discarded here, not by the traversal.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use smallvec::SmallVec;

use crate::collector::Collector;
use crate::geometry::GridGeometry;
use crate::types::{Element, Point2, Scalar};

/// Collects every element whose position lies inside a world-space box.
///
/// Results are appended to a caller-borrowed vector so hosts can reuse one
/// allocation across many queries. Pair with
/// [`SpatialDatabase::query_range`](crate::SpatialDatabase::query_range)
/// using the same center and half-extents.
#[derive(Debug)]
pub struct WithinAabb<'a, S, V> {
    min: Point2<S>,
    max: Point2<S>,
    out: &'a mut Vec<Element<S, V>>,
}

impl<'a, S: Scalar, V> WithinAabb<'a, S, V> {
    /// Create a collector for the box at `center` with per-axis
    /// `half_extents`, appending matches to `out`.
    pub fn new(center: Point2<S>, half_extents: Point2<S>, out: &'a mut Vec<Element<S, V>>) -> Self {
        Self {
            min: Point2::new(
                S::sub(center.x, half_extents.x),
                S::sub(center.y, half_extents.y),
            ),
            max: Point2::new(
                S::add(center.x, half_extents.x),
                S::add(center.y, half_extents.y),
            ),
            out,
        }
    }
}

impl<S: Scalar, V: Copy + Debug> Collector<S, V> for WithinAabb<'_, S, V> {
    fn visit(&mut self, _cell_index: usize, bucket: &[Element<S, V>]) -> ControlFlow<()> {
        for element in bucket {
            let p = element.position;
            if self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y {
                self.out.push(*element);
            }
        }
        ControlFlow::Continue(())
    }
}

/// Collects every element within `radius` of a center point.
///
/// Distances are compared squared, so no square root is taken. The boundary
/// is inclusive. The query box must cover the ball: pass half-extents of at
/// least `radius` per axis.
#[derive(Debug)]
pub struct WithinRadius<'a, S, V> {
    center: Point2<S>,
    radius_sq: S,
    out: &'a mut Vec<Element<S, V>>,
}

impl<'a, S: Scalar, V> WithinRadius<'a, S, V> {
    /// Create a collector for the ball at `center` with `radius`, appending
    /// matches to `out`.
    pub fn new(center: Point2<S>, radius: S, out: &'a mut Vec<Element<S, V>>) -> Self {
        Self {
            center,
            radius_sq: S::mul(radius, radius),
            out,
        }
    }
}

impl<S: Scalar, V: Copy + Debug> Collector<S, V> for WithinRadius<'_, S, V> {
    fn visit(&mut self, _cell_index: usize, bucket: &[Element<S, V>]) -> ControlFlow<()> {
        for element in bucket {
            if element.position.distance_squared(self.center) <= self.radius_sq {
                self.out.push(*element);
            }
        }
        ControlFlow::Continue(())
    }
}

/// One k-nearest result: an element and its squared distance to the query
/// center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor<S, V> {
    /// Squared Euclidean distance from the query center.
    pub distance_sq: S,
    /// The stored element.
    pub element: Element<S, V>,
}

/// Keeps the k nearest elements to a center point.
///
/// Candidates are held in a small sorted buffer (inline up to 8, spilling
/// to the heap for larger k). Drive this with
/// [`query_range_nearest_first`](crate::SpatialDatabase::query_range_nearest_first):
/// ring ordering guarantees the remaining cells lie at the current Chebyshev
/// layer or beyond, so the collector stops as soon as its worst kept
/// distance is within the `(layer - 1) * cell_size` lower bound of the ring
/// being visited. Under the raster scan that reasoning does not hold and
/// the collector may stop with wrong results.
#[derive(Debug)]
pub struct KNearest<S, V> {
    center: Point2<S>,
    source: Option<(i64, i64)>,
    subdivisions: u32,
    cell_size: S,
    k: usize,
    neighbors: SmallVec<[Neighbor<S, V>; 8]>,
}

impl<S: Scalar, V> KNearest<S, V> {
    /// Create a collector for the `k` elements nearest `center` on a grid
    /// with the given geometry.
    #[must_use]
    pub fn new(geometry: &GridGeometry<S>, center: Point2<S>, k: usize) -> Self {
        let source = geometry
            .cell_coords_for_position(center)
            .map(|(x, y)| (x as i64, y as i64));
        Self {
            center,
            source,
            subdivisions: geometry.subdivisions(),
            cell_size: geometry.cell_size(),
            k,
            neighbors: SmallVec::new(),
        }
    }

    /// The neighbors found so far, nearest first.
    #[inline]
    pub fn neighbors(&self) -> &[Neighbor<S, V>] {
        &self.neighbors
    }
}

impl<S: Scalar, V: Copy + Debug> KNearest<S, V> {
    fn offer(&mut self, distance_sq: S, element: Element<S, V>) {
        if self.neighbors.len() == self.k {
            let worst = self.neighbors[self.k - 1].distance_sq;
            if distance_sq >= worst {
                return;
            }
            self.neighbors.pop();
        }
        let at = self
            .neighbors
            .iter()
            .position(|n| distance_sq < n.distance_sq)
            .unwrap_or(self.neighbors.len());
        self.neighbors.insert(
            at,
            Neighbor {
                distance_sq,
                element,
            },
        );
    }
}

impl<S: Scalar, V: Copy + Debug> Collector<S, V> for KNearest<S, V> {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Cell indices decompose into coordinates bounded by the grid's i32 range."
    )]
    fn visit(&mut self, cell_index: usize, bucket: &[Element<S, V>]) -> ControlFlow<()> {
        if self.k == 0 {
            return ControlFlow::Break(());
        }
        for element in bucket {
            let distance_sq = element.position.distance_squared(self.center);
            self.offer(distance_sq, *element);
        }

        // With the candidate buffer full, no cell at this Chebyshev layer or
        // beyond can hold anything closer than (layer - 1) cell sizes away.
        if self.neighbors.len() == self.k
            && let Some((sx, sy)) = self.source
        {
            let n = self.subdivisions as usize;
            let cx = (cell_index % n) as i64;
            let cy = (cell_index / n) as i64;
            let layer = (cx - sx).abs().max((cy - sy).abs());
            if layer >= 1 {
                let rings_between = u32::try_from(layer - 1).unwrap_or(u32::MAX);
                let bound = S::mul(S::from_u32(rings_between), self.cell_size);
                let worst = self.neighbors[self.k - 1].distance_sq;
                if worst <= S::mul(bound, bound) {
                    return ControlFlow::Break(());
                }
            }
        }
        ControlFlow::Continue(())
    }
}

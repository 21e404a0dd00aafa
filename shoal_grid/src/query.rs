// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query traversals: raster range scan and nearest-first ring-ordered scan.
//!
//! Both traversals walk cells of the clipped query range and hand each
//! cell's live bucket to a [`Collector`]. Neither inspects elements; the
//! collector owns all matching logic and the early-exit decision.

use core::ops::ControlFlow;

use crate::collector::Collector;
use crate::geometry::GridGeometry;
use crate::types::{Cell, Element, Point2, Scalar};

/// World-space min/max corners of a box given by center and half-extents.
#[inline]
fn world_box<S: Scalar>(center: Point2<S>, half_extents: Point2<S>) -> (Point2<S>, Point2<S>) {
    (
        Point2::new(
            S::sub(center.x, half_extents.x),
            S::sub(center.y, half_extents.y),
        ),
        Point2::new(
            S::add(center.x, half_extents.x),
            S::add(center.y, half_extents.y),
        ),
    )
}

/// Visit one cell's live bucket.
#[inline]
fn visit_cell<S, V, C>(
    geometry: &GridGeometry<S>,
    cells: &[Cell],
    elements: &[Element<S, V>],
    x: i32,
    y: i32,
    collector: &mut C,
) -> ControlFlow<()>
where
    S: Scalar,
    C: Collector<S, V>,
{
    let index = geometry.cell_index_for_coords(x, y);
    let cell = &cells[index];
    collector.visit(index, &elements[cell.bucket()])
}

/// Raster scan over all cells whose range intersects the query box.
///
/// Cells are visited in row-major order (y outer ascending, x inner
/// ascending) with no distance guarantee.
pub(crate) fn visit_range<S, V, C>(
    geometry: &GridGeometry<S>,
    cells: &[Cell],
    elements: &[Element<S, V>],
    center: Point2<S>,
    half_extents: Point2<S>,
    collector: &mut C,
) -> ControlFlow<()>
where
    S: Scalar,
    C: Collector<S, V>,
{
    let (min, max) = world_box(center, half_extents);
    let Some(range) = geometry.clipped_coord_range(min, max) else {
        return ControlFlow::Continue(());
    };
    for y in range.min_y..=range.max_y {
        for x in range.min_x..=range.max_x {
            visit_cell(geometry, cells, elements, x, y, collector)?;
        }
    }
    ControlFlow::Continue(())
}

/// Ring-ordered scan: cells are visited in non-decreasing Chebyshev distance
/// from the cell containing the query center.
///
/// Each ring is the square of cells at exactly one Chebyshev distance from
/// the source cell, clipped to the query range and enumerated by ascending y
/// then ascending x. Interior rows touch only the ring's two columns; the
/// span between them belongs to earlier rings and is skipped in one jump.
///
/// The source cell coordinates are not clamped: a query center outside the
/// grid orders cells by their distance to wherever the center actually is.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The ring walk runs in i64; coordinates are clipped to the grid range before visiting, which fits i32."
)]
pub(crate) fn visit_range_nearest_first<S, V, C>(
    geometry: &GridGeometry<S>,
    cells: &[Cell],
    elements: &[Element<S, V>],
    center: Point2<S>,
    half_extents: Point2<S>,
    collector: &mut C,
) -> ControlFlow<()>
where
    S: Scalar,
    C: Collector<S, V>,
{
    let (min, max) = world_box(center, half_extents);
    let Some(range) = geometry.clipped_coord_range(min, max) else {
        return ControlFlow::Continue(());
    };
    if range.cell_count() == 0 {
        return ControlFlow::Continue(());
    }
    let Some((sx, sy)) = geometry.cell_coords_for_position(center) else {
        return ControlFlow::Continue(());
    };

    // Saturated source coordinates for far-away centers make the walk's
    // arithmetic exceed i32; run it in i64.
    let (sx, sy) = (sx as i64, sy as i64);
    let (min_x, min_y) = (range.min_x as i64, range.min_y as i64);
    let (max_x, max_y) = (range.max_x as i64, range.max_y as i64);

    // Rings closer than the range contribute nothing; start at the first
    // layer that can reach it, and stop at the farthest corner.
    let reach_x = (min_x - sx).max(sx - max_x).max(0);
    let reach_y = (min_y - sy).max(sy - max_y).max(0);
    let min_layer = reach_x.max(reach_y);
    let max_layer = (sx - min_x)
        .abs()
        .max((max_x - sx).abs())
        .max((sy - min_y).abs())
        .max((max_y - sy).abs());

    for layer in min_layer..=max_layer {
        let row_lo = sy - layer;
        let row_hi = sy + layer;
        for y in row_lo.max(min_y)..=row_hi.min(max_y) {
            if y == row_lo || y == row_hi {
                // Top and bottom rows of the ring are full spans.
                for x in (sx - layer).max(min_x)..=(sx + layer).min(max_x) {
                    visit_cell(geometry, cells, elements, x as i32, y as i32, collector)?;
                }
            } else {
                // Interior row: only the two ring columns are at this layer.
                let left = sx - layer;
                let right = sx + layer;
                if left >= min_x && left <= max_x {
                    visit_cell(geometry, cells, elements, left as i32, y as i32, collector)?;
                }
                if right >= min_x && right <= max_x {
                    visit_cell(geometry, cells, elements, right as i32, y as i32, collector)?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}

// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The spatial database: geometry plus the per-cycle rebuild and insert
//! protocol over caller-owned cell and element buffers.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::collector::Collector;
use crate::geometry::GridGeometry;
use crate::query;
use crate::types::{Cell, Element, Point2, Scalar};

/// Growth factor applied to `capacity + excess` when a bucket overflowed.
///
/// Fixed at 2: a cell that overflowed by k elements gets roughly double its
/// needed size at the next rebuild, so sustained demand is met within a
/// logarithmic number of cycles.
const GROWTH_FACTOR: u32 = 2;

/// A bucketed uniform grid rebuilt from scratch every cycle.
///
/// The database itself is a thin, copyable value owning only the grid
/// geometry. The cell table and element storage are owned by the caller
/// (typically alongside the simulation world they index) and passed by
/// reference into every operation; the database never holds a buffer of its
/// own and never outlives or competes with them.
///
/// The intended life of one cycle is: [`clear_and_resize`](Self::clear_and_resize),
/// then a batch of [`insert`](Self::insert)s (the write phase), then any
/// number of [`query_range`](Self::query_range) /
/// [`query_range_nearest_first`](Self::query_range_nearest_first) calls (the
/// read phase). Queries take the buffers by shared reference, so the borrow
/// checker rules out a write racing a read for a single owner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpatialDatabase<S> {
    geometry: GridGeometry<S>,
}

impl<S: Scalar> SpatialDatabase<S> {
    /// Set up a database and its buffers.
    ///
    /// Clears both buffers, then lays out `subdivisions * subdivisions` cells of
    /// `initial_capacity` slots each and zero-fills the element storage to
    /// match. Zero capacity or subdivisions degenerate to an empty,
    /// always-miss database; neither is an error.
    pub fn initialize<V>(
        half_extent: S,
        subdivisions: u32,
        initial_capacity: u32,
        cells: &mut Vec<Cell>,
        elements: &mut Vec<Element<S, V>>,
    ) -> Self
    where
        V: Copy + Debug + Default,
    {
        let geometry = GridGeometry::new(half_extent, subdivisions);
        let cell_count = geometry.cell_count();

        cells.clear();
        cells.reserve(cell_count);
        let mut start = 0_u32;
        for _ in 0..cell_count {
            cells.push(Cell {
                start,
                len: 0,
                capacity: initial_capacity,
                excess: 0,
            });
            start = start.saturating_add(initial_capacity);
        }

        elements.clear();
        elements.resize(start as usize, Element::default());

        Self { geometry }
    }

    /// The grid geometry this database was initialized with.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry<S> {
        &self.geometry
    }

    /// Reset all buckets for a fresh cycle, growing the ones that
    /// overflowed last cycle.
    ///
    /// For each cell in index order: a cell with recorded `excess` gets
    /// `capacity = (capacity + excess) * 2`, sized to last cycle's unmet
    /// demand rather than to its old capacity alone; every cell's `start`
    /// becomes the running prefix sum of capacities, and `len`/`excess`
    /// reset to zero. The element storage is then resized to the new total,
    /// zero-filling any added slots. Capacities never shrink.
    ///
    /// Growth only ever happens here, never mid-cycle during inserts, so
    /// bucket windows stay valid for a whole cycle at the cost of dropping
    /// overflowing elements for one cycle.
    pub fn clear_and_resize<V>(&self, cells: &mut [Cell], elements: &mut Vec<Element<S, V>>)
    where
        V: Copy + Debug + Default,
    {
        debug_assert_eq!(
            cells.len(),
            self.geometry.cell_count(),
            "cell table does not match this database's geometry"
        );

        let mut start = 0_u32;
        for cell in cells.iter_mut() {
            if cell.excess > 0 {
                cell.capacity = cell
                    .capacity
                    .saturating_add(cell.excess)
                    .saturating_mul(GROWTH_FACTOR);
            }
            cell.start = start;
            cell.len = 0;
            cell.excess = 0;
            start = start.saturating_add(cell.capacity);
        }
        elements.resize(start as usize, Element::default());
    }

    /// Insert an element, resolving its cell from its position.
    ///
    /// A position outside the grid has no spatial presence this cycle: the
    /// element is dropped silently. A full bucket records the rejection in
    /// the cell's `excess` (driving growth at the next rebuild) and drops
    /// the element for this cycle. Amortized O(1), allocation-free, and
    /// touches only the target cell's table entry.
    #[inline]
    pub fn insert<V>(&self, cells: &mut [Cell], elements: &mut [Element<S, V>], element: Element<S, V>)
    where
        V: Copy + Debug,
    {
        let Some(cell_index) = self.geometry.cell_index_for_position(element.position) else {
            return;
        };
        self.insert_in_cell(cells, elements, element, cell_index);
    }

    /// Insert an element into a cell the caller has already resolved.
    ///
    /// Fast path for batched insertion where one geometry lookup serves
    /// several elements. Behaves exactly like [`insert`](Self::insert) past
    /// cell resolution.
    #[inline]
    pub fn insert_in_cell<V>(
        &self,
        cells: &mut [Cell],
        elements: &mut [Element<S, V>],
        element: Element<S, V>,
        cell_index: usize,
    ) where
        V: Copy + Debug,
    {
        let cell = &mut cells[cell_index];
        if cell.is_full() {
            // Deferred growth: the rejection counts toward this cell's
            // capacity at the next clear_and_resize.
            cell.excess += 1;
            return;
        }
        elements[cell.start as usize + cell.len as usize] = element;
        cell.len += 1;
    }

    /// Visit every cell whose range intersects the query box, in row-major
    /// order.
    ///
    /// The box is given as a center and per-axis half-extents. A box that
    /// does not intersect the grid visits nothing. The traversal stops the
    /// instant the collector returns [`Break`](core::ops::ControlFlow::Break).
    /// This order carries no distance guarantee; use
    /// [`query_range_nearest_first`](Self::query_range_nearest_first) for
    /// nearest-first consumption.
    pub fn query_range<V, C>(
        &self,
        cells: &[Cell],
        elements: &[Element<S, V>],
        center: Point2<S>,
        half_extents: Point2<S>,
        collector: &mut C,
    ) where
        V: Copy + Debug,
        C: Collector<S, V>,
    {
        let _ = query::visit_range(&self.geometry, cells, elements, center, half_extents, collector);
    }

    /// Visit every cell whose range intersects the query box, nearest
    /// Chebyshev ring first.
    ///
    /// Cells arrive in non-decreasing Chebyshev distance (in cell
    /// coordinates) from the cell containing the query center, so a
    /// collector looking for a first match or k nearest neighbors can stop
    /// as soon as a found distance beats the next ring's minimum possible
    /// distance. Early exit behaves as in [`query_range`](Self::query_range).
    pub fn query_range_nearest_first<V, C>(
        &self,
        cells: &[Cell],
        elements: &[Element<S, V>],
        center: Point2<S>,
        half_extents: Point2<S>,
        collector: &mut C,
    ) where
        V: Copy + Debug,
        C: Collector<S, V>,
    {
        let _ = query::visit_range_nearest_first(
            &self.geometry,
            cells,
            elements,
            center,
            half_extents,
            collector,
        );
    }

    /// Aggregate occupancy counters for the current cycle.
    ///
    /// Sustained non-zero [`excess`](GridStats::excess) means the initial
    /// capacity is undersized for the workload: a tuning signal, not an
    /// error.
    pub fn stats(&self, cells: &[Cell]) -> GridStats {
        let mut stats = GridStats::default();
        for cell in cells {
            stats.elements += cell.len as u64;
            stats.capacity += cell.capacity as u64;
            stats.excess += cell.excess as u64;
            if cell.excess > 0 {
                stats.overflowed_cells += 1;
            }
        }
        stats
    }
}

/// Occupancy counters aggregated over the whole cell table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Elements stored this cycle.
    pub elements: u64,
    /// Total allocated bucket slots.
    pub capacity: u64,
    /// Cells that rejected at least one element this cycle.
    pub overflowed_cells: usize,
    /// Elements rejected across all cells this cycle.
    pub excess: u64,
}

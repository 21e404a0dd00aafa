// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=shoal_grid --heading-base-level=0

//! Shoal Grid: a rebuildable, bucketed 2D spatial hash grid.
//!
//! Shoal Grid answers proximity queries (axis-aligned range queries and
//! nearest-first traversal) against a large set of positioned values that
//! all move every simulation cycle. It is built to be rebuilt from scratch
//! each cycle and then queried many times read-only:
//!
//! - One flat, contiguous element array partitioned into per-cell buckets
//!   by a prefix-sum cell table; no per-cell allocations, cache-friendly
//!   scans.
//! - Inserts are amortized O(1) and never reallocate mid-cycle: a full
//!   bucket drops the element for the current cycle and records the unmet
//!   demand, and the next rebuild grows that bucket to roughly double what
//!   was actually needed.
//! - Queries drive a caller-supplied [`Collector`] per visited cell, with
//!   cooperative early exit; the engine allocates nothing and never
//!   inspects elements itself.
//!
//! The database is a thin, copyable value. The cell table and element
//! storage are owned by the caller, typically next to the simulation world
//! they index, and passed into every operation, so their lifetime is
//! managed independently of any single call.
//!
//! # Example
//!
//! ```rust
//! use shoal_grid::{Element, Point2, SpatialDatabase};
//! use shoal_grid::collectors::WithinRadius;
//!
//! // A 16x16-cell grid spanning [-64, 64) per axis, 8 slots per bucket.
//! let mut cells = Vec::new();
//! let mut elements = Vec::new();
//! let db = SpatialDatabase::initialize(64.0_f32, 16, 8, &mut cells, &mut elements);
//!
//! // Each cycle: reset the buckets, insert everything at its new position.
//! db.clear_and_resize(&mut cells, &mut elements);
//! for (id, position) in [(0_u32, (10.0, 10.0)), (1, (12.0, 9.0)), (2, (-40.0, 3.0))] {
//!     let position = Point2::new(position.0, position.1);
//!     db.insert(&mut cells, &mut elements, Element::new(id, position));
//! }
//!
//! // Read phase: who is within 5 units of (11, 10)?
//! let center = Point2::new(11.0, 10.0);
//! let mut found = Vec::new();
//! let mut collector = WithinRadius::new(center, 5.0, &mut found);
//! db.query_range(&cells, &elements, center, Point2::new(5.0, 5.0), &mut collector);
//!
//! let mut ids: Vec<u32> = found.iter().map(|e| e.value).collect();
//! ids.sort_unstable();
//! assert_eq!(ids, vec![0, 1]);
//! ```
//!
//! Nearest-first consumption uses the ring-ordered traversal, which visits
//! cells in non-decreasing Chebyshev distance from the query center's cell:
//!
//! ```rust
//! use shoal_grid::{Element, Point2, SpatialDatabase};
//! use shoal_grid::collectors::KNearest;
//!
//! let mut cells = Vec::new();
//! let mut elements = Vec::new();
//! let db = SpatialDatabase::initialize(64.0_f32, 16, 8, &mut cells, &mut elements);
//! for (id, x) in [(0_u32, -30.0), (1, -10.0), (2, 25.0)] {
//!     db.insert(&mut cells, &mut elements, Element::new(id, Point2::new(x, 0.0)));
//! }
//!
//! let center = Point2::new(20.0, 0.0);
//! let mut nearest = KNearest::new(db.geometry(), center, 2);
//! db.query_range_nearest_first(
//!     &cells,
//!     &elements,
//!     center,
//!     Point2::new(64.0, 64.0),
//!     &mut nearest,
//! );
//! let ids: Vec<u32> = nearest.neighbors().iter().map(|n| n.element.value).collect();
//! assert_eq!(ids, vec![2, 1]);
//! ```
//!
//! ## Features
//!
//! - `collectors` *(default)*: ready-made [`collectors`] (box, radius,
//!   k-nearest) backed by `smallvec`. Disable to avoid the dependency and
//!   drive queries with closures or hand-written [`Collector`]s only.
//!
//! ## The rebuild contract
//!
//! Each cycle has a write phase ([`SpatialDatabase::clear_and_resize`]
//! followed by a batch of [`SpatialDatabase::insert`]s) and a read phase
//! of any number of queries. Inserts into different cells are independent;
//! concurrent inserts into the same cell need external synchronization.
//! Queries borrow the buffers shared, so for a single owner the borrow
//! checker rules out a rebuild racing a query.
//!
//! Bucket overflow is not an error: rejected elements are counted per cell
//! and the next rebuild grows those buckets geometrically, converging to
//! the demanded capacity in a logarithmic number of cycles. Sustained
//! non-zero [`Cell::excess`] (see [`SpatialDatabase::stats`]) is the signal
//! that the initial capacity is tuned too low.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds
//! may assert.

#![no_std]

extern crate alloc;

mod collector;
#[cfg(feature = "collectors")]
pub mod collectors;
mod database;
mod geometry;
mod query;
mod types;

pub use collector::Collector;
pub use database::{GridStats, SpatialDatabase};
pub use geometry::{CoordRange, GridGeometry};
pub use types::{Cell, Element, Point2, Scalar};

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::ops::ControlFlow;

    use super::{Cell, Element, Point2, SpatialDatabase};

    #[test]
    fn end_to_end_cycle() {
        let mut cells = Vec::new();
        let mut elements: Vec<Element<f32, u32>> = Vec::new();
        let db = SpatialDatabase::initialize(4.0_f32, 4, 2, &mut cells, &mut elements);

        // Two elements fill the (-3, -3) bucket; a third lands elsewhere.
        let near = Point2::new(-3.0, -3.0);
        let far = Point2::new(3.0, 3.0);
        db.insert(&mut cells, &mut elements, Element::new(1, near));
        db.insert(&mut cells, &mut elements, Element::new(2, near));
        db.insert(&mut cells, &mut elements, Element::new(3, far));

        let near_idx = db.geometry().cell_index_for_position(near).unwrap();
        let far_idx = db.geometry().cell_index_for_position(far).unwrap();
        assert_eq!(cells[near_idx].len, 2);
        assert_eq!(cells[far_idx].len, 1);

        // A rebuild with no overflow recorded resets counts and keeps
        // capacities.
        db.clear_and_resize(&mut cells, &mut elements);
        assert!(cells.iter().all(|c| c.len == 0 && c.excess == 0));
        assert!(cells.iter().all(|c| c.capacity >= 2));

        // Refill the bucket; the third insert overflows and is recorded.
        db.insert(&mut cells, &mut elements, Element::new(1, near));
        db.insert(&mut cells, &mut elements, Element::new(2, near));
        db.insert(&mut cells, &mut elements, Element::new(3, near));
        if cells[near_idx].capacity >= 3 {
            assert_eq!(cells[near_idx].len, 3);
        } else {
            assert_eq!(cells[near_idx].len, 2);
            assert_eq!(cells[near_idx].excess, 1);
        }
    }

    #[test]
    fn elements_exist_only_for_the_cycle_they_were_inserted_in() {
        let mut cells = Vec::new();
        let mut elements: Vec<Element<f32, u32>> = Vec::new();
        let db = SpatialDatabase::initialize(16.0_f32, 8, 4, &mut cells, &mut elements);

        let collect_near = |cells: &[Cell], elements: &[Element<f32, u32>], p: Point2<f32>| {
            let mut out = Vec::new();
            db.query_range(
                cells,
                elements,
                p,
                Point2::new(1.0, 1.0),
                &mut |_, bucket: &[Element<f32, u32>]| {
                    out.extend(bucket.iter().map(|e| e.value));
                    ControlFlow::Continue(())
                },
            );
            out
        };

        let before = Point2::new(-10.0, -10.0);
        let after = Point2::new(10.0, 10.0);
        db.insert(&mut cells, &mut elements, Element::new(7, before));
        assert_eq!(collect_near(&cells, &elements, before), [7]);

        // The value moved: the next cycle's rebuild forgets the old slot.
        db.clear_and_resize(&mut cells, &mut elements);
        db.insert(&mut cells, &mut elements, Element::new(7, after));
        assert!(collect_near(&cells, &elements, before).is_empty());
        assert_eq!(collect_near(&cells, &elements, after), [7]);
    }

    #[test]
    fn partition_invariant_survives_chaotic_cycles() {
        let mut cells = Vec::new();
        let mut elements: Vec<Element<f32, u32>> = Vec::new();
        let db = SpatialDatabase::initialize(32.0_f32, 8, 1, &mut cells, &mut elements);

        // Deterministic xorshift positions, heavily clustered so buckets
        // overflow and regrow across cycles.
        let mut state = 0x9e37_79b9_u32;
        let mut rand = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for _ in 0..12 {
            db.clear_and_resize(&mut cells, &mut elements);
            for v in 0..400 {
                let x = (rand() % 64) as f32 / 4.0 - 8.0;
                let y = (rand() % 64) as f32 / 4.0 - 8.0;
                db.insert(&mut cells, &mut elements, Element::new(v, Point2::new(x, y)));
            }

            let mut expected_start = 0_u32;
            for cell in &cells {
                assert_eq!(cell.start, expected_start);
                assert!(cell.len <= cell.capacity);
                expected_start += cell.capacity;
            }
            assert_eq!(expected_start as usize, elements.len());
        }

        // Clustered load converges: the last cycles stopped overflowing.
        db.clear_and_resize(&mut cells, &mut elements);
        for v in 0..400 {
            let x = (rand() % 64) as f32 / 4.0 - 8.0;
            let y = (rand() % 64) as f32 / 4.0 - 8.0;
            db.insert(&mut cells, &mut elements, Element::new(v, Point2::new(x, y)));
        }
        assert_eq!(db.stats(&cells).excess, 0);
    }
}

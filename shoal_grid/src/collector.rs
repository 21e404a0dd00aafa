// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collector trait driven by the query traversals.

use core::ops::ControlFlow;

use crate::types::{Element, Scalar};

/// Per-query visitor invoked once for every cell a traversal reaches.
///
/// A collector is caller-supplied mutable state (an accumulator) plus this
/// single visit operation. The traversal hands it the visited cell's linear
/// index and the slice of elements inserted into that cell this cycle; what
/// "matching" means (a radius check, a k-nearest heap, first-found) is
/// entirely the collector's business: the traversal never inspects
/// elements itself.
///
/// Returning [`ControlFlow::Break`] stops the traversal immediately; no
/// further cells are visited. The check is cooperative, made once per
/// visited cell. A collector must not assume any particular number of cells
/// will be visited.
///
/// The trait is blanket-implemented for closures, so ad-hoc queries stay
/// light:
///
/// ```rust
/// use core::ops::ControlFlow;
/// use shoal_grid::{Element, Point2, SpatialDatabase};
///
/// let mut cells = Vec::new();
/// let mut elements = Vec::new();
/// let db = SpatialDatabase::initialize(4.0_f32, 4, 2, &mut cells, &mut elements);
/// db.insert(&mut cells, &mut elements, Element::new(7_u32, Point2::new(1.0, 1.0)));
///
/// let mut seen = Vec::new();
/// db.query_range(
///     &cells,
///     &elements,
///     Point2::new(1.0, 1.0),
///     Point2::new(0.5, 0.5),
///     &mut |_cell, bucket: &[Element<f32, u32>]| {
///         seen.extend(bucket.iter().map(|e| e.value));
///         ControlFlow::Continue(())
///     },
/// );
/// assert_eq!(seen, vec![7]);
/// ```
pub trait Collector<S: Scalar, V> {
    /// Visit one cell's live bucket.
    fn visit(&mut self, cell_index: usize, bucket: &[Element<S, V>]) -> ControlFlow<()>;
}

impl<S, V, F> Collector<S, V> for F
where
    S: Scalar,
    F: FnMut(usize, &[Element<S, V>]) -> ControlFlow<()>,
{
    #[inline]
    fn visit(&mut self, cell_index: usize, bucket: &[Element<S, V>]) -> ControlFlow<()> {
        self(cell_index, bucket)
    }
}

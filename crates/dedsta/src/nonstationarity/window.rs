//! Ring buffer of recent observations feeding the stationarity test.

use crate::error::{DedstaError, DedstaResult};
use crate::sample::check_finite;

/// A bounded circular buffer of D-dimensional rows.
///
/// When full, the oldest row is overwritten. Rows are stored row-major in a
/// single flat buffer that is allocated once the first row fixes the
/// dimension.
#[derive(Clone, Debug)]
pub struct ObservationWindow {
    data: Vec<f64>,
    capacity: usize,
    dimension: Option<usize>,
    head: usize,
    len: usize,
}

impl ObservationWindow {
    /// Create an empty window holding at most `capacity` rows.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity: capacity.max(1),
            dimension: None,
            head: 0,
            len: 0,
        }
    }

    /// Check that `row` is finite and matches the established dimension,
    /// without storing it.
    pub fn accepts(&self, row: &[f64]) -> DedstaResult<()> {
        match self.dimension {
            Some(expected) if expected != row.len() => Err(DedstaError::DimensionMismatch {
                expected,
                actual: row.len(),
            }),
            _ if row.is_empty() => Err(DedstaError::DimensionMismatch {
                expected: 1,
                actual: 0,
            }),
            _ => check_finite(row),
        }
    }

    /// Append a row, overwriting the oldest if full.
    pub fn push(&mut self, row: &[f64]) -> DedstaResult<()> {
        self.accepts(row)?;
        let dim = *self.dimension.get_or_insert(row.len());
        if self.data.is_empty() {
            self.data = vec![0.0; self.capacity * dim];
        }
        let start = self.head * dim;
        self.data[start..start + dim].copy_from_slice(row);
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
        Ok(())
    }

    /// Slot indices in insertion order (oldest first).
    fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        let start = if self.len < self.capacity { 0 } else { self.head };
        (0..self.len).map(move |k| (start + k) % self.capacity)
    }

    /// Values of dimension `d` over the retained rows, oldest first.
    ///
    /// Returns `None` if `d` is out of range or no row was pushed yet.
    pub fn column(&self, d: usize) -> Option<Vec<f64>> {
        let dim = self.dimension?;
        if d >= dim {
            return None;
        }
        Some(self.slots().map(|slot| self.data[slot * dim + d]).collect())
    }

    /// Retained rows, oldest first.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        match self.dimension {
            Some(dim) => self
                .slots()
                .map(|slot| self.data[slot * dim..(slot + 1) * dim].to_vec())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of rows currently in the window.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of rows.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Utilization as a fraction (0.0 to 1.0).
    pub fn utilization(&self) -> f64 {
        self.len as f64 / self.capacity as f64
    }
}

//! Index expressions and row-range resolution.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::IndexError;

/// Return the number of rows in `start..stop` taken every `step` rows.
///
/// ```
/// assert_eq!(fileview::get_slice_size(0, 10, 3), 4);
/// assert_eq!(fileview::get_slice_size(5, 5, 1), 0);
/// ```
pub fn get_slice_size(start: usize, stop: usize, step: usize) -> usize {
    if stop <= start || step == 0 {
        return 0;
    }
    (stop - start).div_ceil(step)
}

/// A slice with optional bounds and step, following Python slicing rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    /// First index; negative values count from the end.
    pub start: Option<isize>,
    /// Exclusive end; negative values count from the end.
    pub stop: Option<isize>,
    /// Stride; negative values walk backwards. `None` means one.
    pub step: Option<isize>,
}

impl Slice {
    /// Construct a slice from its three optional parts.
    pub const fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// The full slice `::`.
    pub const fn full() -> Self {
        Self::new(None, None, None)
    }

    /// Replace the step.
    #[must_use]
    pub const fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolve against a sequence of length `len`, returning `(start, stop, step)`.
    ///
    /// Mirrors Python's `slice.indices`: out-of-range bounds are clamped and
    /// for negative steps `start` may be `-1`-relative.
    pub fn indices(&self, len: usize) -> Result<(isize, isize, isize), IndexError> {
        let len = isize::try_from(len).unwrap_or(isize::MAX);
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(IndexError::ZeroStep);
        }
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });
        Ok((start, stop, step))
    }

    /// Resolve into the ascending row range a backend can read.
    pub fn resolve(&self, len: usize) -> Result<RowRange, IndexError> {
        let (start, stop, step) = self.indices(len)?;
        if step > 0 {
            // all three are non-negative for a positive step
            let (start, stop) = (start as usize, stop as usize);
            return Ok(RowRange::new(start, stop.max(start), step as usize));
        }
        let stride = step.unsigned_abs();
        if start <= stop {
            return Ok(RowRange::new(0, 0, stride).reversed());
        }
        let count = (start - stop - 1).unsigned_abs() / stride + 1;
        let last = start.unsigned_abs() - (count - 1) * stride;
        Ok(RowRange::new(last, start.unsigned_abs() + 1, stride).reversed())
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

impl From<Range<isize>> for Slice {
    fn from(r: Range<isize>) -> Self {
        Self::new(Some(r.start), Some(r.end), None)
    }
}

impl From<RangeFrom<isize>> for Slice {
    fn from(r: RangeFrom<isize>) -> Self {
        Self::new(Some(r.start), None, None)
    }
}

impl From<RangeTo<isize>> for Slice {
    fn from(r: RangeTo<isize>) -> Self {
        Self::new(None, Some(r.end), None)
    }
}

/// An ascending row range `start..stop` with stride `step`.
///
/// `reversed` marks ranges produced by negative-step slices; the rows are
/// read in ascending order and flipped afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// First row read.
    pub start: usize,
    /// One past the last row read.
    pub stop: usize,
    /// Stride, at least one.
    pub step: usize,
    /// Whether the rows must be returned in descending order.
    pub reversed: bool,
}

impl RowRange {
    /// Construct an ascending range.
    pub const fn new(start: usize, stop: usize, step: usize) -> Self {
        Self {
            start,
            stop,
            step,
            reversed: false,
        }
    }

    #[must_use]
    const fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Number of rows covered.
    pub fn len(&self) -> usize {
        get_slice_size(self.start, self.stop, self.step)
    }

    /// Returns `true` if no rows are covered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a single (possibly negative) row index against `size` rows.
    pub fn single(index: isize, size: usize) -> Result<Self, IndexError> {
        let row = resolve_position(index, size)
            .ok_or(IndexError::RowOutOfBounds { index, size })?;
        Ok(Self::new(row, row + 1, 1))
    }
}

/// Map a possibly negative position onto `0..len`.
pub(crate) fn resolve_position(index: isize, len: usize) -> Option<usize> {
    let position = if index < 0 {
        len.checked_sub(index.unsigned_abs())?
    } else {
        index.unsigned_abs()
    };
    (position < len).then_some(position)
}

/// An index expression accepted by `FileView::get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    /// A single column name; yields a flattened single-column view.
    Column(String),
    /// An ordered list of column names; yields a column-subset view.
    Columns(Vec<String>),
    /// A single row, negative values counting from the end.
    Row(isize),
    /// A range of rows.
    Slice(Slice),
    /// Per-axis indices: the row axis and optionally the trailing axis.
    Tuple(Vec<Index>),
}

impl Index {
    /// Human readable kind, used in error messages.
    pub fn kind(&self) -> String {
        match self {
            Index::Column(name) => format!("column name '{name}'"),
            Index::Columns(names) => format!("column list {names:?}"),
            Index::Row(i) => format!("integer {i}"),
            Index::Slice(s) => format!("slice {s:?}"),
            Index::Tuple(items) => format!("tuple of length {}", items.len()),
        }
    }
}

impl From<&str> for Index {
    fn from(name: &str) -> Self {
        Index::Column(name.to_string())
    }
}

impl From<String> for Index {
    fn from(name: String) -> Self {
        Index::Column(name)
    }
}

impl From<Vec<String>> for Index {
    fn from(names: Vec<String>) -> Self {
        Index::Columns(names)
    }
}

impl From<Vec<&str>> for Index {
    fn from(names: Vec<&str>) -> Self {
        Index::Columns(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Index {
    fn from(names: &[&str]) -> Self {
        Index::Columns(names.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Index {
    fn from(names: [&str; N]) -> Self {
        Index::Columns(names.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<isize> for Index {
    fn from(row: isize) -> Self {
        Index::Row(row)
    }
}

impl From<i32> for Index {
    fn from(row: i32) -> Self {
        Index::Row(row as isize)
    }
}

impl From<usize> for Index {
    fn from(row: usize) -> Self {
        Index::Row(isize::try_from(row).unwrap_or(isize::MAX))
    }
}

impl From<Slice> for Index {
    fn from(slice: Slice) -> Self {
        Index::Slice(slice)
    }
}

impl From<RangeFull> for Index {
    fn from(r: RangeFull) -> Self {
        Index::Slice(r.into())
    }
}

impl From<Range<isize>> for Index {
    fn from(r: Range<isize>) -> Self {
        Index::Slice(r.into())
    }
}

impl From<RangeFrom<isize>> for Index {
    fn from(r: RangeFrom<isize>) -> Self {
        Index::Slice(r.into())
    }
}

impl From<RangeTo<isize>> for Index {
    fn from(r: RangeTo<isize>) -> Self {
        Index::Slice(r.into())
    }
}

impl<A: Into<Index>> From<(A,)> for Index {
    fn from((a,): (A,)) -> Self {
        Index::Tuple(vec![a.into()])
    }
}

impl<A: Into<Index>, B: Into<Index>> From<(A, B)> for Index {
    fn from((a, b): (A, B)) -> Self {
        Index::Tuple(vec![a.into(), b.into()])
    }
}

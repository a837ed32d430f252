//! Windowed addressing of the exclusion domain
//!
//! A [`Window`] names the sub-region of the full domain requested in a single
//! mask call: either a pair of half-open ranges, explicit index sequences, or
//! the whole domain. Range windows can be expanded symmetrically so that
//! contiguous-area filtering sees the neighborhood around the requested
//! region, and cropped back afterwards via the recorded [`CropOffset`].

use crate::error::{Error, Result};
use ndarray::{s, Array2};
use std::ops::Range;

/// A rectangular or index-addressed sub-region of the full domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    /// The whole domain
    Full,
    /// Half-open row and column ranges
    Ranges {
        rows: Range<usize>,
        cols: Range<usize>,
    },
    /// Explicit row and column index sequences (cross-product selection)
    Indices { rows: Vec<usize>, cols: Vec<usize> },
}

impl Window {
    /// Range window over `rows` x `cols`
    pub fn ranges(rows: Range<usize>, cols: Range<usize>) -> Self {
        Window::Ranges { rows, cols }
    }

    /// Explicit-index window; reads select `rows` then `cols` (cross product)
    pub fn indices(rows: Vec<usize>, cols: Vec<usize>) -> Self {
        Window::Indices { rows, cols }
    }

    /// Whether this window is expressible as two independent ranges.
    ///
    /// Only such windows can be expanded for boundary-correct area filtering;
    /// `Full` already covers the whole domain and needs no expansion.
    pub fn is_ranges(&self) -> bool {
        matches!(self, Window::Ranges { .. })
    }

    /// Shape of the array produced by reading this window from a domain of
    /// shape `domain`
    pub fn shape(&self, domain: (usize, usize)) -> (usize, usize) {
        match self {
            Window::Full => domain,
            Window::Ranges { rows, cols } => (rows.len(), cols.len()),
            Window::Indices { rows, cols } => (rows.len(), cols.len()),
        }
    }

    /// Validate this window against the domain bounds
    pub fn check_bounds(&self, domain: (usize, usize)) -> Result<()> {
        let (rows, cols) = domain;
        let oob = |end_row, end_col| Error::WindowOutOfBounds {
            end_row,
            end_col,
            rows,
            cols,
        };

        match self {
            Window::Full => Ok(()),
            Window::Ranges { rows: r, cols: c } => {
                if r.end > rows || c.end > cols {
                    return Err(oob(r.end, c.end));
                }
                Ok(())
            }
            Window::Indices { rows: r, cols: c } => {
                let max_row = r.iter().copied().max().map_or(0, |m| m + 1);
                let max_col = c.iter().copied().max().map_or(0, |m| m + 1);
                if max_row > rows || max_col > cols {
                    return Err(oob(max_row, max_col));
                }
                Ok(())
            }
        }
    }

    /// Expand a range window symmetrically by `factor` times its extent per
    /// axis, clamped to the domain.
    ///
    /// Returns the padded window together with the [`CropOffset`] that
    /// recovers the originally requested region. Clamping at a domain edge
    /// makes the padding asymmetric there; the offset accounts for it
    /// exactly. `Full` and `Indices` windows are returned unchanged with an
    /// identity offset.
    pub fn expand(&self, domain: (usize, usize), factor: usize) -> (Window, CropOffset) {
        match self {
            Window::Ranges { rows, cols } => {
                let (padded_rows, row_offset) = pad_axis(rows, domain.0, factor);
                let (padded_cols, col_offset) = pad_axis(cols, domain.1, factor);
                let padded = Window::Ranges {
                    rows: padded_rows,
                    cols: padded_cols,
                };
                let offset = CropOffset {
                    row: row_offset,
                    col: col_offset,
                    rows: rows.len(),
                    cols: cols.len(),
                };
                (padded, offset)
            }
            other => {
                let (rows, cols) = other.shape(domain);
                (
                    other.clone(),
                    CropOffset {
                        row: 0,
                        col: 0,
                        rows,
                        cols,
                    },
                )
            }
        }
    }
}

/// Pad one axis of a range window, returning the padded range and how far the
/// original start sits inside it.
fn pad_axis(range: &Range<usize>, extent: usize, factor: usize) -> (Range<usize>, usize) {
    let pad = factor * range.len();
    let start = range.start.saturating_sub(pad);
    let end = (range.end + pad).min(extent);
    (start..end, range.start - start)
}

/// Where the originally requested region sits inside a padded window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOffset {
    /// Row of the padded window where the original region starts
    pub row: usize,
    /// Column of the padded window where the original region starts
    pub col: usize,
    /// Row extent of the original region
    pub rows: usize,
    /// Column extent of the original region
    pub cols: usize,
}

impl CropOffset {
    /// Crop a mask computed over the padded window back to the original
    /// region.
    pub fn crop(&self, mask: Array2<f32>) -> Array2<f32> {
        if self.row == 0 && self.col == 0 && mask.dim() == (self.rows, self.cols) {
            return mask;
        }
        mask.slice(s![
            self.row..self.row + self.rows,
            self.col..self.col + self.cols
        ])
        .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_resolution() {
        let domain = (100, 200);
        assert_eq!(Window::Full.shape(domain), (100, 200));
        assert_eq!(Window::ranges(10..20, 30..45).shape(domain), (10, 15));
        assert_eq!(
            Window::indices(vec![0, 5, 9], vec![1, 2]).shape(domain),
            (3, 2)
        );
    }

    #[test]
    fn test_bounds_check() {
        let domain = (100, 100);
        assert!(Window::ranges(10..20, 10..20).check_bounds(domain).is_ok());
        assert!(Window::ranges(10..101, 10..20).check_bounds(domain).is_err());
        assert!(Window::indices(vec![99], vec![0]).check_bounds(domain).is_ok());
        assert!(Window::indices(vec![100], vec![0])
            .check_bounds(domain)
            .is_err());
    }

    #[test]
    fn test_expand_interior() {
        // 10-cell extent in the middle of the domain: 10 cells of padding on
        // each side, offset 10.
        let window = Window::ranges(40..50, 40..50);
        let (padded, offset) = window.expand((100, 100), 1);
        assert_eq!(padded, Window::ranges(30..60, 30..60));
        assert_eq!(offset.row, 10);
        assert_eq!(offset.col, 10);
    }

    #[test]
    fn test_expand_clamped_at_edge() {
        // Requesting rows 10:20 with factor 1 on a 100x100 domain clamps the
        // lower edge at 0, leaving the original start 10 cells in.
        let window = Window::ranges(10..20, 10..20);
        let (padded, offset) = window.expand((100, 100), 1);
        assert_eq!(padded, Window::ranges(0..30, 0..30));
        assert_eq!(offset.row, 10);
        assert_eq!(offset.col, 10);
        assert_eq!(offset.rows, 10);
        assert_eq!(offset.cols, 10);
    }

    #[test]
    fn test_expand_clamped_at_far_edge() {
        let window = Window::ranges(90..100, 0..10);
        let (padded, offset) = window.expand((100, 100), 1);
        assert_eq!(padded, Window::ranges(80..100, 0..20));
        assert_eq!(offset.row, 10);
        assert_eq!(offset.col, 0);
    }

    #[test]
    fn test_expand_noop_for_full_and_indices() {
        let domain = (50, 50);
        let (padded, offset) = Window::Full.expand(domain, 1);
        assert_eq!(padded, Window::Full);
        assert_eq!(offset.row, 0);
        assert_eq!((offset.rows, offset.cols), (50, 50));

        let window = Window::indices(vec![1, 2], vec![3]);
        let (padded, offset) = window.expand(domain, 1);
        assert_eq!(padded, window);
        assert_eq!((offset.rows, offset.cols), (2, 1));
    }

    #[test]
    fn test_crop_recovers_original_region() {
        let window = Window::ranges(10..20, 10..20);
        let (padded, offset) = window.expand((100, 100), 1);
        let (rows, cols) = padded.shape((100, 100));
        let mask = Array2::from_shape_fn((rows, cols), |(r, c)| (r * 100 + c) as f32);
        let cropped = offset.crop(mask.clone());
        assert_eq!(cropped.dim(), (10, 10));
        // Cell (0, 0) of the crop is cell (10, 10) of the padded window.
        assert_eq!(cropped[(0, 0)], mask[(10, 10)]);
        assert_eq!(cropped[(9, 9)], mask[(19, 19)]);
    }

    #[test]
    fn test_crop_identity() {
        let offset = CropOffset {
            row: 0,
            col: 0,
            rows: 4,
            cols: 4,
        };
        let mask = Array2::<f32>::ones((4, 4));
        assert_eq!(offset.crop(mask.clone()), mask);
    }
}

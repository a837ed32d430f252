//! Contiguous-area filtering of inclusion masks
//!
//! Removes connected inclusion regions whose footprint is too small to be
//! practically developable. Strictly-positive cells are foreground; regions
//! are maximal connected components under the configured [`Kernel`].

use gridmask_core::{Error, Result};
use ndarray::Array2;
use std::collections::VecDeque;
use std::str::FromStr;

/// Area of one exclusion pixel in km², assuming 90 m resolution
pub const PIXEL_AREA_KM2: f64 = 0.0081;

/// Connectivity rule for region labeling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    /// 4-neighbor connectivity
    Rook,
    /// 8-neighbor connectivity
    #[default]
    Queen,
}

impl Kernel {
    /// Neighbor offsets under this connectivity rule
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Kernel::Rook => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Kernel::Queen => &[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ],
        }
    }

    /// Canonical kernel name
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Rook => "rook",
            Kernel::Queen => "queen",
        }
    }
}

impl FromStr for Kernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rook" => Ok(Kernel::Rook),
            "queen" => Ok(Kernel::Queen),
            other => Err(Error::UnknownKernel(other.to_string())),
        }
    }
}

/// Zero out connected inclusion regions smaller than `min_area` km².
///
/// Each maximal connected foreground region (cells > 0 under `kernel`
/// connectivity) is flood-filled and its pixel count compared against
/// `ceil(min_area / pixel_area)`; regions below the threshold are set to 0.
/// Background cells are never labeled. Idempotent for fixed parameters.
///
/// Run this over a window padded with [`Window::expand`] — on a naively
/// cropped window a genuinely large region cut by the window edge appears
/// artificially small and would be wrongly removed.
///
/// [`Window::expand`]: gridmask_core::Window::expand
pub fn area_filter(mask: &mut Array2<f32>, kernel: Kernel, min_area: f64, pixel_area: f64) {
    let min_count = (min_area / pixel_area).ceil() as usize;
    if min_count <= 1 {
        // Every nonempty region holds at least one pixel.
        return;
    }

    let (rows, cols) = mask.dim();
    let offsets = kernel.offsets();
    let mut labeled = Array2::<bool>::from_elem((rows, cols), false);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut region: Vec<(usize, usize)> = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if mask[(row, col)] <= 0.0 || labeled[(row, col)] {
                continue;
            }

            region.clear();
            labeled[(row, col)] = true;
            queue.push_back((row, col));
            region.push((row, col));

            while let Some((r, c)) = queue.pop_front() {
                for &(dr, dc) in offsets {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if mask[(nr, nc)] > 0.0 && !labeled[(nr, nc)] {
                        labeled[(nr, nc)] = true;
                        queue.push_back((nr, nc));
                        region.push((nr, nc));
                    }
                }
            }

            if region.len() < min_count {
                for &(r, c) in &region {
                    mask[(r, c)] = 0.0;
                }
            }
        }
    }
}

use crate::error::{Error, Result};
use nalgebra::SVector;
use num_traits::{Float, NumCast};
use std::path::{Path, PathBuf};

/// A bounding box in `[x, y, w, h]` (top-left, width, height) layout.
pub type BoundingBox = SVector<f64, 4>;

/// Arithmetic mean of `values`. An empty slice has no mean.
pub fn mean<T: Float>(values: &[T]) -> Result<T> {
    if values.is_empty() {
        return Err(Error::EmptySeries);
    }
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    let count: T = NumCast::from(values.len()).unwrap_or_else(T::nan);
    Ok(sum / count)
}

/// Compute IoU between two bounding boxes in `[x, y, w, h]` layout.
pub fn compute_iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let a_x2 = a[0] + a[2];
    let a_y2 = a[1] + a[3];
    let b_x2 = b[0] + b[2];
    let b_y2 = b[1] + b[3];

    compute_iou_tlbr(a[0], a[1], a_x2, a_y2, b[0], b[1], b_x2, b_y2)
}

/// Helper function to compute IoU from top-left and bottom-right coordinates
#[allow(clippy::too_many_arguments)]
fn compute_iou_tlbr(
    a_x1: f64,
    a_y1: f64,
    a_x2: f64,
    a_y2: f64,
    b_x1: f64,
    b_y1: f64,
    b_x2: f64,
    b_y2: f64,
) -> f64 {
    let x1 = a_x1.max(b_x1);
    let y1 = a_y1.max(b_y1);
    let x2 = a_x2.min(b_x2);
    let y2 = a_y2.min(b_y2);

    let inter_area = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let a_area = (a_x2 - a_x1) * (a_y2 - a_y1);
    let b_area = (b_x2 - b_x1) * (b_y2 - b_y1);

    if a_area + b_area - inter_area <= 0.0 {
        return 0.0;
    }

    inter_area / (a_area + b_area - inter_area)
}

/// Expand a leading `~` to the home directory and make the path absolute.
pub fn expand_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        return expanded;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(expanded),
        Err(_) => expanded,
    }
}

//! Sub-sample refinement of extrema in sampled functions.
use crate::float::Float;

pub struct Point<T: Float> {
    pub x: T,
    pub y: T,
}

/// Vertex of the parabola through three equally spaced points. Works for
/// both maxima and minima. When the points are collinear the center is
/// returned unchanged.
pub fn quadratic_interpolation<T: Float>(
    left: Point<T>,
    center: Point<T>,
    right: Point<T>,
) -> Point<T> {
    let denominator = T::cast(2.0) * center.y - left.y - right.y;
    if denominator == T::zero() {
        return center;
    }
    let shift = T::cast(0.5) * (right.y - left.y) / denominator;
    let x = center.x + shift;
    let y = center.y + T::cast(0.25) * (right.y - left.y) * shift;
    Point { x, y }
}

/// Refine the position of a discrete minimum at `index` in `data`. The
/// neighbours `index - 1` and `index + 1` must exist. The shift is clamped
/// to half a sample so a skewed neighbourhood cannot move the estimate past
/// the adjacent bins.
pub fn refine_minimum<T: Float>(data: &[u32], index: usize) -> T {
    let at = |i: usize| Point {
        x: T::cast(i as f64),
        y: T::cast(data[i] as f64),
    };
    let vertex = quadratic_interpolation(at(index - 1), at(index), at(index + 1));
    let center = T::cast(index as f64);
    let half = T::cast(0.5);
    (vertex.x - center).max(-half).min(half) + center
}

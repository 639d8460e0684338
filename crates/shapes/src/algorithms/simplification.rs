use crate::{traits::PolygonSimplifier, types::Point};

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Coincident `a` and `b` give 0.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return 0.0;
    }
    (dy * p.x - dx * p.y + b.x * a.y - b.y * a.x).abs() / length
}

/// Ramer–Douglas–Peucker over a single contiguous point array.
///
/// Uses an explicit stack of `(start, end)` index ranges and a keep flag per
/// point instead of recursing on slices. The first and last input point are
/// always kept; inputs with fewer than 3 points are returned unchanged.
pub fn douglas_peucker(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let epsilon = epsilon.max(0.0);
    let last = points.len() - 1;

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let mut max_distance = 0.0;
        let mut index = start;
        for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
            let distance = perpendicular_distance(p, a, b);
            if distance > max_distance {
                max_distance = distance;
                index = i;
            }
        }

        if max_distance > epsilon {
            keep[index] = true;
            ranges.push((index, end));
            ranges.push((start, index));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Drop the trailing vertex of a simplified ring when it lies within
/// `epsilon` of the closing edge from its predecessor back to the first
/// vertex.
///
/// A traced boundary ends on the pixel next to its start, so after
/// simplification that pixel survives as an extra endpoint sitting on the
/// last edge. Counting corners of the closed shape needs it gone.
pub fn close_ring(mut vertices: Vec<Point>, epsilon: f64) -> Vec<Point> {
    if vertices.len() < 3 {
        return vertices;
    }
    let n = vertices.len();
    let (prev, tail, first) = (vertices[n - 2], vertices[n - 1], vertices[0]);
    if perpendicular_distance(tail, prev, first) <= epsilon.max(0.0) {
        vertices.pop();
    }
    vertices
}

/// Douglas-Peucker simplifier
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl PolygonSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, points: &[Point], epsilon: f64) -> Vec<Point> {
        douglas_peucker(points, epsilon)
    }
}

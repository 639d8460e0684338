use tracing::debug;
use crate::{
    traits::BoundaryTracer,
    types::{Blob, Boundary, Point},
};

/// Compass offsets in clockwise order starting from north:
/// N, NE, E, SE, S, SW, W, NW (image y grows downward).
const DIRECTIONS: [(i64, i64); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Moore-neighbor boundary tracer.
///
/// Starts at the topmost-leftmost pixel heading north. Each step searches the
/// 8 neighbors clockwise beginning one step counter-clockwise of the current
/// heading, moves to the first member found and adopts that direction. Stops
/// when the next pixel is the start pixel (closed) or no neighbor exists
/// (open, partial trace returned as-is).
#[derive(Debug, Clone, Default)]
pub struct MooreTracer {
    /// Upper bound on emitted points; `None` means `4 * blob size + 8`.
    pub max_steps: Option<usize>,
}

impl MooreTracer {
    fn step_budget(&self, blob: &Blob) -> usize {
        self.max_steps.unwrap_or(blob.len() * 4 + 8)
    }
}

impl BoundaryTracer for MooreTracer {
    fn trace(&self, blob: &Blob) -> Boundary {
        let Some((sx, sy)) = blob.start_pixel() else {
            return Boundary { points: Vec::new(), closed: false };
        };
        let start = (sx as i64, sy as i64);
        let budget = self.step_budget(blob);

        let mut current = start;
        let mut dir = 0usize;
        let mut points = Vec::new();

        loop {
            points.push(Point { x: current.0 as f64, y: current.1 as f64 });

            if points.len() >= budget {
                debug!(
                    "Boundary trace from {:?} hit its {} step budget without closing",
                    start, budget
                );
                return Boundary { points, closed: false };
            }

            let next = (0..8).map(|i| (dir + 7 + i) % 8).find_map(|d| {
                let (dx, dy) = DIRECTIONS[d];
                let candidate = (current.0 + dx, current.1 + dy);
                blob.contains(candidate.0, candidate.1).then_some((d, candidate))
            });

            match next {
                None => return Boundary { points, closed: false },
                Some((_, candidate)) if candidate == start => {
                    return Boundary { points, closed: true };
                }
                Some((d, candidate)) => {
                    current = candidate;
                    dir = d;
                }
            }
        }
    }
}

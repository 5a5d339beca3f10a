//! Meander point generation.

use crate::edb::Point;

use super::{TraceGeometry, START};

/// Centreline points of a meandered trace starting at `(start.x, start.y + offset)`.
///
/// Each of the `count` repetitions steps `+height` in x, `+height` in y,
/// `+height` in x and `-height` in y, emitting a point after every step.
/// A negative `count` emits no repetitions.
#[must_use]
pub fn meander_points(start: Point, offset: f64, height: f64, count: i64) -> Vec<Point> {
    let repetitions = usize::try_from(count).unwrap_or(0);
    let mut x = start.x;
    let mut y = start.y + offset;
    let mut points = Vec::with_capacity(4 * repetitions + 1);
    points.push(Point::new(x, y));

    for _ in 0..repetitions {
        x += height;
        points.push(Point::new(x, y));
        y += height;
        points.push(Point::new(x, y));
        x += height;
        points.push(Point::new(x, y));
        y -= height;
        points.push(Point::new(x, y));
    }

    points
}

/// The two centrelines of a differential pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffPair {
    /// Positive-net centreline, offset `+(width + gap) / 2`.
    pub positive: Vec<Point>,
    /// Negative-net centreline, offset `-(width + gap) / 2`.
    pub negative: Vec<Point>,
}

impl DiffPair {
    /// Generates both centrelines from the pair geometry.
    #[must_use]
    pub fn generate(geometry: &TraceGeometry) -> Self {
        let offset = geometry.offset();
        Self {
            positive: meander_points(START, offset, geometry.intra_height, geometry.intra_count),
            negative: meander_points(START, -offset, geometry.intra_height, geometry.intra_count),
        }
    }
}

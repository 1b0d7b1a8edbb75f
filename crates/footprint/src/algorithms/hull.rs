use geo_types::MultiPoint;
use crate::{
    error::Result,
    traits::HullBuilder,
    types::{ConvexHull, Point, PointSet},
};

/// Twice the signed area of the triangle `o, a, b`; positive for a left turn.
pub(crate) fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn lexicographic(a: &Point, b: &Point) -> std::cmp::Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Rotate so the lowest-then-leftmost vertex comes first.
fn rotate_to_start(vertices: &mut [Point]) {
    let start = vertices
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    vertices.rotate_left(start);
}

/// Andrew's monotone chain hull
#[derive(Debug, Clone, Default)]
pub struct MonotoneChainHull;

impl HullBuilder for MonotoneChainHull {
    fn build_hull(&self, points: &PointSet) -> Result<ConvexHull> {
        let mut sorted = points.points().to_vec();
        sorted.sort_by(lexicographic);
        sorted.dedup();

        if sorted.len() < 3 {
            rotate_to_start(&mut sorted);
            return ConvexHull::new(sorted);
        }

        let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
        for &p in &sorted {
            while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
                lower.pop();
            }
            lower.push(p);
        }

        let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
        for &p in sorted.iter().rev() {
            while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
                upper.pop();
            }
            upper.push(p);
        }

        // Each chain ends where the other begins
        lower.pop();
        upper.pop();
        lower.extend(upper);

        rotate_to_start(&mut lower);
        ConvexHull::new(lower)
    }
}

/// QuickHull from the geo crate, normalised to the same vertex convention
#[derive(Debug, Clone, Default)]
pub struct QuickHull;

impl HullBuilder for QuickHull {
    fn build_hull(&self, points: &PointSet) -> Result<ConvexHull> {
        use geo::{ConvexHull as _, Winding};

        let multi_point = MultiPoint::from(points.points().to_vec());
        let polygon = multi_point.convex_hull();

        let mut ring = polygon.exterior().clone();
        ring.make_ccw_winding();

        let mut vertices = ring.0;
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        ConvexHull::new(normalize_ring(vertices))
    }
}

/// Drop repeated and collinear vertices from a counter-clockwise ring and
/// rotate it to the canonical start.
fn normalize_ring(mut vertices: Vec<Point>) -> Vec<Point> {
    vertices.dedup();
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    let n = vertices.len();
    let flat = n < 3
        || (0..n).all(|i| cross(vertices[(i + n - 1) % n], vertices[i], vertices[(i + 1) % n]) == 0.0);

    if flat {
        // Segment: keep the two extremes
        let mut extremes = vertices.clone();
        extremes.sort_by(lexicographic);
        extremes.dedup();
        if extremes.len() > 2 {
            let last = extremes.len() - 1;
            extremes = vec![extremes[0], extremes[last]];
        }
        rotate_to_start(&mut extremes);
        return extremes;
    }

    loop {
        let n = vertices.len();
        let collinear = (0..n)
            .find(|&i| cross(vertices[(i + n - 1) % n], vertices[i], vertices[(i + 1) % n]) == 0.0);
        match collinear {
            Some(i) => {
                vertices.remove(i);
            }
            None => break,
        }
    }

    rotate_to_start(&mut vertices);
    vertices
}

use tracing::trace;
use crate::{
    error::{FootprintError, Result},
    traits::RectangleFitter,
    types::{CandidateRectangle, ConvexHull, OrientedRectangle, Rotation},
};

/// Minimum-area rectangle by aligning each hull edge with the x axis in turn.
///
/// One side of the optimal rectangle is always collinear with a hull edge, so
/// testing every edge's orientation is exhaustive. Ties keep the earliest edge
/// in hull order.
#[derive(Debug, Clone, Default)]
pub struct RotatingEdgeFitter;

impl RotatingEdgeFitter {
    /// Bounding box of the hull rotated so that edge `edge_index` is horizontal.
    pub fn candidate(hull: &ConvexHull, edge_index: usize) -> CandidateRectangle {
        let vertices = hull.vertices();
        let from = vertices[edge_index];
        let to = vertices[(edge_index + 1) % vertices.len()];
        let rotation = Rotation::aligning(from, to);

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for &v in vertices {
            let r = rotation.apply(v);
            min_x = min_x.min(r.x);
            max_x = max_x.max(r.x);
            min_y = min_y.min(r.y);
            max_y = max_y.max(r.y);
        }

        CandidateRectangle {
            edge_index,
            rotation,
            min_x,
            max_x,
            min_y,
            max_y,
            area: (max_x - min_x) * (max_y - min_y),
        }
    }
}

impl RectangleFitter for RotatingEdgeFitter {
    fn fit_rectangle(&self, hull: &ConvexHull) -> Result<OrientedRectangle> {
        if hull.len() < 2 {
            return Err(FootprintError::GeometricComputation(format!(
                "rectangle search needs at least 2 hull vertices, got {}",
                hull.len()
            )));
        }

        let mut best: Option<CandidateRectangle> = None;
        for edge_index in 0..hull.len() {
            let candidate = Self::candidate(hull, edge_index);
            trace!(edge_index, angle = candidate.rotation.angle, area = candidate.area, "candidate rectangle");
            if best.map_or(true, |b| candidate.area < b.area) {
                best = Some(candidate);
            }
        }

        best.map(CandidateRectangle::into_oriented).ok_or_else(|| {
            FootprintError::GeometricComputation("no candidate rectangle".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::MonotoneChainHull;
    use crate::traits::HullBuilder;
    use crate::types::{Point, PointSet};
    use geo::{Area, MinimumRotatedRect};
    use geo_types::Coord;

    fn hull_of(coords: &[(f64, f64)]) -> ConvexHull {
        let points = PointSet::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
            .expect("points");
        MonotoneChainHull.build_hull(&points).expect("hull")
    }

    fn grid(width: usize, height: usize) -> Vec<(f64, f64)> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x as f64, y as f64)))
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_axis_aligned_grid() {
        let hull = hull_of(&grid(10, 5));
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");

        assert_eq!(rect.edge_index, 0);
        assert!(rect.angle.abs() < 1e-12);
        assert!(close(rect.area, 36.0));
        assert!(close(rect.length(), 9.0));
        assert!(close(rect.breadth(), 4.0));
    }

    #[test]
    fn test_corners_map_back_to_original_frame() {
        let hull = hull_of(&grid(10, 5));
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");
        let expected = [(0.0, 0.0), (9.0, 0.0), (9.0, 4.0), (0.0, 4.0)];
        for (corner, (x, y)) in rect.corners.iter().zip(expected) {
            assert!(close(corner.x, x) && close(corner.y, y), "{corner:?}");
        }
    }

    #[test]
    fn test_rotated_square_finds_tilted_rectangle() {
        // Diamond: the axis-aligned box has area 16, the tilted one 8
        let hull = hull_of(&[(2.0, 0.0), (4.0, 2.0), (2.0, 4.0), (0.0, 2.0)]);
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");
        assert!(close(rect.area, 8.0));
        assert!(close(rect.length(), 8f64.sqrt()));
        assert!(close(rect.breadth(), 8f64.sqrt()));
    }

    #[test]
    fn test_collinear_hull_has_zero_breadth() {
        let hull = hull_of(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (5.0, 5.0)]);
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");
        assert!(rect.area.abs() < 1e-9);
        assert!(rect.breadth().abs() < 1e-9);
        assert!(close(rect.length(), 50f64.sqrt()));
    }

    #[test]
    fn test_first_edge_wins_ties() {
        // Every edge of a square yields the same area
        let hull = hull_of(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");
        assert_eq!(rect.edge_index, 0);
    }

    #[test]
    fn test_all_hull_vertices_inside_rectangle() {
        let hull = hull_of(&[(0.0, 0.0), (7.0, 2.0), (9.0, 6.0), (3.0, 8.0), (-1.0, 4.0)]);
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");
        let candidate = RotatingEdgeFitter::candidate(&hull, rect.edge_index);
        for &v in hull.vertices() {
            let r: Point = candidate.rotation.apply(v);
            assert!(r.x >= candidate.min_x - 1e-9 && r.x <= candidate.max_x + 1e-9);
            assert!(r.y >= candidate.min_y - 1e-9 && r.y <= candidate.max_y + 1e-9);
        }
    }

    #[test]
    fn test_area_agrees_with_geo_minimum_rotated_rect() {
        let hull = hull_of(&[
            (0.0, 0.0), (7.0, 2.0), (9.0, 6.0), (3.0, 8.0), (-1.0, 4.0), (4.0, 4.0),
        ]);
        let rect = RotatingEdgeFitter.fit_rectangle(&hull).expect("rectangle");
        let reference = hull
            .to_geo_polygon()
            .minimum_rotated_rect()
            .expect("non-degenerate polygon")
            .unsigned_area();
        assert!((rect.area - reference).abs() < 1e-6, "{} vs {}", rect.area, reference);
    }
}

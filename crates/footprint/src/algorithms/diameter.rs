use geo::EuclideanDistance;
use crate::{
    algorithms::hull::cross,
    error::Result,
    traits::DiameterFinder,
    types::{ConvexHull, HullDiameter, Point},
};

fn distance(a: Point, b: Point) -> f64 {
    geo_types::Point::from(a).euclidean_distance(&geo_types::Point::from(b))
}

fn single_vertex(hull: &ConvexHull) -> HullDiameter {
    let v = hull.vertices()[0];
    HullDiameter {
        length: 0.0,
        endpoints: [v, v],
    }
}

/// Checks every vertex pair; the first pair in enumeration order wins ties
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveDiameter;

impl DiameterFinder for ExhaustiveDiameter {
    fn find_diameter(&self, hull: &ConvexHull) -> Result<HullDiameter> {
        let vertices = hull.vertices();
        let mut best = single_vertex(hull);

        for (i, &a) in vertices.iter().enumerate() {
            for &b in &vertices[i + 1..] {
                let d = distance(a, b);
                if d > best.length {
                    best = HullDiameter {
                        length: d,
                        endpoints: [a, b],
                    };
                }
            }
        }

        Ok(best)
    }
}

/// Antipodal-pair walk over a counter-clockwise hull, linear in the vertex count.
/// Returns the same length as [`ExhaustiveDiameter`]; the endpoints may differ
/// when several pairs share the maximum.
#[derive(Debug, Clone, Default)]
pub struct RotatingCalipersDiameter;

impl DiameterFinder for RotatingCalipersDiameter {
    fn find_diameter(&self, hull: &ConvexHull) -> Result<HullDiameter> {
        let v = hull.vertices();
        let n = v.len();
        let mut best = single_vertex(hull);

        let mut consider = |a: Point, b: Point| {
            let d = distance(a, b);
            if d > best.length {
                best = HullDiameter {
                    length: d,
                    endpoints: [a, b],
                };
            }
        };

        if n == 2 {
            consider(v[0], v[1]);
        } else if n > 2 {
            let mut j = 1;
            for i in 0..n {
                let next = (i + 1) % n;
                // Advance j while it moves further from edge (i, next)
                while cross(v[i], v[next], v[(j + 1) % n]) > cross(v[i], v[next], v[j]) {
                    j = (j + 1) % n;
                }
                consider(v[i], v[j]);
                consider(v[next], v[j]);
            }
        }

        Ok(best)
    }
}

use std::fmt;

use geo_types::{Coord, LineString, Polygon};
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::error::{FootprintError, Result};

/// A pixel-space position, `x` = column and `y` = row.
pub type Point = Coord<f64>;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;
pub const ARCSEC_PER_RADIAN: f64 = 648_000.0 / std::f64::consts::PI;
pub const PARSEC_PER_MEGAPARSEC: f64 = 1.0e6;

/// Valid (finite) pixel positions of one image, at least two of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            return Err(FootprintError::InsufficientData {
                found: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Convex hull vertices, counter-clockwise from the lowest-then-leftmost vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvexHull {
    vertices: Vec<Point>,
}

impl ConvexHull {
    pub fn new(vertices: Vec<Point>) -> Result<Self> {
        if vertices.is_empty() {
            return Err(FootprintError::GeometricComputation(
                "convex hull has no vertices".to_string(),
            ));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when the hull has no interior (a segment or a single point).
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Directed edges `(v[i], v[i + 1 mod V])` in hull order.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Convert to a geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::new(self.vertices.clone()), vec![])
    }

    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }
}

/// Planar rotation by `angle` radians (counter-clockwise for positive angles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotation {
    pub angle: f64,
    cos: f64,
    sin: f64,
}

impl Rotation {
    pub fn new(angle: f64) -> Self {
        Self {
            angle,
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    /// Rotation that maps the direction of `to - from` onto the +x axis.
    pub fn aligning(from: Point, to: Point) -> Self {
        let edge = to - from;
        Self::new(-edge.y.atan2(edge.x))
    }

    pub fn apply(&self, p: Point) -> Point {
        Coord {
            x: self.cos * p.x - self.sin * p.y,
            y: self.sin * p.x + self.cos * p.y,
        }
    }

    pub fn invert(&self, p: Point) -> Point {
        Coord {
            x: self.cos * p.x + self.sin * p.y,
            y: -self.sin * p.x + self.cos * p.y,
        }
    }
}

/// Axis-aligned bounding box of the hull after rotating it by one edge's angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRectangle {
    pub edge_index: usize,
    pub rotation: Rotation,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub area: f64,
}

impl CandidateRectangle {
    /// Corners in the original (unrotated) frame.
    pub fn corners(&self) -> [Point; 4] {
        [
            Coord { x: self.min_x, y: self.min_y },
            Coord { x: self.max_x, y: self.min_y },
            Coord { x: self.max_x, y: self.max_y },
            Coord { x: self.min_x, y: self.max_y },
        ]
        .map(|c| self.rotation.invert(c))
    }

    pub fn into_oriented(self) -> OrientedRectangle {
        OrientedRectangle {
            angle: self.rotation.angle,
            edge_index: self.edge_index,
            area: self.area,
            corners: self.corners(),
        }
    }
}

/// The minimum-area enclosing rectangle found by the edge search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrientedRectangle {
    /// Rotation (radians) that made the winning edge horizontal.
    pub angle: f64,
    /// Index of the hull edge the rectangle is flush against.
    pub edge_index: usize,
    pub area: f64,
    pub corners: [Point; 4],
}

impl OrientedRectangle {
    /// Distances between consecutive corners.
    pub fn edge_lengths(&self) -> [f64; 4] {
        std::array::from_fn(|i| {
            let d = self.corners[(i + 1) % 4] - self.corners[i];
            d.x.hypot(d.y)
        })
    }

    pub fn length(&self) -> f64 {
        self.edge_lengths().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn breadth(&self) -> f64 {
        self.edge_lengths().into_iter().fold(f64::INFINITY, f64::min)
    }

    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::new(self.corners.to_vec()), vec![])
    }
}

/// Largest vertex-to-vertex distance of a hull and the pair achieving it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HullDiameter {
    pub length: f64,
    pub endpoints: [Point; 2],
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr,
)]
pub enum Quantity {
    Length,
    Breadth,
    Diagonal,
}

/// One row of the output table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub quantity: Quantity,
    pub pixels: f64,
    pub angular_arcsec: f64,
    pub physical_pc: f64,
}

/// Length, Breadth and Diagonal, always in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementTable {
    pub rows: [Measurement; 3],
}

impl MeasurementTable {
    pub fn get(&self, quantity: Quantity) -> &Measurement {
        match quantity {
            Quantity::Length => &self.rows[0],
            Quantity::Breadth => &self.rows[1],
            Quantity::Diagonal => &self.rows[2],
        }
    }

    pub fn length(&self) -> &Measurement {
        self.get(Quantity::Length)
    }

    pub fn breadth(&self) -> &Measurement {
        self.get(Quantity::Breadth)
    }

    pub fn diagonal(&self) -> &Measurement {
        self.get(Quantity::Diagonal)
    }
}

impl fmt::Display for MeasurementTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:>14} {:>22} {:>18}",
            "Quantity", "Pixels", "Angular", "Physical"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<10} {:>14.4} {:>15.4} arcsec {:>15.4} pc",
                row.quantity.to_string(),
                row.pixels,
                row.angular_arcsec,
                row.physical_pc
            )?;
        }
        Ok(())
    }
}

/// Angular size of one pixel step along each image axis, in arcseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelScale {
    x_arcsec: f64,
    y_arcsec: f64,
}

impl PixelScale {
    pub fn from_arcsec(x_arcsec: f64, y_arcsec: f64) -> Result<Self> {
        for (name, value) in [("pixel_scale.x", x_arcsec), ("pixel_scale.y", y_arcsec)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FootprintError::invalid(
                    name,
                    format!("must be positive and finite, got {value}"),
                ));
            }
        }
        Ok(Self { x_arcsec, y_arcsec })
    }

    /// Per-axis scale from a 2x2 pixel-scale matrix in degrees per pixel,
    /// taking the Euclidean norm of each row.
    pub fn from_matrix_degrees(matrix: [[f64; 2]; 2]) -> Result<Self> {
        let [row_x, row_y] = matrix;
        Self::from_arcsec(
            row_x[0].hypot(row_x[1]) * ARCSEC_PER_DEGREE,
            row_y[0].hypot(row_y[1]) * ARCSEC_PER_DEGREE,
        )
    }

    pub fn x_arcsec(&self) -> f64 {
        self.x_arcsec
    }

    pub fn y_arcsec(&self) -> f64 {
        self.y_arcsec
    }
}

/// Distance to the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distance {
    megaparsecs: f64,
}

impl Distance {
    pub fn from_megaparsecs(megaparsecs: f64) -> Result<Self> {
        if !megaparsecs.is_finite() || megaparsecs <= 0.0 {
            return Err(FootprintError::invalid(
                "distance",
                format!("must be positive and finite, got {megaparsecs} Mpc"),
            ));
        }
        Ok(Self { megaparsecs })
    }

    pub fn megaparsecs(&self) -> f64 {
        self.megaparsecs
    }

    pub fn parsecs(&self) -> f64 {
        self.megaparsecs * PARSEC_PER_MEGAPARSEC
    }
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintReport {
    pub table: MeasurementTable,
    pub hull: ConvexHull,
    pub rectangle: OrientedRectangle,
    pub diameter: HullDiameter,
    pub pixel_scale: PixelScale,
    pub distance: Distance,
    pub image_width: usize,
    pub image_height: usize,
    pub valid_pixels: usize,
}

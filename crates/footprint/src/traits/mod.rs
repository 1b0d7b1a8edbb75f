use ndarray::{Array2, ArrayView2, ArrayView3};
use crate::{
    error::Result,
    types::{ConvexHull, HullDiameter, OrientedRectangle, PointSet},
};

/// Trait for collapsing a data cube into a single 2D image
pub trait CubeReducer: Send + Sync {
    /// Reduce a `(planes, rows, columns)` cube to `(rows, columns)`
    fn reduce(&self, cube: ArrayView3<'_, f64>) -> Result<Array2<f64>>;
}

/// Trait for turning image samples into pixel positions
pub trait PointExtractor: Send + Sync {
    /// Extract the positions of the samples that belong to the source
    fn extract_points(&self, image: ArrayView2<'_, f64>) -> Result<PointSet>;
}

/// Trait for convex hull algorithms
pub trait HullBuilder: Send + Sync {
    /// Build the hull, counter-clockwise from the lowest-then-leftmost vertex
    fn build_hull(&self, points: &PointSet) -> Result<ConvexHull>;
}

/// Trait for enclosing-rectangle searches
pub trait RectangleFitter: Send + Sync {
    /// Find the minimum-area rectangle enclosing the hull
    fn fit_rectangle(&self, hull: &ConvexHull) -> Result<OrientedRectangle>;
}

/// Trait for hull diameter algorithms
pub trait DiameterFinder: Send + Sync {
    /// Find the two hull vertices furthest apart
    fn find_diameter(&self, hull: &ConvexHull) -> Result<HullDiameter>;
}

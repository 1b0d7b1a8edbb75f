pub mod builder;

use ndarray::{ArrayView2, ArrayViewD, CowArray, Ix2, Ix3};
use tracing::{debug, info};
use crate::{
    algorithms::measure,
    error::{FootprintError, Result},
    traits::{CubeReducer, DiameterFinder, HullBuilder, PointExtractor, RectangleFitter},
    types::{Distance, FootprintReport, PixelScale},
};

/// Footprint measurement pipeline: points → hull → rectangle + diameter → units
pub struct Pipeline {
    cube_reducer: Box<dyn CubeReducer>,
    point_extractor: Box<dyn PointExtractor>,
    hull_builder: Box<dyn HullBuilder>,
    rectangle_fitter: Box<dyn RectangleFitter>,
    diameter_finder: Box<dyn DiameterFinder>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        cube_reducer: Box<dyn CubeReducer>,
        point_extractor: Box<dyn PointExtractor>,
        hull_builder: Box<dyn HullBuilder>,
        rectangle_fitter: Box<dyn RectangleFitter>,
        diameter_finder: Box<dyn DiameterFinder>,
    ) -> Self {
        Self {
            cube_reducer,
            point_extractor,
            hull_builder,
            rectangle_fitter,
            diameter_finder,
        }
    }

    /// Bring a 2D image or 3D cube down to the 2D image the core measures
    pub fn to_image<'a>(&self, data: ArrayViewD<'a, f64>) -> Result<CowArray<'a, f64, Ix2>> {
        let shape_error = |e: ndarray::ShapeError| FootprintError::GeometricComputation(e.to_string());

        match data.ndim() {
            2 => Ok(CowArray::from(data.into_dimensionality::<Ix2>().map_err(shape_error)?)),
            3 => {
                let cube = data.into_dimensionality::<Ix3>().map_err(shape_error)?;
                debug!(planes = cube.dim().0, "reducing cube to 2D image");
                Ok(CowArray::from(self.cube_reducer.reduce(cube)?))
            }
            ndim => Err(FootprintError::UnsupportedDimensionality { ndim }),
        }
    }

    /// Process a 2D image or 3D cube through the entire pipeline
    pub fn process(
        &self,
        data: ArrayViewD<'_, f64>,
        scale: PixelScale,
        distance: Distance,
    ) -> Result<FootprintReport> {
        let image = self.to_image(data)?;
        self.process_image(image.view(), scale, distance)
    }

    /// Process a 2D image through the entire pipeline
    pub fn process_image(
        &self,
        image: ArrayView2<'_, f64>,
        scale: PixelScale,
        distance: Distance,
    ) -> Result<FootprintReport> {
        let (image_height, image_width) = image.dim();

        // Step 1: Valid pixel positions
        let points = self.point_extractor.extract_points(image)?;
        debug!(valid_pixels = points.len(), "extracted points");

        // Step 2: Convex hull
        let hull = self.hull_builder.build_hull(&points)?;
        if hull.is_degenerate() {
            debug!(vertices = hull.len(), "collinear footprint, breadth will be zero");
        } else {
            debug!(vertices = hull.len(), "built convex hull");
        }

        // Step 3: Minimum-area rectangle and hull diameter
        let rectangle = self.rectangle_fitter.fit_rectangle(&hull)?;
        let diameter = self.diameter_finder.find_diameter(&hull)?;

        // Step 4: Unit conversion
        let table = measure(
            rectangle.length(),
            rectangle.breadth(),
            diameter.length,
            scale,
            distance,
        );

        info!(
            length_pc = table.length().physical_pc,
            breadth_pc = table.breadth().physical_pc,
            diagonal_pc = table.diagonal().physical_pc,
            "measured footprint"
        );

        Ok(FootprintReport {
            table,
            hull,
            rectangle,
            diameter,
            pixel_scale: scale,
            distance,
            image_width,
            image_height,
            valid_pixels: points.len(),
        })
    }
}

use crate::{
    pipeline::Pipeline,
    traits::{CubeReducer, DiameterFinder, HullBuilder, PointExtractor, RectangleFitter},
    algorithms::{
        ExhaustiveDiameter,
        FiniteSampleExtractor,
        MonotoneChainHull,
        NanMeanReducer,
        QuickHull,
        RotatingCalipersDiameter,
        RotatingEdgeFitter,
    },
};

/// Builder for creating measurement pipelines with a fluent API
#[derive(Default)]
pub struct PipelineBuilder {
    cube_reducer: Option<Box<dyn CubeReducer>>,
    point_extractor: Option<Box<dyn PointExtractor>>,
    hull_builder: Option<Box<dyn HullBuilder>>,
    rectangle_fitter: Option<Box<dyn RectangleFitter>>,
    diameter_finder: Option<Box<dyn DiameterFinder>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cube reducer (replaces any existing one)
    pub fn set_cube_reducer<R>(mut self, reducer: R) -> Self
    where
        R: CubeReducer + 'static,
    {
        self.cube_reducer = Some(Box::new(reducer));
        self
    }

    /// Set the point extractor (replaces any existing one)
    pub fn set_point_extractor<E>(mut self, extractor: E) -> Self
    where
        E: PointExtractor + 'static,
    {
        self.point_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the hull builder (replaces any existing one)
    pub fn set_hull_builder<H>(mut self, builder: H) -> Self
    where
        H: HullBuilder + 'static,
    {
        self.hull_builder = Some(Box::new(builder));
        self
    }

    /// Set the rectangle fitter (replaces any existing one)
    pub fn set_rectangle_fitter<F>(mut self, fitter: F) -> Self
    where
        F: RectangleFitter + 'static,
    {
        self.rectangle_fitter = Some(Box::new(fitter));
        self
    }

    /// Set the diameter finder (replaces any existing one)
    pub fn set_diameter_finder<D>(mut self, finder: D) -> Self
    where
        D: DiameterFinder + 'static,
    {
        self.diameter_finder = Some(Box::new(finder));
        self
    }

    /// Use geo's QuickHull instead of the monotone chain
    pub fn with_quickhull(self) -> Self {
        self.set_hull_builder(QuickHull)
    }

    /// Use the linear-time rotating calipers diameter
    pub fn with_rotating_calipers(self) -> Self {
        self.set_diameter_finder(RotatingCalipersDiameter)
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        Pipeline::new(
            self.cube_reducer.unwrap_or_else(|| Box::new(NanMeanReducer)),
            self.point_extractor.unwrap_or_else(|| Box::new(FiniteSampleExtractor)),
            self.hull_builder.unwrap_or_else(|| Box::new(MonotoneChainHull)),
            self.rectangle_fitter.unwrap_or_else(|| Box::new(RotatingEdgeFitter)),
            self.diameter_finder.unwrap_or_else(|| Box::new(ExhaustiveDiameter)),
        )
    }
}

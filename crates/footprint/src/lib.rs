//! # Source Footprint Measurement
//!
//! Measures the physical extent of a source from the valid (finite) pixels
//! of a 2D image or 3D cube: the minimum-area bounding rectangle of their
//! convex hull gives Length and Breadth, the largest pairwise hull distance
//! gives the Diagonal. Pixel sizes are converted to arcseconds through the
//! pixel scale and to parsecs through the source distance.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use footprint::{FootprintCommand, FootprintManager};
//!
//! let mut manager = FootprintManager::new();
//! manager.load_fits("ngc4214.fits")?;
//!
//! let report = manager.execute(&FootprintCommand::Measure { distance_mpc: 2.94 })?;
//! println!("{}", report.table);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use footprint::{Pipeline, Distance, PixelScale};
//! use ndarray::Array2;
//!
//! let pipeline = Pipeline::builder()
//!     .with_quickhull()
//!     .with_rotating_calipers()
//!     .build();
//!
//! let image = Array2::<f64>::ones((64, 64));
//! let report = pipeline.process_image(
//!     image.view(),
//!     PixelScale::from_arcsec(0.2, 0.2)?,
//!     Distance::from_megaparsecs(16.5)?,
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;
pub mod manager;

pub use error::{FootprintError, Result};
pub use types::{
    ConvexHull, Distance, FootprintReport, HullDiameter, Measurement, MeasurementTable,
    OrientedRectangle, PixelScale, Point, PointSet, Quantity,
};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::{
    pixel_scale, pixel_scale_matrix, read_fits, render_overlay, save_overlay, FitsHeader,
    FitsImage, HeaderValue, OverlayStyle, WcsOptions,
};
pub use manager::{FootprintCommand, FootprintManager};

use ndarray::ArrayViewD;

/// Measure a 2D image or 3D cube with the default pipeline.
///
/// `pixel_scale_matrix` is in degrees per pixel (rows are world axes) and
/// `distance_mpc` in megaparsecs. Dimensionality is checked first, then the
/// scale and distance, then the amount of valid data.
pub fn analyze(
    data: ArrayViewD<'_, f64>,
    pixel_scale_matrix: [[f64; 2]; 2],
    distance_mpc: f64,
) -> Result<FootprintReport> {
    let pipeline = Pipeline::builder().build();
    let image = pipeline.to_image(data)?;
    let scale = PixelScale::from_matrix_degrees(pixel_scale_matrix)?;
    let distance = Distance::from_megaparsecs(distance_mpc)?;
    pipeline.process_image(image.view(), scale, distance)
}

use geo_types::Coord;
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use crate::{
    error::Result,
    traits::{CubeReducer, PointExtractor},
    types::PointSet,
};

/// Keeps every finite sample; non-finite values mark missing data
#[derive(Debug, Clone, Default)]
pub struct FiniteSampleExtractor;

impl PointExtractor for FiniteSampleExtractor {
    fn extract_points(&self, image: ArrayView2<'_, f64>) -> Result<PointSet> {
        // Row-major: y outer, x inner
        let points = image
            .indexed_iter()
            .filter(|(_, value)| value.is_finite())
            .map(|((row, column), _)| Coord {
                x: column as f64,
                y: row as f64,
            })
            .collect();

        PointSet::new(points)
    }
}

/// Mean over the first (spectral) axis, ignoring non-finite samples.
/// A pixel with no finite sample in any plane stays NaN.
#[derive(Debug, Clone, Default)]
pub struct NanMeanReducer;

impl CubeReducer for NanMeanReducer {
    fn reduce(&self, cube: ArrayView3<'_, f64>) -> Result<Array2<f64>> {
        let (_, rows, columns) = cube.dim();
        let mut sum = Array2::<f64>::zeros((rows, columns));
        let mut count = Array2::<u32>::zeros((rows, columns));

        for plane in cube.axis_iter(Axis(0)) {
            ndarray::Zip::from(&mut sum)
                .and(&mut count)
                .and(&plane)
                .for_each(|s, n, &v| {
                    if v.is_finite() {
                        *s += v;
                        *n += 1;
                    }
                });
        }

        Ok(ndarray::Zip::from(&sum)
            .and(&count)
            .map_collect(|&s, &n| if n == 0 { f64::NAN } else { s / n as f64 }))
    }
}

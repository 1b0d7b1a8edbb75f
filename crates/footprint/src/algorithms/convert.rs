use crate::types::{
    Distance, Measurement, MeasurementTable, PixelScale, Quantity, ARCSEC_PER_RADIAN,
};

/// Small-angle conversion of an angular size to parsecs.
pub fn arcsec_to_parsecs(angular_arcsec: f64, distance: Distance) -> f64 {
    angular_arcsec / ARCSEC_PER_RADIAN * distance.parsecs()
}

/// Build the output table from pixel-space sizes.
///
/// Length is scaled by the x pixel scale and Breadth by the y pixel scale.
/// Diagonal has no canonical axis and is scaled by the x pixel scale; this is a
/// known approximation kept for numeric compatibility with earlier results.
pub fn measure(
    length_pix: f64,
    breadth_pix: f64,
    diagonal_pix: f64,
    scale: PixelScale,
    distance: Distance,
) -> MeasurementTable {
    let row = |quantity, pixels: f64, arcsec_per_pixel: f64| {
        let angular_arcsec = pixels * arcsec_per_pixel;
        Measurement {
            quantity,
            pixels,
            angular_arcsec,
            physical_pc: arcsec_to_parsecs(angular_arcsec, distance),
        }
    };

    MeasurementTable {
        rows: [
            row(Quantity::Length, length_pix, scale.x_arcsec()),
            row(Quantity::Breadth, breadth_pix, scale.y_arcsec()),
            row(Quantity::Diagonal, diagonal_pix, scale.x_arcsec()),
        ],
    }
}

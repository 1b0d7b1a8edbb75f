use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FootprintError, Result},
    types::{FootprintReport, Point},
};

/// Colours used when drawing the footprint over the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub rectangle_color: [u8; 3],
    pub diagonal_color: [u8; 3],
    /// Also outline the convex hull when set
    pub hull_color: Option<[u8; 3]>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            rectangle_color: [0, 0, 255],
            diagonal_color: [255, 0, 0],
            hull_color: None,
        }
    }
}

/// Grayscale rendering of `image` (origin lower left) with the bounding
/// rectangle and diagonal drawn on top.
pub fn render_overlay(
    image: ArrayView2<'_, f64>,
    report: &FootprintReport,
    style: &OverlayStyle,
) -> Result<RgbImage> {
    let (rows, columns) = image.dim();
    let too_large =
        |_| FootprintError::invalid("image", format!("{rows}x{columns} exceeds the canvas size limit"));
    let width = u32::try_from(columns).map_err(too_large)?;
    let height = u32::try_from(rows).map_err(too_large)?;

    let (min, max) = image
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let mut canvas = RgbImage::new(width, height);
    for ((row, column), &value) in image.indexed_iter() {
        let gray = if !value.is_finite() {
            0
        } else if max > min {
            ((value - min) / (max - min) * 255.0).round() as u8
        } else {
            128
        };
        // Both indices are below the checked canvas dimensions
        canvas.put_pixel(column as u32, height - 1 - row as u32, Rgb([gray; 3]));
    }

    let flip = |p: Point| (p.x as f32, (rows as f64 - 1.0 - p.y) as f32);
    let polyline = |canvas: &mut RgbImage, points: &[Point], color: [u8; 3]| {
        for (i, &p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            draw_line_segment_mut(canvas, flip(p), flip(q), Rgb(color));
        }
    };

    if let Some(color) = style.hull_color {
        polyline(&mut canvas, report.hull.vertices(), color);
    }
    polyline(&mut canvas, &report.rectangle.corners, style.rectangle_color);

    let [a, b] = report.diameter.endpoints;
    draw_line_segment_mut(&mut canvas, flip(a), flip(b), Rgb(style.diagonal_color));

    Ok(canvas)
}

/// Render the overlay and write it as an image file (format from extension)
pub fn save_overlay(
    path: impl AsRef<Path>,
    image: ArrayView2<'_, f64>,
    report: &FootprintReport,
    style: &OverlayStyle,
) -> Result<()> {
    render_overlay(image, report, style)?.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::types::{Distance, PixelScale};
    use ndarray::Array2;

    fn report_for(image: &Array2<f64>) -> FootprintReport {
        Pipeline::builder()
            .build()
            .process_image(
                image.view(),
                PixelScale::from_arcsec(1.0, 1.0).expect("scale"),
                Distance::from_megaparsecs(1.0).expect("distance"),
            )
            .expect("report")
    }

    #[test]
    fn test_overlay_draws_rectangle_and_diagonal() {
        let mut image = Array2::<f64>::from_shape_fn((5, 10), |(r, c)| (r * 10 + c) as f64);
        image[[3, 2]] = f64::NAN;
        let report = report_for(&image);

        let canvas = render_overlay(image.view(), &report, &OverlayStyle::default())
            .expect("canvas");
        assert_eq!(canvas.dimensions(), (10, 5));
        // Data row 0 is drawn along the bottom of the canvas
        assert_eq!(canvas.get_pixel(5, 4), &Rgb([0, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 4), &Rgb([255, 0, 0]));
        // The NaN sample at row 3, column 2 is black
        assert_eq!(canvas.get_pixel(2, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_image_wider_than_canvas_limit_is_rejected() {
        let report = report_for(&Array2::<f64>::ones((3, 3)));
        let pixel = Array2::<f64>::zeros((1, 1));
        let wide = pixel
            .broadcast((1, u32::MAX as usize + 1))
            .expect("broadcast");

        let err = render_overlay(wide, &report, &OverlayStyle::default()).unwrap_err();
        assert!(matches!(err, FootprintError::InvalidParameter { name: "image", .. }));
    }
}

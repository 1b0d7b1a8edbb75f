//! Linear pixel-scale matrix from FITS WCS keywords.
//!
//! Only the celestial 2x2 part is read: `CDi_j`, or `CDELTi` combined with
//! `PCi_j` or the legacy `CROTA2`. Projection terms are ignored; the analyzer
//! works with a locally linear scale.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{FootprintError, Result},
    io::fits::FitsHeader,
    types::PixelScale,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WcsOptions {
    /// Log headers that had to be fixed up at debug level instead of warning.
    pub suppress_fixed_warnings: bool,
}

impl Default for WcsOptions {
    fn default() -> Self {
        Self {
            suppress_fixed_warnings: true,
        }
    }
}

impl WcsOptions {
    fn fixed(&self, message: &str) {
        if self.suppress_fixed_warnings {
            debug!(fix = message, "non-standard WCS header");
        } else {
            warn!(fix = message, "non-standard WCS header");
        }
    }
}

/// Degrees per pixel step: rows are world axes, columns are pixel axes.
pub fn pixel_scale_matrix(header: &FitsHeader, options: &WcsOptions) -> Result<[[f64; 2]; 2]> {
    let (matrix, fixes) = scale_matrix(header)?;
    fixes.iter().for_each(|fix| options.fixed(fix));
    debug!(?matrix, "pixel scale matrix");
    Ok(matrix)
}

/// The matrix and a note for every header value that had to be fixed up.
fn scale_matrix(header: &FitsHeader) -> Result<([[f64; 2]; 2], Vec<String>)> {
    let value = |key: &str, default: f64| header.get_f64(key).unwrap_or(default);
    let any = |keys: &[&str]| keys.iter().any(|k| header.contains(k));
    let mut fixes = Vec::new();

    if header.contains("RADECSYS") && !header.contains("RADESYS") {
        fixes.push("RADECSYS is deprecated, read as RADESYS".to_string());
    }

    let mut matrix = if any(&["CD1_1", "CD1_2", "CD2_1", "CD2_2"]) {
        [
            [value("CD1_1", 0.0), value("CD1_2", 0.0)],
            [value("CD2_1", 0.0), value("CD2_2", 0.0)],
        ]
    } else {
        let has_cdelt = any(&["CDELT1", "CDELT2"]);
        let has_pc = any(&["PC1_1", "PC1_2", "PC2_1", "PC2_2"]);
        let crota = header.get_f64("CROTA2").or_else(|| header.get_f64("CROTA1"));

        if !has_cdelt && !has_pc {
            return Err(FootprintError::MissingWcs);
        }

        let cdelt = [value("CDELT1", 1.0), value("CDELT2", 1.0)];

        if has_pc {
            [
                [cdelt[0] * value("PC1_1", 1.0), cdelt[0] * value("PC1_2", 0.0)],
                [cdelt[1] * value("PC2_1", 0.0), cdelt[1] * value("PC2_2", 1.0)],
            ]
        } else if let Some(crota) = crota {
            fixes.push("CROTA2 converted to an equivalent CD matrix".to_string());
            let (sin, cos) = crota.to_radians().sin_cos();
            [
                [cdelt[0] * cos, -cdelt[1] * sin],
                [cdelt[0] * sin, cdelt[1] * cos],
            ]
        } else {
            [[cdelt[0], 0.0], [0.0, cdelt[1]]]
        }
    };

    for (axis, row) in matrix.iter_mut().enumerate() {
        let key = format!("CUNIT{}", axis + 1);
        let factor = match header.get_str(&key).map(str::trim) {
            Some("deg") => 1.0,
            None | Some("") => {
                fixes.push(format!("missing {key}, assuming deg"));
                1.0
            }
            Some("degree") | Some("degrees") | Some("DEG") => {
                fixes.push("non-standard degree unit read as 'deg'".to_string());
                1.0
            }
            Some("arcmin") => 1.0 / 60.0,
            Some("arcsec") => 1.0 / 3600.0,
            Some("mas") => 1.0 / 3.6e6,
            Some("rad") => 180.0 / std::f64::consts::PI,
            Some(other) => {
                fixes.push(format!("unrecognised {key} '{other}', assuming deg"));
                1.0
            }
        };
        row.iter_mut().for_each(|v| *v *= factor);
    }

    Ok((matrix, fixes))
}

/// Per-axis pixel scale derived from the header
pub fn pixel_scale(header: &FitsHeader, options: &WcsOptions) -> Result<PixelScale> {
    PixelScale::from_matrix_degrees(pixel_scale_matrix(header, options)?)
}

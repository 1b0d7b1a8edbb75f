//! Shared fixtures: a minimal FITS writer and a few synthetic sources.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayD};

const BLOCK_SIZE: usize = 2880;

/// Header card with a right-aligned value, as FITS fixed format expects
fn card(keyword: &str, value: &str) -> String {
    format!("{keyword:<8}= {value:>20}{:<50}", "")
}

fn pad(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % BLOCK_SIZE != 0 {
        bytes.push(fill);
    }
}

/// Encode `data` as a single BITPIX = -64 primary HDU with `extra` cards
pub fn fits_bytes(data: &ArrayD<f64>, extra: &[(&str, &str)]) -> Vec<u8> {
    let naxis = data.ndim().to_string();
    let axes: Vec<String> = data.shape().iter().rev().map(|n| n.to_string()).collect();
    let axis_keys: Vec<String> = (1..=axes.len()).map(|i| format!("NAXIS{i}")).collect();

    let mut cards = vec![
        card("SIMPLE", "T"),
        card("BITPIX", "-64"),
        card("NAXIS", &naxis),
    ];
    cards.extend(axis_keys.iter().zip(&axes).map(|(k, v)| card(k, v)));
    cards.extend(extra.iter().map(|(k, v)| card(k, v)));
    cards.push(format!("{:<80}", "END"));

    let mut bytes = cards.concat().into_bytes();
    pad(&mut bytes, b' ');
    bytes.extend(data.iter().flat_map(|v| v.to_be_bytes()));
    pad(&mut bytes, 0);
    bytes
}

/// Write `data` to `dir/name` with a diagonal `CDELT` scale in arcsec
pub fn write_fits(dir: &Path, name: &str, data: &ArrayD<f64>, arcsec_per_pixel: f64) -> PathBuf {
    let cdelt = format!("{:.12E}", arcsec_per_pixel / 3600.0);
    let path = dir.join(name);
    let bytes = fits_bytes(
        data,
        &[
            ("CDELT1", &format!("-{cdelt}")),
            ("CDELT2", &cdelt),
            ("CUNIT1", "'deg     '"),
            ("CUNIT2", "'deg     '"),
        ],
    );
    std::fs::write(&path, bytes).expect("write FITS fixture");
    path
}

/// `rows x columns` image, finite inside the rectangle of full cells
pub fn filled(rows: usize, columns: usize) -> Array2<f64> {
    Array2::from_elem((rows, columns), 1.0)
}

/// Irregular blob: an ellipse with a few holes punched in it, NaN elsewhere
pub fn blob(rows: usize, columns: usize) -> Array2<f64> {
    let (cy, cx) = ((rows as f64 - 1.0) / 2.0, (columns as f64 - 1.0) / 2.0);
    let (ry, rx) = (rows as f64 / 3.0, columns as f64 / 2.5);
    Array2::from_shape_fn((rows, columns), |(r, c)| {
        let dy = (r as f64 - cy) / ry;
        let dx = (c as f64 - cx) / rx;
        let inside = dx * dx + dy * dy <= 1.0 && (r * 7 + c * 13) % 5 != 0;
        if inside { (r + c) as f64 } else { f64::NAN }
    })
}

/// Seven scattered pixels, NaN elsewhere, in a 12 x 16 image. The hull has
/// five vertices, every hull edge gives a rectangle of a different area and
/// exactly one vertex pair is farthest apart, so the footprint is unique.
pub fn scattered() -> Array2<f64> {
    let mut image = Array2::from_elem((12, 16), f64::NAN);
    for (x, y) in [(1, 2), (9, 0), (14, 5), (11, 10), (3, 8), (6, 4), (2, 5)] {
        image[[y, x]] = 1.0;
    }
    image
}

/// Approximate equality for measurements
pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6 * a.abs().max(1.0)
}

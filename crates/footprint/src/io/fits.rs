//! FITS input through `fitrs`: selects the first image HDU and converts its
//! samples to `f64` in numpy axis order (`[NAXISn, …, NAXIS1]`).

use std::path::Path;

use fitrs::{Fits, FitsData, Hdu};
use ndarray::{ArrayD, IxDyn};
use tracing::debug;

use crate::error::{FootprintError, Result};

pub use fitrs::HeaderValue;

/// Keywords copied out of an HDU besides `NAXISn`.
const KEYWORDS: &[&str] = &[
    "SIMPLE", "XTENSION", "EXTNAME", "OBJECT", "BITPIX", "NAXIS", "PCOUNT", "GCOUNT",
    "BSCALE", "BZERO", "BLANK", "RADESYS", "RADECSYS", "EQUINOX",
    "CTYPE1", "CTYPE2", "CUNIT1", "CUNIT2", "CRPIX1", "CRPIX2", "CRVAL1", "CRVAL2",
    "CDELT1", "CDELT2", "CROTA1", "CROTA2",
    "CD1_1", "CD1_2", "CD2_1", "CD2_2", "PC1_1", "PC1_2", "PC2_1", "PC2_2",
];

/// The keywords of one HDU the analyzer reads, as `fitrs` parsed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitsHeader {
    cards: Vec<(String, HeaderValue)>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the known keywords of `hdu`
    pub fn from_hdu(hdu: &Hdu) -> Self {
        let mut header = Self::new();
        for &keyword in KEYWORDS {
            if let Some(value) = hdu.value(keyword) {
                header.push(keyword, value.clone());
            }
        }
        let naxis = header.get_i64("NAXIS").unwrap_or(0).clamp(0, 999);
        for i in 1..=naxis {
            let keyword = format!("NAXIS{i}");
            if let Some(value) = hdu.value(&keyword) {
                header.push(keyword, value.clone());
            }
        }
        header
    }

    pub fn push(&mut self, keyword: impl Into<String>, value: HeaderValue) {
        self.cards.push((keyword.into(), value));
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        match self.get(keyword)? {
            HeaderValue::RealFloatingNumber(v) => Some(*v),
            HeaderValue::IntegerNumber(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Integer keyword; integral reals are accepted since values beyond
    /// `i32` are parsed as floating point.
    pub fn get_i64(&self, keyword: &str) -> Option<i64> {
        match self.get(keyword)? {
            HeaderValue::IntegerNumber(v) => Some(i64::from(*v)),
            HeaderValue::RealFloatingNumber(v) if v.is_finite() && v.fract() == 0.0 => {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        match self.get(keyword)? {
            HeaderValue::CharacterString(s) => Some(s.trim_end()),
            _ => None,
        }
    }

    fn axes(&self) -> Result<Vec<u64>> {
        let naxis = self
            .get_i64("NAXIS")
            .ok_or_else(|| FootprintError::Fits("missing NAXIS".to_string()))?;
        (1..=naxis)
            .map(|i| {
                let key = format!("NAXIS{i}");
                self.get_i64(&key)
                    .and_then(|n| u64::try_from(n).ok())
                    .ok_or_else(|| FootprintError::Fits(format!("missing or negative {key}")))
            })
            .collect()
    }
}

/// The selected image HDU: its header and samples in `[NAXISn, …, NAXIS1]` order.
#[derive(Debug, Clone)]
pub struct FitsImage {
    pub header: FitsHeader,
    pub data: ArrayD<f64>,
}

/// Read a FITS file and return the first HDU carrying image data
pub fn read_fits(path: impl AsRef<Path>) -> Result<FitsImage> {
    let path = path.as_ref();
    let file_len = std::fs::metadata(path)?.len();
    let fits = Fits::open(path)
        .map_err(|e| FootprintError::Fits(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), bytes = file_len, "opened FITS file");

    for (index, hdu) in (0..).map_while(|i| fits.get(i)).enumerate() {
        let header = FitsHeader::from_hdu(&hdu);
        let axes = header.axes()?;
        let bitpix = header
            .get_i64("BITPIX")
            .ok_or_else(|| FootprintError::Fits("missing BITPIX".to_string()))?;

        let data_len = data_unit_len(&header, bitpix, &axes)?;
        if data_len > file_len {
            return Err(FootprintError::Fits(format!(
                "HDU {index} declares {data_len} data bytes, file has {file_len}"
            )));
        }

        let is_image = index == 0 || header.get_str("XTENSION") == Some("IMAGE");
        let has_samples = !axes.is_empty() && axes.iter().all(|&n| n > 0);

        if is_image && has_samples {
            if !matches!(bitpix, 8 | 16 | 32 | -32 | -64) {
                return Err(FootprintError::Fits(format!("unsupported BITPIX {bitpix}")));
            }
            debug!(hdu = index, bitpix, ?axes, "selected image HDU");
            let shape = axes
                .iter()
                .rev()
                .map(|&n| usize::try_from(n))
                .collect::<std::result::Result<Vec<usize>, _>>()
                .map_err(|e| FootprintError::Fits(e.to_string()))?;
            let samples = samples(&hdu.read_data(), &header)?;
            let data = ArrayD::from_shape_vec(IxDyn(&shape), samples)
                .map_err(|e| FootprintError::Fits(e.to_string()))?;
            return Ok(FitsImage { header, data });
        }

        debug!(hdu = index, xtension = ?header.get_str("XTENSION"), "skipping HDU");
    }

    Err(FootprintError::NoImageData)
}

/// Size in bytes of an HDU's data unit, without block padding.
fn data_unit_len(header: &FitsHeader, bitpix: i64, axes: &[u64]) -> Result<u64> {
    if axes.is_empty() {
        return Ok(0);
    }
    let overflow = || FootprintError::Fits("data unit size overflows".to_string());
    let count = |key: &str, default: i64| {
        u64::try_from(header.get_i64(key).unwrap_or(default))
            .map_err(|_| FootprintError::Fits(format!("negative {key}")))
    };

    let pcount = count("PCOUNT", 0)?;
    let gcount = count("GCOUNT", 1)?;
    let bytes_per_sample = bitpix.unsigned_abs() / 8;

    axes.iter()
        .try_fold(1u64, |acc, &n| acc.checked_mul(n))
        .and_then(|n| n.checked_add(pcount))
        .and_then(|n| n.checked_mul(gcount))
        .and_then(|n| n.checked_mul(bytes_per_sample))
        .ok_or_else(overflow)
}

/// Physical values: `BZERO + BSCALE * raw`, with `BLANK` integers as NaN.
fn samples(data: &FitsData, header: &FitsHeader) -> Result<Vec<f64>> {
    let bscale = header.get_f64("BSCALE").unwrap_or(1.0);
    let bzero = header.get_f64("BZERO").unwrap_or(0.0);
    let blank = header.get_i64("BLANK");

    let integer = |v: Option<i64>| match v {
        Some(v) if Some(v) != blank => bzero + bscale * v as f64,
        _ => f64::NAN,
    };

    let samples = match data {
        FitsData::FloatingPoint64(array) => {
            array.data.iter().map(|&v| bzero + bscale * v).collect()
        }
        FitsData::FloatingPoint32(array) => {
            array.data.iter().map(|&v| bzero + bscale * f64::from(v)).collect()
        }
        FitsData::IntegersI32(array) => {
            array.data.iter().map(|v| integer(v.map(i64::from))).collect()
        }
        // Unsigned samples already carry the BZERO offset
        FitsData::IntegersU32(array) => array
            .data
            .iter()
            .map(|v| v.map_or(f64::NAN, |v| bscale * f64::from(v)))
            .collect(),
        FitsData::Characters(array) => {
            array.data.iter().map(|&c| integer(Some(i64::from(u32::from(c))))).collect()
        }
        #[allow(unreachable_patterns)]
        _ => return Err(FootprintError::Fits("unsupported data type".to_string())),
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_SIZE: usize = 2880;

    fn card(keyword: &str, value: &str) -> String {
        format!("{keyword:<8}= {value:>20}{:<50}", "")
    }

    fn hdu(cards: &[(&str, &str)], data: &[u8]) -> Vec<u8> {
        let mut header: String = cards.iter().map(|(k, v)| card(k, v)).collect();
        header.push_str(&format!("{:<80}", "END"));
        while header.len() % BLOCK_SIZE != 0 {
            header.push(' ');
        }
        let mut bytes = header.into_bytes();
        bytes.extend_from_slice(data);
        while bytes.len() % BLOCK_SIZE != 0 {
            bytes.push(0);
        }
        bytes
    }

    fn read(bytes: &[u8]) -> Result<FitsImage> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("image.fits");
        std::fs::write(&path, bytes).expect("write");
        read_fits(&path)
    }

    #[test]
    fn test_reads_float_image_with_nan() {
        let values = [1.0f32, f32::NAN, 3.0, 4.0, 5.0, 6.0];
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        let bytes = hdu(
            &[("SIMPLE", "T"), ("BITPIX", "-32"), ("NAXIS", "2"), ("NAXIS1", "3"), ("NAXIS2", "2")],
            &data,
        );

        let image = read(&bytes).expect("valid FITS");
        assert_eq!(image.data.shape(), &[2, 3]);
        assert_eq!(image.data[[0, 0]], 1.0);
        assert!(image.data[[0, 1]].is_nan());
        assert_eq!(image.data[[1, 2]], 6.0);
    }

    #[test]
    fn test_int16_scaling_and_blank() {
        let values = [-3i16, 0, 100, -1];
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        let bytes = hdu(
            &[
                ("SIMPLE", "T"),
                ("BITPIX", "16"),
                ("NAXIS", "2"),
                ("NAXIS1", "2"),
                ("NAXIS2", "2"),
                ("BSCALE", "2.0"),
                ("BLANK", "-1"),
            ],
            &data,
        );

        let image = read(&bytes).expect("valid FITS");
        assert_eq!(image.data[[0, 0]], -6.0);
        assert_eq!(image.data[[0, 1]], 0.0);
        assert_eq!(image.data[[1, 0]], 200.0);
        assert!(image.data[[1, 1]].is_nan());
    }

    #[test]
    fn test_skips_empty_primary() {
        let mut bytes = hdu(&[("SIMPLE", "T"), ("BITPIX", "8"), ("NAXIS", "0")], &[]);
        let data: Vec<u8> = [2.5f64, 3.5].iter().flat_map(|v| v.to_be_bytes()).collect();
        bytes.extend(hdu(
            &[
                ("XTENSION", "'IMAGE   '"),
                ("BITPIX", "-64"),
                ("NAXIS", "2"),
                ("NAXIS1", "2"),
                ("NAXIS2", "1"),
                ("PCOUNT", "0"),
                ("GCOUNT", "1"),
                ("CDELT1", "-2.5E-4"),
            ],
            &data,
        ));

        let image = read(&bytes).expect("valid FITS");
        assert_eq!(image.data.shape(), &[1, 2]);
        assert_eq!(image.data[[0, 1]], 3.5);
        assert_eq!(image.header.get_str("XTENSION"), Some("IMAGE"));
        assert_eq!(image.header.get_f64("CDELT1"), Some(-2.5e-4));
    }

    #[test]
    fn test_no_image_data() {
        let bytes = hdu(&[("SIMPLE", "T"), ("BITPIX", "8"), ("NAXIS", "0")], &[]);
        assert!(matches!(read(&bytes), Err(FootprintError::NoImageData)));
    }

    #[test]
    fn test_int64_samples_are_rejected() {
        let data = 7i64.to_be_bytes();
        let bytes = hdu(
            &[("SIMPLE", "T"), ("BITPIX", "64"), ("NAXIS", "1"), ("NAXIS1", "1")],
            &data,
        );
        match read(&bytes) {
            Err(FootprintError::Fits(message)) => assert!(message.contains("BITPIX"), "{message}"),
            other => panic!("expected BITPIX error, got {other:?}"),
        }
    }

    #[test]
    fn test_data_unit_past_end_of_file() {
        let bytes = hdu(
            &[("SIMPLE", "T"), ("BITPIX", "-64"), ("NAXIS", "2"), ("NAXIS1", "1000"), ("NAXIS2", "1000")],
            &[],
        );
        assert!(matches!(read(&bytes), Err(FootprintError::Fits(_))));
    }

    #[test]
    fn test_oversized_group_count_is_an_error() {
        let bytes = hdu(
            &[
                ("SIMPLE", "T"),
                ("BITPIX", "-64"),
                ("NAXIS", "2"),
                ("NAXIS1", "1000"),
                ("NAXIS2", "1000"),
                ("PCOUNT", "2000000000"),
                ("GCOUNT", "2000000000"),
            ],
            &[],
        );
        match read(&bytes) {
            Err(FootprintError::Fits(message)) => assert!(message.contains("overflows"), "{message}"),
            other => panic!("expected overflow error, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_axes_overflow_instead_of_panicking() {
        let mut header = FitsHeader::new();
        header.push("NAXIS", HeaderValue::IntegerNumber(2));
        header.push("NAXIS1", HeaderValue::RealFloatingNumber(4_294_967_296_000.0));
        header.push("NAXIS2", HeaderValue::RealFloatingNumber(4_294_967_296_000.0));

        let axes = header.axes().expect("axes");
        assert_eq!(axes, vec![4_294_967_296_000, 4_294_967_296_000]);
        assert!(matches!(
            data_unit_len(&header, -64, &axes),
            Err(FootprintError::Fits(_))
        ));
    }

    #[test]
    fn test_header_accessors() {
        let mut header = FitsHeader::new();
        header.push("CUNIT1", HeaderValue::CharacterString("deg     ".to_string()));
        header.push("NAXIS", HeaderValue::IntegerNumber(3));
        header.push("CDELT1", HeaderValue::RealFloatingNumber(-2.5e-4));

        assert_eq!(header.get_str("CUNIT1"), Some("deg"));
        assert_eq!(header.get_i64("NAXIS"), Some(3));
        assert_eq!(header.get_f64("NAXIS"), Some(3.0));
        assert_eq!(header.get_f64("CDELT1"), Some(-2.5e-4));
        assert_eq!(header.get_i64("CDELT1"), None);
        assert!(!header.contains("CD1_1"));
    }
}

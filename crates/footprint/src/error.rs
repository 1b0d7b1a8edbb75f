use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("Only 2D images or 3D cubes are supported, got {ndim} dimension(s)")]
    UnsupportedDimensionality { ndim: usize },

    #[error("Not enough valid pixels to measure: found {found}, need at least 2")]
    InsufficientData { found: usize },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("No HDU with image data found")]
    NoImageData,

    #[error("Malformed FITS file: {0}")]
    Fits(String),

    #[error("Header carries no pixel scale (no CDi_j, CDELTi or PCi_j keywords)")]
    MissingWcs,

    #[error("Geometric computation error: {0}")]
    GeometricComputation(String),

    #[error("Failed to write image: {0}")]
    ImageWrite(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl FootprintError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FootprintError>;

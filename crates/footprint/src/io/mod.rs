pub mod fits;
pub mod wcs;
pub mod geojson;
pub mod overlay;

pub use fits::{read_fits, FitsHeader, FitsImage, HeaderValue};
pub use wcs::{pixel_scale, pixel_scale_matrix, WcsOptions};
pub use overlay::{render_overlay, save_overlay, OverlayStyle};

pub mod extraction;
pub mod hull;
pub mod rectangle;
pub mod diameter;
pub mod convert;

pub use extraction::*;
pub use hull::{MonotoneChainHull, QuickHull};
pub use rectangle::*;
pub use diameter::*;
pub use convert::{arcsec_to_parsecs, measure};

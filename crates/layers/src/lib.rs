pub mod basemap;
pub mod layer;
pub mod raster;
pub mod symbology;

pub use layer::*;

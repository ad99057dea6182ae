pub mod analysis;
pub mod interpolation;

pub use interpolation::*;

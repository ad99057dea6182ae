pub mod regional;
pub mod statistics;

pub use regional::*;
pub use statistics::*;

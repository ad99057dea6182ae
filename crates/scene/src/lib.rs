pub mod grid;
pub mod picking;
pub mod selection;

pub use grid::*;
pub use selection::*;

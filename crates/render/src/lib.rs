pub mod composite;
pub mod pipeline;
pub mod surface;

pub use composite::*;
pub use pipeline::*;
pub use surface::*;

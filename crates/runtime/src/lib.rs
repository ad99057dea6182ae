pub mod animation;
pub mod event_bus;
pub mod redraw;
pub mod timer;

pub use animation::*;
pub use event_bus::*;
pub use redraw::*;
pub use timer::*;

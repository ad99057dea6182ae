use crate::symbology::LayerStyle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;
    /// Presentation applied when the layer's surface is composed.
    fn style(&self) -> LayerStyle;
}

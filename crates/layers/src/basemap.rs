use foundation::geo::SurfaceSize;

use crate::layer::{Layer, LayerId};
use crate::symbology::LayerStyle;

/// What the base surface was last drawn for. The base layer only needs a
/// redraw when this changes; the current year is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseMapKey {
    pub size: SurfaceSize,
    pub source: Option<String>,
}

/// Static background map.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapLayer {
    id: LayerId,
    pub style: LayerStyle,
    pub source: Option<String>,
}

impl BaseMapLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            style: LayerStyle::default(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn key(&self, size: SurfaceSize) -> BaseMapKey {
        BaseMapKey {
            size,
            source: self.source.clone(),
        }
    }
}

impl Layer for BaseMapLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn style(&self) -> LayerStyle {
        self.style
    }
}

use foundation::time::Year;

/// Things the view reports to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    YearChanged { year: Year },
    PlaybackChanged { playing: bool },
    SpeedChanged { multiplier: u32 },
    /// The selection collections changed; `total` counts both kinds.
    SelectionsChanged { total: usize },
    OverlayCommitted { generation: u64, year: Year },
    BaseRedrawn,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<ViewEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: ViewEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}

//! One interactive map view: dataset, two-layer rendering, playback and
//! selections behind a single owner.
//!
//! All inputs (pointer events, control actions, timer deltas) mutate state
//! synchronously. Overlay repaints are only queued by those inputs; they run
//! when the host asks for the next [`Viewer::frame`].

use compute::analysis::RegionalAnalysis;
use compute::{AnomalyField, Estimate, GridInterpolator};
use foundation::geo::{GeoPoint, PixelPoint, SurfaceSize};
use foundation::time::{Clamped, Year};
use image::RgbaImage;
use render::pipeline::{OverlayCommit, RenderPipeline};
use runtime::animation::{AnimationScheduler, PlaybackSpeed};
use runtime::event_bus::{EventBus, ViewEvent};
use scene::grid::GridDataset;
use scene::picking::pick_value;
use scene::selection::{SelectionChange, SelectionInputError, SelectionMode, SelectionState};
use tracing::{debug, info};

use crate::config::ViewerConfig;

pub struct Viewer {
    config: ViewerConfig,
    dataset: GridDataset,
    dataset_revision: u64,
    pipeline: RenderPipeline,
    scheduler: AnimationScheduler,
    selections: SelectionState,
    events: EventBus,
}

impl Viewer {
    pub fn new(config: ViewerConfig, dataset: GridDataset) -> Self {
        let mut scheduler = AnimationScheduler::new(config.start_year, config.base_interval_ms);
        scheduler.set_speed(config.playback_speed());
        let mut pipeline =
            RenderPipeline::new(config.raster(), config.palette(), config.overlay_style());
        pipeline.set_base_style(config.base_style());
        info!(
            cells = dataset.len(),
            year = scheduler.year(),
            "viewer session created"
        );
        Self {
            config,
            dataset,
            dataset_revision: 0,
            pipeline,
            scheduler,
            selections: SelectionState::new(),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn dataset(&self) -> &GridDataset {
        &self.dataset
    }

    pub fn size(&self) -> SurfaceSize {
        self.pipeline.size()
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn year(&self) -> Year {
        self.scheduler.year()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.scheduler.speed()
    }

    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    pub fn events(&self) -> &[ViewEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        self.events.drain()
    }

    // ---- surfaces -------------------------------------------------------

    pub fn resize(&mut self, size: SurfaceSize) {
        self.pipeline.resize(size);
        self.request_overlay();
    }

    pub fn set_base_image(&mut self, source: impl Into<String>, image: RgbaImage) {
        self.pipeline.set_base_image(source, image);
    }

    /// Swaps the dataset; the overlay is repainted for the current year.
    pub fn set_dataset(&mut self, dataset: GridDataset) {
        self.dataset = dataset;
        self.dataset_revision += 1;
        debug!(
            revision = self.dataset_revision,
            cells = self.dataset.len(),
            "dataset replaced"
        );
        self.request_overlay();
    }

    /// Runs the pending overlay pass, if any.
    pub fn flush(&mut self) -> Option<OverlayCommit> {
        let field = GridInterpolator::new(&self.dataset);
        let commit = self.pipeline.flush(&field)?;
        self.events.emit(ViewEvent::OverlayCommitted {
            generation: commit.ticket.0,
            year: commit.key.year,
        });
        Some(commit)
    }

    /// Brings both surfaces up to date and returns the composed frame.
    /// A `0×0` surface yields an empty image.
    pub fn frame(&mut self) -> RgbaImage {
        if self.pipeline.sync_base() {
            self.events.emit(ViewEvent::BaseRedrawn);
        }
        // A resize before any request leaves nothing queued.
        self.request_overlay();
        self.flush();
        self.pipeline.compose()
    }

    fn request_overlay(&mut self) {
        self.pipeline
            .request_overlay(self.scheduler.year(), self.dataset_revision);
    }

    // ---- playback -------------------------------------------------------

    pub fn play(&mut self) -> bool {
        let started = self.scheduler.play();
        if started {
            self.events.emit(ViewEvent::PlaybackChanged { playing: true });
        }
        started
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.scheduler.pause();
        if paused {
            self.events.emit(ViewEvent::PlaybackChanged { playing: false });
        }
        paused
    }

    pub fn toggle_play(&mut self) -> bool {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.is_playing()
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        if speed == self.scheduler.speed() {
            return;
        }
        self.scheduler.set_speed(speed);
        self.events.emit(ViewEvent::SpeedChanged {
            multiplier: speed.multiplier(),
        });
    }

    /// Feeds elapsed wall time to the animation timer.
    pub fn tick(&mut self, dt_ms: f64) -> Vec<Year> {
        let was_playing = self.scheduler.is_playing();
        let committed = self.scheduler.advance(dt_ms);
        for &year in &committed {
            self.events.emit(ViewEvent::YearChanged { year });
        }
        if !committed.is_empty() {
            self.request_overlay();
        }
        if was_playing && !self.scheduler.is_playing() {
            self.events.emit(ViewEvent::PlaybackChanged { playing: false });
        }
        committed
    }

    pub fn jump_to_year(&mut self, year: Year) -> Clamped<Year> {
        let before = self.year();
        let result = self.scheduler.jump_to_year(year);
        self.after_manual_year_change(before);
        result
    }

    pub fn step(&mut self, delta: Year) -> Clamped<Year> {
        let before = self.year();
        let result = self.scheduler.step(delta);
        self.after_manual_year_change(before);
        result
    }

    pub fn go_to_start(&mut self) -> Year {
        let before = self.year();
        self.scheduler.go_to_start();
        self.after_manual_year_change(before);
        self.year()
    }

    pub fn go_to_end(&mut self) -> Year {
        let before = self.year();
        self.scheduler.go_to_end();
        self.after_manual_year_change(before);
        self.year()
    }

    /// Typed year from the settings panel. The corrected year is applied.
    pub fn validate_and_set_year(&mut self, input: &str) -> Clamped<Year> {
        let before = self.year();
        let result = self.scheduler.validate_and_set_year(input);
        self.after_manual_year_change(before);
        result
    }

    fn after_manual_year_change(&mut self, before: Year) {
        let year = self.year();
        if year != before {
            self.events.emit(ViewEvent::YearChanged { year });
            self.request_overlay();
        }
    }

    /// Plays from the current year until playback stops at the last year or
    /// `until` is on screen. `on_frame` receives every displayed year's frame,
    /// the starting one included. Events are drained and logged as it goes.
    /// Returns the number of frames handed out.
    pub fn play_through<E>(
        &mut self,
        until: Option<Year>,
        mut on_frame: impl FnMut(Year, RgbaImage) -> Result<(), E>,
    ) -> Result<usize, E> {
        let reached = |year: Year| until.is_some_and(|to| year >= to);
        on_frame(self.year(), self.frame())?;
        let mut frames = 1;
        self.log_events();
        if reached(self.year()) {
            return Ok(frames);
        }

        self.play();
        let period = self.scheduler.period_ms();
        while self.is_playing() {
            if self.tick(period).is_empty() {
                break;
            }
            on_frame(self.year(), self.frame())?;
            frames += 1;
            if reached(self.year()) {
                self.pause();
            }
            self.log_events();
        }
        self.log_events();
        Ok(frames)
    }

    fn log_events(&mut self) {
        for event in self.events.drain() {
            debug!(?event, "view event");
        }
    }

    /// Stops playback for good.
    pub fn dispose(&mut self) {
        let was_playing = self.scheduler.is_playing();
        self.scheduler.dispose();
        if was_playing {
            self.events.emit(ViewEvent::PlaybackChanged { playing: false });
        }
    }

    // ---- selections -----------------------------------------------------

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.selections.set_mode(mode);
    }

    pub fn click(&mut self, p: PixelPoint) -> Option<SelectionChange> {
        let change = self.selections.click(p, self.pipeline.size());
        self.note_selection_change(change)
    }

    pub fn pointer_press(&mut self, p: PixelPoint) -> bool {
        self.selections.press(p)
    }

    pub fn pointer_move(&mut self, p: PixelPoint) {
        self.selections.move_to(p);
    }

    pub fn pointer_release(&mut self, p: PixelPoint) -> Option<SelectionChange> {
        let change = self.selections.release(p);
        self.note_selection_change(change)
    }

    pub fn add_latitude_from_input(
        &mut self,
        input: &str,
    ) -> Result<SelectionChange, SelectionInputError> {
        let change = self.selections.add_latitude_from_input(input)?;
        self.note_selection_change(Some(change));
        Ok(change)
    }

    pub fn remove_latitude(&mut self, id: usize) -> bool {
        let removed = self.selections.remove_latitude(id).is_some();
        if removed {
            self.note_selection_change(Some(SelectionChange::LatitudeRemoved { id }));
        }
        removed
    }

    pub fn remove_area(&mut self, id: usize) -> bool {
        let removed = self.selections.remove_area(id).is_some();
        if removed {
            self.note_selection_change(Some(SelectionChange::AreaRemoved { id }));
        }
        removed
    }

    fn note_selection_change(
        &mut self,
        change: Option<SelectionChange>,
    ) -> Option<SelectionChange> {
        if change.is_some() {
            self.events.emit(ViewEvent::SelectionsChanged {
                total: self.selections.total_selections(),
            });
        }
        change
    }

    // ---- queries --------------------------------------------------------

    /// Observed value of the grid cell under the pointer for the current year.
    pub fn value_under(&self, p: PixelPoint) -> Option<f64> {
        pick_value(&self.dataset, p, self.pipeline.size(), self.year())
    }

    /// Interpolated estimate anywhere on the globe for the current year.
    pub fn estimate_at(&self, at: GeoPoint) -> Estimate {
        GridInterpolator::new(&self.dataset).sample(self.year(), at)
    }

    /// Mean of the row nearest to latitude selection `id`, current year.
    pub fn latitude_mean(&self, id: usize) -> Option<f64> {
        let lat = self.selections.latitudes().get(id)?.lat;
        RegionalAnalysis::latitude_mean(&self.dataset, lat, self.year())
    }

    /// Mean over the cells enclosed by area selection `id`, current year.
    pub fn area_mean(&self, id: usize) -> Option<f64> {
        let area = self.selections.areas().get(id)?;
        let size = self.pipeline.size();
        RegionalAnalysis::area_mean(&self.dataset, area.rect(), size, self.year())
    }
}

//! Two-surface map rendering.
//!
//! The base surface holds the background map and is redrawn only when the
//! surface size or the map source changes. The overlay surface holds the
//! anomaly raster and is redrawn whenever (year, dataset revision, size)
//! changes. Overlay redraws are deferred: `request_overlay` clears the
//! overlay and queues the fill pass, `flush` runs only the newest queued pass.
//! Each surface is presented through its layer's style when composed.

use compute::AnomalyField;
use foundation::geo::SurfaceSize;
use foundation::time::Year;
use image::RgbaImage;
use layers::basemap::{BaseMapKey, BaseMapLayer};
use layers::raster::{AnomalyRasterConfig, AnomalyRasterLayer};
use layers::layer::Layer;
use layers::symbology::{AnomalyPalette, LayerStyle};
use runtime::redraw::{RedrawQueue, RedrawTicket};
use tracing::{debug, trace};

use crate::composite::present;
use crate::surface::Surface;

/// Everything the overlay content depends on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OverlayKey {
    pub year: Year,
    /// Bumped by the owner whenever the dataset is replaced.
    pub dataset_revision: u64,
    pub size: SurfaceSize,
}

/// Result of a completed overlay pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayCommit {
    pub ticket: RedrawTicket,
    pub key: OverlayKey,
    pub fills: usize,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    pub base_redraws: u64,
    pub overlay_redraws: u64,
    /// Overlay passes dropped because a newer request replaced them.
    pub overlay_superseded: u64,
}

pub struct RenderPipeline {
    size: SurfaceSize,
    base: Surface,
    overlay: Surface,
    base_layer: BaseMapLayer,
    base_image: Option<RgbaImage>,
    base_drawn: Option<BaseMapKey>,
    raster: AnomalyRasterLayer,
    requested: Option<OverlayKey>,
    committed: Option<OverlayCommit>,
    redraws: RedrawQueue<OverlayKey>,
    stats: PipelineStats,
}

impl RenderPipeline {
    pub fn new(
        raster: AnomalyRasterConfig,
        palette: AnomalyPalette,
        overlay_style: LayerStyle,
    ) -> Self {
        let mut raster = AnomalyRasterLayer::new(2, raster);
        raster.palette = palette;
        raster.style = overlay_style;
        Self {
            size: SurfaceSize::default(),
            base: Surface::new(SurfaceSize::default()),
            overlay: Surface::new(SurfaceSize::default()),
            base_layer: BaseMapLayer::new(1),
            base_image: None,
            base_drawn: None,
            raster,
            requested: None,
            committed: None,
            redraws: RedrawQueue::new(),
            stats: PipelineStats::default(),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn is_ready(&self) -> bool {
        self.size.is_ready()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            overlay_superseded: self.redraws.superseded(),
            ..self.stats
        }
    }

    pub fn base(&self) -> &Surface {
        &self.base
    }

    pub fn overlay(&self) -> &Surface {
        &self.overlay
    }

    pub fn raster_layer(&self) -> &AnomalyRasterLayer {
        &self.raster
    }

    pub fn last_commit(&self) -> Option<OverlayCommit> {
        self.committed
    }

    /// Adopts a new surface size. Both surfaces are reallocated; callers
    /// follow up with `sync_base` and `request_overlay`.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        debug!(width = size.width, height = size.height, "surface resized");
        self.size = size;
        self.base = Surface::new(size);
        self.overlay = Surface::new(size);
        self.base_drawn = None;
        self.requested = None;
        self.committed = None;
        self.redraws.cancel_all();
    }

    /// Replaces the background map. `source` identifies the image; the base
    /// surface is redrawn on the next `sync_base`.
    pub fn set_base_image(&mut self, source: impl Into<String>, image: RgbaImage) {
        self.base_layer.source = Some(source.into());
        self.base_image = Some(image);
    }

    /// Presentation of the base surface in the composed frame. The base
    /// content itself is untouched, so no redraw is needed.
    pub fn set_base_style(&mut self, style: LayerStyle) {
        self.base_layer.style = style;
    }

    /// Redraws the base surface if its size or source changed since the last
    /// draw. Returns whether a redraw happened.
    pub fn sync_base(&mut self) -> bool {
        if !self.size.is_ready() {
            trace!("base sync skipped, surface not ready");
            return false;
        }
        let key = self.base_layer.key(self.size);
        if self.base_drawn.as_ref() == Some(&key) {
            return false;
        }
        self.base.clear();
        if let Some(image) = &self.base_image {
            self.base.draw_image(image);
        }
        debug!(layer = self.base_layer.id().0, source = ?key.source, "base layer redrawn");
        self.base_drawn = Some(key);
        self.stats.base_redraws += 1;
        true
    }

    /// Clears the overlay and queues a fill pass if the overlay inputs
    /// changed. Returns the ticket of the queued pass.
    pub fn request_overlay(&mut self, year: Year, dataset_revision: u64) -> Option<RedrawTicket> {
        if !self.size.is_ready() {
            trace!(year, "overlay request ignored, surface not ready");
            return None;
        }
        let key = OverlayKey {
            year,
            dataset_revision,
            size: self.size,
        };
        if self.requested == Some(key) {
            return None;
        }
        self.overlay.clear();
        self.requested = Some(key);
        Some(self.redraws.schedule(key))
    }

    pub fn has_pending_overlay(&self) -> bool {
        self.redraws.has_pending()
    }

    /// Runs the newest queued overlay pass against `field`. Older passes are
    /// dropped without painting.
    pub fn flush<F: AnomalyField + ?Sized>(&mut self, field: &F) -> Option<OverlayCommit> {
        let (ticket, key) = self.redraws.take_latest()?;
        self.run_pass(ticket, key, field)
    }

    fn run_pass<F: AnomalyField + ?Sized>(
        &mut self,
        ticket: RedrawTicket,
        key: OverlayKey,
        field: &F,
    ) -> Option<OverlayCommit> {
        if !self.redraws.is_current(ticket) || key.size != self.size {
            debug!(generation = ticket.0, year = key.year, "stale overlay pass discarded");
            return None;
        }
        let snapshot = self.raster.extract(field, key.year, key.size);
        self.overlay.clear();
        for fill in &snapshot.fills {
            self.overlay.fill_rect(fill.rect, fill.color);
        }
        let commit = OverlayCommit {
            ticket,
            key,
            fills: snapshot.fills.len(),
        };
        debug!(
            layer = self.raster.id().0,
            generation = ticket.0,
            year = key.year,
            fills = commit.fills,
            hidden = snapshot.hidden,
            "overlay committed"
        );
        self.committed = Some(commit);
        self.stats.overlay_redraws += 1;
        Some(commit)
    }

    /// Final frame: the base presented on a transparent canvas, the overlay
    /// presented on top.
    pub fn compose(&self) -> RgbaImage {
        let canvas = RgbaImage::new(self.size.width, self.size.height);
        let framed = present(&canvas, self.base.image(), self.base_layer.style());
        present(&framed, self.overlay.image(), self.raster.style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute::GridInterpolator;
    use image::Rgba;
    use scene::grid::{GridCell, GridDataset, YearValue};

    const SIZE: SurfaceSize = SurfaceSize::new(360, 180);

    fn pipeline() -> RenderPipeline {
        RenderPipeline::new(
            AnomalyRasterConfig {
                resolution_factor: 1,
                seam_padding_px: 1.0,
            },
            AnomalyPalette::default(),
            LayerStyle::opaque(),
        )
    }

    /// Strong anomaly around (0, 0) in 2000, a cold one in 2001.
    fn dataset() -> GridDataset {
        let mut cells = Vec::new();
        for lat in [-4, 0, 4] {
            for lon in [-4, 0, 4] {
                cells.push(GridCell::new(
                    lat,
                    lon,
                    vec![YearValue::value(2000, 3.5), YearValue::value(2001, -3.5)],
                ));
            }
        }
        GridDataset::new(cells)
    }

    #[test]
    fn zero_size_renders_nothing() {
        let ds = dataset();
        let mut p = pipeline();
        assert!(!p.is_ready());
        assert!(!p.sync_base());
        assert_eq!(p.request_overlay(2000, 0), None);
        assert_eq!(p.flush(&GridInterpolator::new(&ds)), None);
        assert_eq!(p.compose().dimensions(), (0, 0));
    }

    #[test]
    fn base_redraws_only_on_size_or_source_change() {
        let mut p = pipeline();
        p.resize(SIZE);
        p.set_base_image("world.png", RgbaImage::from_pixel(4, 2, Rgba([0, 90, 0, 255])));
        assert!(p.sync_base());
        assert!(!p.sync_base());
        assert_eq!(p.base().pixel(100, 100), Some([0, 90, 0, 255]));

        // Year changes never touch the base.
        p.request_overlay(2000, 0);
        p.request_overlay(2001, 0);
        assert!(!p.sync_base());

        p.set_base_image("other.png", RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 255])));
        assert!(p.sync_base());
        p.resize(SurfaceSize::new(180, 90));
        assert!(p.sync_base());
        assert_eq!(p.stats().base_redraws, 3);
    }

    #[test]
    fn overlay_paints_near_data_only() {
        let ds = dataset();
        let mut p = pipeline();
        p.resize(SIZE);
        assert!(p.request_overlay(2000, 0).is_some());
        let commit = p.flush(&GridInterpolator::new(&ds)).unwrap();
        assert!(commit.fills > 0);
        // Pixel at lat 0, lon 0 is warm red.
        let [r, g, b, a] = p.overlay().pixel(180, 90).unwrap();
        assert!(r > g && r > b && a > 0, "{:?}", [r, g, b, a]);
        // Far from any data stays transparent.
        assert_eq!(p.overlay().pixel(10, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn unchanged_inputs_do_not_request_again() {
        let mut p = pipeline();
        p.resize(SIZE);
        assert!(p.request_overlay(2000, 0).is_some());
        assert_eq!(p.request_overlay(2000, 0), None);
        assert!(p.request_overlay(2000, 1).is_some());
    }

    #[test]
    fn rapid_year_changes_commit_only_the_latest() {
        let ds = dataset();
        let mut p = pipeline();
        p.resize(SIZE);
        for year in [1990, 1995, 2000, 2001] {
            p.request_overlay(year, 0);
        }
        let commit = p.flush(&GridInterpolator::new(&ds)).unwrap();
        assert_eq!(commit.key.year, 2001);
        assert_eq!(p.stats().overlay_superseded, 3);
        assert_eq!(p.stats().overlay_redraws, 1);
        assert!(!p.has_pending_overlay());

        // 2001 is cold: blue dominates at the anomaly centre.
        let [r, _, b, _] = p.overlay().pixel(180, 90).unwrap();
        assert!(b > r);
    }

    #[test]
    fn new_request_clears_stale_paint() {
        let ds = dataset();
        let mut p = pipeline();
        p.resize(SIZE);
        p.request_overlay(2000, 0);
        p.flush(&GridInterpolator::new(&ds));
        assert!(!p.overlay().is_blank());

        p.request_overlay(1950, 0);
        assert!(p.overlay().is_blank());
        assert!(p.flush(&GridInterpolator::new(&ds)).is_some());
        assert!(p.overlay().is_blank());
    }

    #[test]
    fn resize_cancels_pending_passes() {
        let ds = dataset();
        let mut p = pipeline();
        p.resize(SIZE);
        p.request_overlay(2000, 0);
        p.resize(SurfaceSize::new(720, 360));
        assert!(p.flush(&GridInterpolator::new(&ds)).is_none());
        assert!(p.request_overlay(2000, 0).is_some());
        let commit = p.flush(&GridInterpolator::new(&ds)).unwrap();
        assert_eq!(commit.key.size, SurfaceSize::new(720, 360));
    }

    #[test]
    fn compose_stacks_overlay_on_base() {
        let ds = dataset();
        let mut p = pipeline();
        p.resize(SIZE);
        p.set_base_image("white", RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])));
        p.sync_base();
        p.request_overlay(2000, 0);
        p.flush(&GridInterpolator::new(&ds));
        let frame = p.compose();
        assert_eq!(frame.get_pixel(10, 10).0, [255, 255, 255, 255]);
        let centre = frame.get_pixel(180, 90).0;
        assert_eq!(centre[3], 255);
        assert!(centre[1] < 255);
    }

    #[test]
    fn base_style_applies_at_compose_time() {
        let mut p = pipeline();
        p.resize(SIZE);
        p.set_base_image("white", RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])));
        p.sync_base();
        assert_eq!(p.compose().get_pixel(10, 10).0, [255, 255, 255, 255]);

        p.set_base_style(LayerStyle::new(true, 0.5, 0.0));
        assert!(!p.sync_base());
        let [r, _, _, a] = p.compose().get_pixel(10, 10).0;
        assert_eq!(r, 255);
        assert!((127..=128).contains(&a), "a {a}");

        p.set_base_style(LayerStyle::new(false, 1.0, 0.0));
        assert_eq!(p.compose().get_pixel(10, 10).0, [0, 0, 0, 0]);
        assert_eq!(p.base().pixel(10, 10), Some([255, 255, 255, 255]));
    }
}

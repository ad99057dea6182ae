use foundation::bounds::PixelRect;
use foundation::geo::{PixelPoint, SurfaceSize};
use foundation::math::{Snap, y_to_lat_with};
use tracing::debug;

/// Southernmost latitude a selection may carry.
pub const SELECTABLE_LAT_MIN: f64 = -88.0;
/// Northernmost latitude a selection may carry.
pub const SELECTABLE_LAT_MAX: f64 = 88.0;

/// How pointer input on the map is interpreted. Exactly one mode is active.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    None,
    Latitude,
    Area,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatitudeSelection {
    pub id: usize,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaSelection {
    pub id: usize,
    pub name: String,
    pub top_left: PixelPoint,
    pub bottom_right: PixelPoint,
}

impl AreaSelection {
    pub fn rect(&self) -> PixelRect {
        PixelRect {
            min: self.top_left,
            max: self.bottom_right,
        }
    }
}

/// Committed change to the selection collections, reported back to the host
/// so it can notify listeners.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    LatitudeAdded { id: usize },
    LatitudeRemoved { id: usize },
    AreaAdded { id: usize },
    AreaRemoved { id: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionInputError {
    NotANumber { input: String },
    OutOfRange { lat: f64 },
}

impl std::fmt::Display for SelectionInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionInputError::NotANumber { input } => {
                write!(f, "invalid latitude value: {input:?}")
            }
            SelectionInputError::OutOfRange { lat } => write!(
                f,
                "latitude must be between {SELECTABLE_LAT_MIN}° and {SELECTABLE_LAT_MAX}° (got {lat})"
            ),
        }
    }
}

impl std::error::Error for SelectionInputError {}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
enum Drag {
    #[default]
    Idle,
    Active {
        origin: PixelPoint,
        current: PixelPoint,
    },
}

trait DenseId {
    fn set_id(&mut self, id: usize);
}

impl DenseId for LatitudeSelection {
    fn set_id(&mut self, id: usize) {
        self.id = id;
    }
}

impl DenseId for AreaSelection {
    fn set_id(&mut self, id: usize) {
        self.id = id;
    }
}

fn remove_and_renumber<T: DenseId>(items: &mut Vec<T>, id: usize) -> Option<T> {
    if id >= items.len() {
        return None;
    }
    let removed = items.remove(id);
    for (index, item) in items.iter_mut().enumerate().skip(id) {
        item.set_id(index);
    }
    Some(removed)
}

/// Snaps a raw latitude to the dataset grid and clamps it to the selectable
/// band.
pub fn snap_selection_latitude(raw_lat: f64) -> f64 {
    foundation::math::snap_to_grid(raw_lat).clamp(SELECTABLE_LAT_MIN, SELECTABLE_LAT_MAX)
}

/// User-drawn latitude lines and rectangular areas, plus the pointer mode.
///
/// Ordering contract:
/// - Both collections are kept in insertion order.
/// - Every element's `id` equals its current index; removals renumber the
///   tail so ids stay dense (`0..len`).
///
/// An in-progress area drag is presentational only: it is not part of the
/// committed collections until `release`.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    mode: SelectionMode,
    latitudes: Vec<LatitudeSelection>,
    areas: Vec<AreaSelection>,
    drag: Drag,
    next_area_serial: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switches the pointer mode. Any in-progress drag is discarded.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode != mode {
            debug!(?mode, "selection mode changed");
        }
        self.mode = mode;
        self.drag = Drag::Idle;
    }

    /// Back to mode `None` with no drag. Committed selections are kept.
    pub fn reset(&mut self) {
        self.set_mode(SelectionMode::None);
    }

    pub fn latitudes(&self) -> &[LatitudeSelection] {
        &self.latitudes
    }

    pub fn areas(&self) -> &[AreaSelection] {
        &self.areas
    }

    pub fn total_selections(&self) -> usize {
        self.latitudes.len() + self.areas.len()
    }

    pub fn is_latitude_selected(&self, lat: f64) -> bool {
        self.latitudes.iter().any(|l| l.lat == lat)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.drag, Drag::Active { .. })
    }

    pub fn drag_origin(&self) -> Option<PixelPoint> {
        match self.drag {
            Drag::Active { origin, .. } => Some(origin),
            Drag::Idle => None,
        }
    }

    /// Live rectangle of the drag in progress, normalized.
    pub fn preview_rect(&self) -> Option<PixelRect> {
        match self.drag {
            Drag::Active { origin, current } => Some(PixelRect::from_corners(origin, current)),
            Drag::Idle => None,
        }
    }

    /// Primary click. In latitude mode this appends a grid-snapped latitude.
    pub fn click(&mut self, p: PixelPoint, size: SurfaceSize) -> Option<SelectionChange> {
        if self.mode != SelectionMode::Latitude || !size.is_ready() {
            return None;
        }
        let raw = y_to_lat_with(p.y, size.height_f64(), Snap::Raw);
        Some(self.push_latitude(snap_selection_latitude(raw)))
    }

    /// Pointer press. Starts a drag in area mode; returns whether it did.
    pub fn press(&mut self, p: PixelPoint) -> bool {
        if self.mode != SelectionMode::Area {
            return false;
        }
        self.drag = Drag::Active {
            origin: p,
            current: p,
        };
        true
    }

    /// Pointer move. Only updates the preview of an active drag.
    pub fn move_to(&mut self, p: PixelPoint) {
        if let Drag::Active { current, .. } = &mut self.drag {
            *current = p;
        }
    }

    /// Pointer release. Commits the dragged area with a generated name.
    pub fn release(&mut self, p: PixelPoint) -> Option<SelectionChange> {
        self.release_named(p, None)
    }

    pub fn release_named(
        &mut self,
        p: PixelPoint,
        name: Option<String>,
    ) -> Option<SelectionChange> {
        if self.mode != SelectionMode::Area {
            return None;
        }
        let Drag::Active { origin, .. } = std::mem::take(&mut self.drag) else {
            return None;
        };

        self.next_area_serial += 1;
        let name = name.unwrap_or_else(|| format!("Area {}", self.next_area_serial));
        let rect = PixelRect::from_corners(origin, p);
        let id = self.areas.len();
        self.areas.push(AreaSelection {
            id,
            name,
            top_left: rect.min,
            bottom_right: rect.max,
        });
        debug!(id, "area selection committed");
        Some(SelectionChange::AreaAdded { id })
    }

    /// Appends a latitude as given, without snapping.
    pub fn add_latitude(&mut self, lat: f64) -> SelectionChange {
        self.push_latitude(lat)
    }

    /// Manual latitude entry. Input must parse as a number inside the
    /// selectable band; the value is kept unsnapped. On error nothing changes.
    pub fn add_latitude_from_input(
        &mut self,
        input: &str,
    ) -> Result<SelectionChange, SelectionInputError> {
        let lat: f64 = input
            .trim()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| SelectionInputError::NotANumber {
                input: input.to_string(),
            })?;
        if !(SELECTABLE_LAT_MIN..=SELECTABLE_LAT_MAX).contains(&lat) {
            return Err(SelectionInputError::OutOfRange { lat });
        }
        Ok(self.push_latitude(lat))
    }

    pub fn remove_latitude(&mut self, id: usize) -> Option<LatitudeSelection> {
        let removed = remove_and_renumber(&mut self.latitudes, id)?;
        debug!(id, remaining = self.latitudes.len(), "latitude selection removed");
        Some(removed)
    }

    pub fn remove_area(&mut self, id: usize) -> Option<AreaSelection> {
        let removed = remove_and_renumber(&mut self.areas, id)?;
        debug!(id, remaining = self.areas.len(), "area selection removed");
        Some(removed)
    }

    fn push_latitude(&mut self, lat: f64) -> SelectionChange {
        let id = self.latitudes.len();
        self.latitudes.push(LatitudeSelection { id, lat });
        debug!(id, lat, "latitude selection committed");
        SelectionChange::LatitudeAdded { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIZE: SurfaceSize = SurfaceSize::new(360, 180);

    fn ids<T>(items: &[T], id: impl Fn(&T) -> usize) -> Vec<usize> {
        items.iter().map(id).collect()
    }

    #[test]
    fn latitude_click_snaps_and_clamps() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Latitude);

        // y=47 on a 180px surface is 43°N, snapped to 44.
        assert_eq!(
            s.click(PixelPoint::new(5.0, 47.0), SIZE),
            Some(SelectionChange::LatitudeAdded { id: 0 })
        );
        // y=0 is 90°N, snapped to 92 then clamped.
        s.click(PixelPoint::new(5.0, 0.0), SIZE);
        s.click(PixelPoint::new(5.0, 180.0), SIZE);

        let lats: Vec<f64> = s.latitudes().iter().map(|l| l.lat).collect();
        assert_eq!(lats, vec![44.0, 88.0, -88.0]);
        assert_eq!(ids(s.latitudes(), |l| l.id), vec![0, 1, 2]);
    }

    #[test]
    fn clicks_outside_latitude_mode_are_ignored() {
        let mut s = SelectionState::new();
        assert_eq!(s.click(PixelPoint::new(1.0, 1.0), SIZE), None);
        s.set_mode(SelectionMode::Area);
        assert_eq!(s.click(PixelPoint::new(1.0, 1.0), SIZE), None);
        s.set_mode(SelectionMode::Latitude);
        assert_eq!(s.click(PixelPoint::new(1.0, 1.0), SurfaceSize::new(0, 0)), None);
        assert!(s.latitudes().is_empty());
    }

    #[test]
    fn area_commit_normalizes_drag_direction() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Area);
        assert!(s.press(PixelPoint::new(50.0, 50.0)));
        s.move_to(PixelPoint::new(30.0, 60.0));
        let preview = s.preview_rect().unwrap();
        assert_eq!(preview.min, PixelPoint::new(30.0, 50.0));
        assert!(s.areas().is_empty());

        assert_eq!(
            s.release(PixelPoint::new(10.0, 80.0)),
            Some(SelectionChange::AreaAdded { id: 0 })
        );
        let area = &s.areas()[0];
        assert_eq!(area.top_left, PixelPoint::new(10.0, 50.0));
        assert_eq!(area.bottom_right, PixelPoint::new(50.0, 80.0));
        assert_eq!(area.name, "Area 1");
        assert!(!s.is_drawing());
        assert!(s.preview_rect().is_none());
    }

    #[test]
    fn release_without_press_commits_nothing() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Area);
        assert_eq!(s.release(PixelPoint::new(10.0, 10.0)), None);
        assert!(s.areas().is_empty());
    }

    #[test]
    fn mode_change_resets_drag() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Area);
        s.press(PixelPoint::new(1.0, 2.0));
        assert_eq!(s.drag_origin(), Some(PixelPoint::new(1.0, 2.0)));
        s.set_mode(SelectionMode::Latitude);
        assert!(!s.is_drawing());
        s.set_mode(SelectionMode::Area);
        assert_eq!(s.release(PixelPoint::new(5.0, 5.0)), None);
    }

    #[test]
    fn reset_drops_drag_but_keeps_selections() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Area);
        s.press(PixelPoint::new(0.0, 0.0));
        s.release(PixelPoint::new(8.0, 8.0));
        s.add_latitude(12.0);
        s.press(PixelPoint::new(20.0, 20.0));
        assert!(s.is_drawing());

        s.reset();
        assert_eq!(s.mode(), SelectionMode::None);
        assert!(!s.is_drawing());
        assert_eq!(s.drag_origin(), None);
        assert_eq!(s.total_selections(), 2);
        assert!(s.is_latitude_selected(12.0));

        // The dropped drag cannot be committed after re-entering area mode.
        s.set_mode(SelectionMode::Area);
        assert_eq!(s.release(PixelPoint::new(30.0, 30.0)), None);
        assert_eq!(s.areas().len(), 1);
    }

    #[test]
    fn custom_area_name_is_kept() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Area);
        s.press(PixelPoint::new(0.0, 0.0));
        s.release_named(PixelPoint::new(4.0, 4.0), Some("Sahel".to_string()));
        assert_eq!(s.areas()[0].name, "Sahel");
    }

    #[test]
    fn removal_renumbers_densely_for_every_position() {
        for n in 1..6 {
            for k in 0..n {
                let mut s = SelectionState::new();
                for i in 0..n {
                    s.add_latitude(i as f64);
                }
                let removed = s.remove_latitude(k).unwrap();
                assert_eq!(removed.lat, k as f64);
                assert_eq!(ids(s.latitudes(), |l| l.id), (0..n - 1).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn area_removal_renumbers_tail() {
        let mut s = SelectionState::new();
        s.set_mode(SelectionMode::Area);
        for i in 0..4 {
            let x = f64::from(i) * 10.0;
            s.press(PixelPoint::new(x, 0.0));
            s.release(PixelPoint::new(x + 5.0, 5.0));
        }
        let removed = s.remove_area(1).unwrap();
        assert_eq!(removed.name, "Area 2");
        assert_eq!(ids(s.areas(), |a| a.id), vec![0, 1, 2]);
        let names: Vec<&str> = s.areas().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Area 1", "Area 3", "Area 4"]);
        assert!(s.remove_area(3).is_none());
    }

    #[test]
    fn manual_latitude_entry_validates() {
        let mut s = SelectionState::new();
        assert_eq!(
            s.add_latitude_from_input("abc"),
            Err(SelectionInputError::NotANumber {
                input: "abc".to_string()
            })
        );
        assert_eq!(
            s.add_latitude_from_input("89.5"),
            Err(SelectionInputError::OutOfRange { lat: 89.5 })
        );
        assert!(s.latitudes().is_empty());

        assert_eq!(
            s.add_latitude_from_input(" 41.3 "),
            Ok(SelectionChange::LatitudeAdded { id: 0 })
        );
        assert!(s.is_latitude_selected(41.3));
        assert_eq!(s.total_selections(), 1);
    }

    #[test]
    fn input_error_messages_are_descriptive() {
        let err = SelectionInputError::OutOfRange { lat: -90.0 };
        assert!(err.to_string().contains("-88"));
        let err = SelectionInputError::NotANumber { input: "x".into() };
        assert!(err.to_string().contains("\"x\""));
    }
}

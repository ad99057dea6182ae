/// Year primitives for the anomaly time axis.
pub type Year = i32;

/// First year covered by the dataset.
pub const FIRST_YEAR: Year = 1880;
/// Last year covered by the dataset.
pub const LAST_YEAR: Year = 2025;
/// Number of yearly samples per grid cell.
pub const YEAR_COUNT: usize = (LAST_YEAR - FIRST_YEAR + 1) as usize;

/// A value that may have been pulled back into its valid domain.
///
/// `corrected` is `true` when `value` differs from what the caller asked for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Clamped<T> {
    pub value: T,
    pub corrected: bool,
}

impl<T> Clamped<T> {
    pub fn exact(value: T) -> Self {
        Self {
            value,
            corrected: false,
        }
    }

    pub fn corrected(value: T) -> Self {
        Self {
            value,
            corrected: true,
        }
    }
}

/// Inclusive span of years.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct YearRange {
    pub start: Year,
    pub end: Year,
}

impl YearRange {
    pub const FULL: YearRange = YearRange {
        start: FIRST_YEAR,
        end: LAST_YEAR,
    };

    pub fn single(year: Year) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn contains(&self, year: Year) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn clamp(&self, year: Year) -> Clamped<Year> {
        if year < self.start {
            Clamped::corrected(self.start)
        } else if year > self.end {
            Clamped::corrected(self.end)
        } else {
            Clamped::exact(year)
        }
    }
}

/// Clamps `year` into `[FIRST_YEAR, LAST_YEAR]`.
pub fn clamp_year(year: Year) -> Clamped<Year> {
    YearRange::FULL.clamp(year)
}

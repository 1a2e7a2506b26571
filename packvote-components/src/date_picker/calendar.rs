//! Month arithmetic and formatting behind the date picker.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

/// English month names, indexed by zero-based month.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The month currently shown in the grid.
///
/// Months are zero-based (`0` is January) to match the month selector's
/// option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarCursor {
    year: i32,
    month: u32,
}

impl CalendarCursor {
    /// Creates a cursor if `month` is in `0..=11`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (month < 12).then_some(Self { year, month })
    }

    /// The cursor for the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    /// Returns the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the zero-based month.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns a copy with the year replaced.
    pub fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }

    /// The date at `day` of this month, if it exists.
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, day)
    }

    /// Number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        let Some(first) = self.date(1) else {
            return 0;
        };
        let next = if self.month == 11 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 2, 1)
        };
        next.map_or(31, |next| {
            u32::try_from(next.signed_duration_since(first).num_days()).unwrap_or(31)
        })
    }

    /// Blank cells before day 1 in a Sunday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        self.date(1)
            .map_or(0, |first| first.weekday().num_days_from_sunday())
    }

    /// Moves the cursor forward to `min`'s month if it lies before it.
    pub fn clamp_to(self, min: NaiveDate) -> Self {
        let mut cursor = self;
        if cursor.year < min.year() {
            cursor.year = min.year();
        }
        if cursor.year == min.year() && cursor.month < min.month0() {
            cursor.month = min.month0();
        }
        cursor
    }
}

/// Name of a zero-based month. Out-of-range values give `"December"`.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month as usize)
        .copied()
        .unwrap_or(MONTH_NAMES[11])
}

/// Human-readable form, e.g. `June 5, 2025`.
pub fn format_display(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date.month0()), date.day(), date.year())
}

/// Form value, e.g. `2025-06-05`.
pub fn format_value(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parses a form value written by [`format_value`].
pub fn parse_value(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Years offered by the year selector.
pub fn year_options(min: NaiveDate, span: i32) -> RangeInclusive<i32> {
    min.year()..=min.year().saturating_add(span.max(0))
}

/// Whether `month` should be disabled while `year` is selected.
///
/// Only the minimum year restricts months; every other year offers all
/// twelve.
pub fn is_month_disabled(year: i32, month: u32, min: NaiveDate) -> bool {
    year == min.year() && month < min.month0()
}

/// One selectable or past day in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    /// The day.
    pub date: NaiveDate,
    /// Strictly before the minimum date; rendered disabled.
    pub is_past: bool,
    /// Equal to the minimum date.
    pub is_today: bool,
    /// Equal to the current selection.
    pub is_selected: bool,
}

/// The grid for one month: leading blanks, then one cell per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// Number of empty cells before day 1.
    pub leading_blanks: u32,
    /// Day cells in order, day 1 first.
    pub days: Vec<DayCell>,
}

/// Lays out `cursor`'s month relative to `today` and `selected`.
pub fn build_month_grid(
    cursor: CalendarCursor,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> MonthGrid {
    let days = (1..=cursor.days_in_month())
        .filter_map(|day| cursor.date(day))
        .map(|date| DayCell {
            date,
            is_past: date < today,
            is_today: date == today,
            is_selected: selected == Some(date),
        })
        .collect();
    MonthGrid {
        leading_blanks: cursor.leading_blanks(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn cursor_rejects_out_of_range_months() {
        assert!(CalendarCursor::new(2025, 11).is_some());
        assert!(CalendarCursor::new(2025, 12).is_none());
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        let feb_leap = CalendarCursor::new(2024, 1).expect("valid cursor");
        let feb_common = CalendarCursor::new(2025, 1).expect("valid cursor");
        let december = CalendarCursor::new(2025, 11).expect("valid cursor");
        assert_eq!(feb_leap.days_in_month(), 29);
        assert_eq!(feb_common.days_in_month(), 28);
        assert_eq!(december.days_in_month(), 31);
    }

    #[test]
    fn leading_blanks_are_sunday_first() {
        // 1 June 2025 is a Sunday, 1 July 2025 a Tuesday.
        let june = CalendarCursor::of(date(2025, 6, 15));
        let july = CalendarCursor::of(date(2025, 7, 15));
        assert_eq!(june.leading_blanks(), 0);
        assert_eq!(july.leading_blanks(), 2);
    }

    #[test]
    fn formats_match_form_and_label_conventions() {
        let day = date(2025, 6, 5);
        assert_eq!(format_display(day), "June 5, 2025");
        assert_eq!(format_value(day), "2025-06-05");
        assert_eq!(parse_value("2025-06-05"), Some(day));
        assert_eq!(parse_value(" 2025-06-05 "), Some(day));
        assert_eq!(parse_value("06/05/2025"), None);
    }

    #[test]
    fn clamp_moves_only_earlier_cursors() {
        let min = date(2025, 6, 15);
        let early = CalendarCursor::new(2024, 9).expect("valid cursor");
        let same_year = CalendarCursor::new(2025, 2).expect("valid cursor");
        let later = CalendarCursor::new(2026, 0).expect("valid cursor");
        assert_eq!(early.clamp_to(min), CalendarCursor::of(min));
        assert_eq!(same_year.clamp_to(min), CalendarCursor::of(min));
        assert_eq!(later.clamp_to(min), later);
    }

    #[test]
    fn month_options_restrict_only_the_minimum_year() {
        let min = date(2025, 6, 15);
        assert!(is_month_disabled(2025, 4, min));
        assert!(!is_month_disabled(2025, 5, min));
        assert!(!is_month_disabled(2026, 0, min));
        assert_eq!(year_options(min, 20), 2025..=2045);
    }

    #[test]
    fn grid_marks_past_today_and_selected() {
        let today = date(2025, 6, 15);
        let grid = build_month_grid(CalendarCursor::of(today), today, Some(date(2025, 6, 20)));
        assert_eq!(grid.leading_blanks, 0);
        assert_eq!(grid.days.len(), 30);
        assert_eq!(grid.days.iter().filter(|cell| cell.is_past).count(), 14);
        assert!(grid.days[14].is_today && !grid.days[14].is_past);
        assert!(grid.days[19].is_selected);
    }
}

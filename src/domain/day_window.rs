use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("import window end {end} must be after start {start}")]
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Half-open `[start, end)` range of instants to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ImportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if end <= start {
            return Err(WindowError::EmptyWindow { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn days(&self) -> DayWindows {
        DayWindows {
            cursor: self.start,
            end: self.end,
        }
    }
}

/// One remote query unit: a single day, clamped so it never reaches past
/// the end of the import window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

#[derive(Debug, Clone)]
pub struct DayWindows {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Iterator for DayWindows {
    type Item = DayWindow;

    fn next(&mut self) -> Option<Self::Item> {
        // Strict inequality: an end that is not a whole number of days away
        // from the start still terminates.
        if self.cursor >= self.end {
            return None;
        }

        let start = self.cursor;
        let end = start
            .checked_add_signed(Duration::days(1))
            .map_or(self.end, |next| next.min(self.end));
        self.cursor = end;

        Some(DayWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{ImportWindow, WindowError};

    fn utc(year: i32, month: u32, day: u32, hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn visits_each_whole_day_once() {
        let window = ImportWindow::new(utc(2020, 1, 1, 0), utc(2020, 1, 3, 0)).expect("window");

        let days: Vec<NaiveDate> = window.days().map(|day| day.day()).collect();

        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
                NaiveDate::from_ymd_opt(2020, 1, 2).expect("date"),
            ]
        );
    }

    #[test]
    fn day_windows_are_contiguous_and_one_day_long() {
        let window = ImportWindow::new(utc(2020, 1, 1, 0), utc(2020, 1, 10, 0)).expect("window");

        let days: Vec<_> = window.days().collect();

        assert_eq!(days.len(), 9);
        for pair in days.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(
            days.iter()
                .all(|day| day.end - day.start == chrono::Duration::days(1))
        );
    }

    #[test]
    fn terminates_when_end_is_not_a_whole_number_of_days_away() {
        let window = ImportWindow::new(utc(2020, 1, 1, 6), utc(2020, 1, 3, 0)).expect("window");

        let days: Vec<_> = window.days().take(10).collect();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].start, utc(2020, 1, 1, 6));
        assert_eq!(days[1].start, utc(2020, 1, 2, 6));
        assert_eq!(days[1].end, utc(2020, 1, 3, 0));
    }

    #[test]
    fn stops_at_the_last_representable_instant() {
        let end = chrono::DateTime::<Utc>::MAX_UTC;
        let start = end - chrono::Duration::hours(12);
        let window = ImportWindow::new(start, end).expect("window");

        let days: Vec<_> = window.days().take(3).collect();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].start, start);
        assert_eq!(days[0].end, end);
    }

    #[test]
    fn rejects_empty_or_inverted_windows() {
        let start = utc(2020, 1, 2, 0);

        assert_eq!(
            ImportWindow::new(start, start),
            Err(WindowError::EmptyWindow { start, end: start })
        );
        assert!(ImportWindow::new(start, utc(2020, 1, 1, 0)).is_err());
    }
}

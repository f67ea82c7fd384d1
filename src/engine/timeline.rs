use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{VerticalInterval, ZoomLevel};

/// Floor for the zoom density; keeps the date↔pixel mapping invertible and
/// the day iteration in tick generation finite.
const MIN_PIXELS_PER_DAY: f32 = 0.1;

/// Pixels generated beyond each edge of the visible window so ticks and
/// bands are already in place when a scroll lands.
const TICK_BUFFER_PX: f32 = 200.0;

/// Narrowest bar the chart will report, matching the table's click target.
const MIN_BAR_WIDTH: f32 = 6.0;

/// Linear date↔pixel mapping anchored at the project start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimelineScale {
    project_start: NaiveDate,
    pixels_per_day: f32,
}

/// Label tier of a tick mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickTier {
    /// Year boundary (Jan 1).
    Year,
    /// Month or quarter boundary, depending on zoom.
    Period,
    /// Day number or week-start marker.
    Day,
}

/// A labeled band in the timeline header. `width` spans the full period so
/// the renderer can size year/month bands without recomputing the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    pub x: f32,
    pub width: f32,
    pub label: Option<String>,
    pub tier: TickTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub x: f32,
}

/// Background band for a Saturday or Sunday at day zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekendBand {
    pub x: f32,
    pub width: f32,
}

/// Everything the header and grid need for the visible pixel window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineTicks {
    pub marks: Vec<TickMark>,
    pub gridlines: Vec<GridLine>,
    pub weekend_bands: Vec<WeekendBand>,
}

/// Horizontal geometry for one row's bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub left: f32,
    pub width: f32,
    pub is_milestone: bool,
    pub is_critical: bool,
}

impl TimelineScale {
    pub fn new(project_start: NaiveDate, zoom: ZoomLevel) -> Self {
        Self {
            project_start,
            pixels_per_day: zoom.default_pixels_per_day(),
        }
    }

    /// Manual drag-zoom override; the density is clamped to a positive
    /// minimum so the scale can never degenerate or invert.
    pub fn with_density(project_start: NaiveDate, pixels_per_day: f32) -> Self {
        Self {
            project_start,
            pixels_per_day: pixels_per_day.max(MIN_PIXELS_PER_DAY),
        }
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.pixels_per_day
    }

    /// Convert a date to an x-pixel offset from the project start.
    pub fn position(&self, date: NaiveDate) -> f32 {
        let days = (date - self.project_start).num_days() as f32;
        days * self.pixels_per_day
    }

    /// Convert an x-pixel offset back to the nearest date.
    pub fn date_at(&self, x: f32) -> NaiveDate {
        let days = (x / self.pixels_per_day).round() as i64;
        self.project_start + Duration::days(days)
    }

    /// Bar geometry for one row. Zero-duration work keeps a minimum visible
    /// width and is flagged as a milestone for diamond rendering.
    pub fn bar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        is_milestone: bool,
        is_critical: bool,
    ) -> BarGeometry {
        let left = self.position(start);
        let width = (self.position(end) - left).max(MIN_BAR_WIDTH);
        BarGeometry {
            left,
            width,
            is_milestone,
            is_critical,
        }
    }

    /// Generate header marks, gridlines and weekend bands for the visible
    /// pixel window only. Iteration covers `[scroll_left − buffer,
    /// scroll_left + viewport_width + buffer]` in days, so cost follows the
    /// viewport rather than the project span.
    pub fn ticks(
        &self,
        zoom: ZoomLevel,
        interval: VerticalInterval,
        scroll_left: f32,
        viewport_width: f32,
    ) -> TimelineTicks {
        let lo_px = scroll_left - TICK_BUFFER_PX;
        let hi_px = scroll_left + viewport_width.max(0.0) + TICK_BUFFER_PX;
        let first_day = (lo_px / self.pixels_per_day).floor() as i64;
        let last_day = (hi_px / self.pixels_per_day).ceil() as i64;

        let mut out = TimelineTicks::default();

        for offset in first_day..=last_day {
            let date = self.project_start + Duration::days(offset);
            let x = offset as f32 * self.pixels_per_day;

            // Tier 1: year band on Jan 1, sized over the actual year length.
            if date.month() == 1 && date.day() == 1 {
                out.marks.push(TickMark {
                    x,
                    width: days_in_year(date.year()) as f32 * self.pixels_per_day,
                    label: Some(date.format("%Y").to_string()),
                    tier: TickTier::Year,
                });
            }

            // Tier 2: month bands down to month zoom, quarter bands below.
            if date.day() == 1 {
                match zoom {
                    ZoomLevel::Day | ZoomLevel::Week | ZoomLevel::Month => {
                        out.marks.push(TickMark {
                            x,
                            width: days_in_month(date.year(), date.month()) as f32
                                * self.pixels_per_day,
                            label: Some(date.format("%b %Y").to_string()),
                            tier: TickTier::Period,
                        });
                    }
                    ZoomLevel::Quarter | ZoomLevel::Year => {
                        if matches!(date.month(), 1 | 4 | 7 | 10) {
                            let quarter = (date.month() - 1) / 3 + 1;
                            out.marks.push(TickMark {
                                x,
                                width: days_in_quarter(date.year(), quarter) as f32
                                    * self.pixels_per_day,
                                label: Some(format!("Q{} {}", quarter, date.year())),
                                tier: TickTier::Period,
                            });
                        }
                    }
                }
            }

            // Tier 3: day numbers at day zoom, week-start markers at week zoom.
            match zoom {
                ZoomLevel::Day => {
                    out.marks.push(TickMark {
                        x,
                        width: self.pixels_per_day,
                        label: Some(date.format("%d").to_string()),
                        tier: TickTier::Day,
                    });
                    if date.weekday().num_days_from_monday() >= 5 {
                        out.weekend_bands.push(WeekendBand {
                            x,
                            width: self.pixels_per_day,
                        });
                    }
                }
                ZoomLevel::Week => {
                    if date.weekday().num_days_from_monday() == 0 {
                        out.marks.push(TickMark {
                            x,
                            width: 7.0 * self.pixels_per_day,
                            label: Some(date.format("W%V").to_string()),
                            tier: TickTier::Day,
                        });
                    }
                }
                _ => {}
            }

            if gridline_at(date, zoom, interval) {
                out.gridlines.push(GridLine { x });
            }
        }

        out
    }
}

/// Whether a vertical gridline falls on this date. The user's interval
/// override wins over the zoom level's default spacing.
fn gridline_at(date: NaiveDate, zoom: ZoomLevel, interval: VerticalInterval) -> bool {
    match interval {
        VerticalInterval::Month => date.day() == 1,
        VerticalInterval::Quarter => date.day() == 1 && matches!(date.month(), 1 | 4 | 7 | 10),
        VerticalInterval::Year => date.day() == 1 && date.month() == 1,
        VerticalInterval::Auto => match zoom {
            ZoomLevel::Day => true,
            ZoomLevel::Week => date.weekday().num_days_from_monday() == 0,
            ZoomLevel::Month => date.day() == 1,
            ZoomLevel::Quarter => date.day() == 1 && matches!(date.month(), 1 | 4 | 7 | 10),
            ZoomLevel::Year => date.day() == 1 && date.month() == 1,
        },
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn days_in_month(year: i32, month: u32) -> i64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn days_in_quarter(year: i32, quarter: u32) -> i64 {
    let first_month = (quarter - 1) * 3 + 1;
    (0..3).map(|i| days_in_month(year, first_month + i)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn position_is_linear_in_days() {
        let scale = TimelineScale::new(d(2025, 1, 1), ZoomLevel::Day);
        assert_eq!(scale.position(d(2025, 1, 1)), 0.0);
        assert_eq!(scale.position(d(2025, 1, 11)), 400.0);
        assert_eq!(scale.date_at(400.0), d(2025, 1, 11));
    }

    #[test]
    fn round_trip_across_densities() {
        let start = d(2024, 6, 1);
        for ppd in [0.5f32, 2.0, 5.0, 15.0, 40.0] {
            let scale = TimelineScale::with_density(start, ppd);
            for days in [0i64, 1, 90, 365, 4000] {
                let date = start + Duration::days(days);
                let recovered = scale.position(date) / scale.pixels_per_day();
                assert!(
                    (recovered - days as f32).abs() < 0.01,
                    "ppd {} days {} recovered {}",
                    ppd,
                    days,
                    recovered
                );
            }
        }
    }

    #[test]
    fn density_is_clamped_positive() {
        let scale = TimelineScale::with_density(d(2025, 1, 1), 0.0);
        assert!(scale.pixels_per_day() > 0.0);
        let scale = TimelineScale::with_density(d(2025, 1, 1), -4.0);
        assert!(scale.pixels_per_day() > 0.0);
    }

    #[test]
    fn leap_year_band_widths() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));

        let scale = TimelineScale::with_density(d(2023, 1, 1), 2.0);
        let ticks = scale.ticks(ZoomLevel::Quarter, VerticalInterval::Auto, 0.0, 1200.0);
        let year_2023 = ticks
            .marks
            .iter()
            .find(|m| m.tier == TickTier::Year && m.label.as_deref() == Some("2023"))
            .unwrap();
        let year_2024 = ticks
            .marks
            .iter()
            .find(|m| m.tier == TickTier::Year && m.label.as_deref() == Some("2024"))
            .unwrap();
        assert_eq!(year_2023.width, 365.0 * 2.0);
        assert_eq!(year_2024.width, 366.0 * 2.0);
    }

    #[test]
    fn ticks_stay_within_the_buffered_window() {
        let scale = TimelineScale::new(d(2025, 1, 1), ZoomLevel::Day);
        let scroll = 4000.0;
        let width = 800.0;
        let ticks = scale.ticks(ZoomLevel::Day, VerticalInterval::Auto, scroll, width);
        assert!(!ticks.marks.is_empty());
        for mark in &ticks.marks {
            assert!(mark.x >= scroll - 200.0 - scale.pixels_per_day());
            assert!(mark.x <= scroll + width + 200.0 + scale.pixels_per_day());
        }
    }

    #[test]
    fn day_zoom_emits_weekend_bands() {
        // 2025-01-06 is a Monday; a one-week window holds one weekend.
        let scale = TimelineScale::new(d(2025, 1, 6), ZoomLevel::Day);
        let ticks = scale.ticks(ZoomLevel::Day, VerticalInterval::Auto, 0.0, 280.0);
        let in_week: Vec<_> = ticks
            .weekend_bands
            .iter()
            .filter(|b| b.x >= 0.0 && b.x < 280.0)
            .collect();
        assert_eq!(in_week.len(), 2);
    }

    #[test]
    fn week_zoom_marks_mondays_not_weekends() {
        let scale = TimelineScale::new(d(2025, 1, 6), ZoomLevel::Week);
        let ticks = scale.ticks(ZoomLevel::Week, VerticalInterval::Auto, 0.0, 600.0);
        assert!(ticks.weekend_bands.is_empty());
        let day_marks: Vec<_> = ticks.marks.iter().filter(|m| m.tier == TickTier::Day).collect();
        assert!(!day_marks.is_empty());
        for mark in &day_marks {
            assert_eq!(scale.date_at(mark.x).weekday().num_days_from_monday(), 0);
        }
    }

    #[test]
    fn quarter_zoom_labels_quarters() {
        let scale = TimelineScale::new(d(2025, 1, 1), ZoomLevel::Quarter);
        let ticks = scale.ticks(ZoomLevel::Quarter, VerticalInterval::Auto, 0.0, 800.0);
        let q1 = ticks
            .marks
            .iter()
            .find(|m| m.label.as_deref() == Some("Q1 2025"))
            .unwrap();
        assert_eq!(q1.tier, TickTier::Period);
        assert_eq!(q1.width, (31 + 28 + 31) as f32 * 2.0);
    }

    #[test]
    fn interval_override_beats_zoom_default() {
        let scale = TimelineScale::new(d(2025, 1, 1), ZoomLevel::Day);
        // Forcing month gridlines at day zoom thins them to the 1sts.
        let ticks = scale.ticks(ZoomLevel::Day, VerticalInterval::Month, 0.0, 40.0 * 60.0);
        for line in &ticks.gridlines {
            assert_eq!(scale.date_at(line.x).day(), 1);
        }
        assert!(!ticks.gridlines.is_empty());
    }

    #[test]
    fn bar_geometry_minimum_width_and_flags() {
        let scale = TimelineScale::new(d(2025, 1, 1), ZoomLevel::Day);
        let bar = scale.bar(d(2025, 1, 6), d(2025, 1, 6), true, true);
        assert_eq!(bar.width, 6.0);
        assert!(bar.is_milestone);
        assert!(bar.is_critical);

        let bar = scale.bar(d(2025, 1, 6), d(2025, 1, 16), false, false);
        assert_eq!(bar.left, 200.0);
        assert_eq!(bar.width, 400.0);
    }

    proptest! {
        #[test]
        fn tick_count_is_bounded_by_viewport(
            scroll in -100_000.0f32..100_000.0,
            width in 0.0f32..2_000.0,
        ) {
            let scale = TimelineScale::new(d(2025, 1, 1), ZoomLevel::Day);
            let ticks = scale.ticks(ZoomLevel::Day, VerticalInterval::Auto, scroll, width);
            let days_in_window = ((width + 2.0 * 200.0) / scale.pixels_per_day()).ceil() as usize;
            // Day zoom emits at most three marks per day (year, month, day).
            prop_assert!(ticks.marks.len() <= 3 * (days_in_window + 2));
        }
    }
}

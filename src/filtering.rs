use crate::query::error::QueryError;
use chrono::{DateTime, TimeDelta, Utc};
use polars::prelude::{col, lit, LazyFrame};

/// Lower band edge per hour of offset, in seconds.
pub const BAND_LOWER_PER_HOUR: i64 = 3590;
/// Upper band edge per hour of offset, in seconds.
pub const BAND_UPPER_PER_HOUR: i64 = 3610;

/// Allowed positions of the hour-offset slider, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourOffsetRange {
    pub min: u32,
    pub max: u32,
}

impl Default for HourOffsetRange {
    fn default() -> Self {
        Self { min: 1, max: 6 }
    }
}

impl HourOffsetRange {
    pub fn offset(&self, hours: u32) -> Result<HourOffset, QueryError> {
        if hours < self.min || hours > self.max {
            return Err(QueryError::HourOffsetOutOfRange {
                offset: hours,
                min: self.min,
                max: self.max,
            });
        }
        Ok(HourOffset(hours))
    }

    pub fn first(&self) -> HourOffset {
        HourOffset(self.min)
    }
}

/// Hours after the reference time the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HourOffset(u32);

impl HourOffset {
    pub fn hours(&self) -> u32 {
        self.0
    }

    pub fn band(&self) -> StepBand {
        StepBand::for_offset(*self)
    }

    /// The valid time shown next to the slider.
    pub fn valid_time(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        reference + TimeDelta::hours(i64::from(self.0))
    }
}

/// Open interval of forecast steps, in seconds, that count as "this hour".
///
/// Steps reported by the backend are not always exactly on the hour, so the
/// band allows ±10 s per hour of offset around `3600 * h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBand {
    pub lower: i64,
    pub upper: i64,
}

impl StepBand {
    /// `(3590 * h, 3610 * h)`.
    ///
    /// ```
    /// use flux_demos::{HourOffsetRange, StepBand};
    ///
    /// let band = StepBand::for_offset(HourOffsetRange::default().offset(3)?);
    /// assert_eq!((band.lower, band.upper), (10770, 10830));
    /// # Ok::<(), flux_demos::QueryError>(())
    /// ```
    pub fn for_offset(offset: HourOffset) -> Self {
        let h = i64::from(offset.hours());
        Self {
            lower: BAND_LOWER_PER_HOUR * h,
            upper: BAND_UPPER_PER_HOUR * h,
        }
    }

    /// Both edges exclusive.
    pub fn contains(&self, step_seconds: f64) -> bool {
        step_seconds > self.lower as f64 && step_seconds < self.upper as f64
    }
}

pub trait StepFrameFilterExt {
    /// Keeps rows whose `step` column (seconds) lies strictly inside `band`.
    ///
    /// This is the frame equivalent of the layer filter the area view sets on
    /// the map: `step > lower && step < upper`.
    fn filter_step_band(self, band: StepBand) -> LazyFrame;
}

impl StepFrameFilterExt for LazyFrame {
    fn filter_step_band(self, band: StepBand) -> LazyFrame {
        self.filter(
            col("step")
                .gt(lit(band.lower as f64))
                .and(col("step").lt(lit(band.upper as f64))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use polars::prelude::*;

    #[test]
    fn first_hour_band() -> Result<(), QueryError> {
        let band = HourOffsetRange::default().offset(1)?.band();
        assert_eq!(band, StepBand { lower: 3590, upper: 3610 });
        assert!(band.contains(3600.0));
        assert!(!band.contains(3500.0));
        assert!(!band.contains(3590.0));
        assert!(!band.contains(3610.0));
        Ok(())
    }

    #[test]
    fn slider_move_to_three_hours() -> Result<(), QueryError> {
        let band = HourOffsetRange::default().offset(3)?.band();
        assert_eq!((band.lower, band.upper), (10770, 10830));
        assert!(band.contains(10800.0));
        Ok(())
    }

    #[test]
    fn offsets_outside_slider_are_rejected() {
        let range = HourOffsetRange::default();
        assert!(range.offset(0).is_err());
        assert!(range.offset(7).is_err());
        assert_eq!(range.first().hours(), 1);
    }

    #[test]
    fn valid_time_adds_offset() -> Result<(), QueryError> {
        let reference = Utc.with_ymd_and_hms(2024, 11, 18, 0, 0, 0).unwrap();
        let valid = HourOffsetRange::default().offset(4)?.valid_time(reference);
        assert_eq!(valid, Utc.with_ymd_and_hms(2024, 11, 18, 4, 0, 0).unwrap());
        Ok(())
    }

    #[test]
    fn frame_filter_keeps_rows_inside_band() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "step" => [3600.0f64, 3500.0, 7200.0, 3605.0],
            "prate" => [0.1f64, 0.2, 0.3, 0.4],
        )?;
        let band = HourOffsetRange::default().offset(1)?.band();
        let filtered = df.lazy().filter_step_band(band).collect()?;

        assert_eq!(filtered.height(), 2);
        let steps: Vec<Option<f64>> = filtered.column("step")?.f64()?.into_iter().collect();
        assert_eq!(steps, vec![Some(3600.0), Some(3605.0)]);
        Ok(())
    }

    #[test]
    fn frame_filter_with_no_match_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!("step" => [0.0f64, 3600.0])?;
        let band = HourOffsetRange::default().offset(6)?.band();
        let filtered = df.lazy().filter_step_band(band).collect()?;
        assert_eq!(filtered.height(), 0);
        Ok(())
    }
}

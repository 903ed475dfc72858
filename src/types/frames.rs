//! Polars wrappers for query results, for callers that want to aggregate or
//! export what the views display.
//!
//! Both frames hold values that are already in display units.

use crate::filtering::{HourOffset, StepBand, StepFrameFilterExt};
use chrono::{DateTime, Utc};
use polars::prelude::{col, lit, Expr, LazyFrame};

/// A timeseries as a `LazyFrame` with columns `time` (Datetime, ms, UTC) and `value`.
#[derive(Clone)]
pub struct TimeseriesLazyFrame {
    pub frame: LazyFrame,
}

impl TimeseriesLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Applies an arbitrary predicate, returning a new frame.
    pub fn filter(&self, predicate: Expr) -> TimeseriesLazyFrame {
        TimeseriesLazyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Rows with `start <= time <= end`.
    pub fn get_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeseriesLazyFrame {
        self.filter(
            col("time")
                .gt_eq(lit(start.naive_utc()))
                .and(col("time").lt_eq(lit(end.naive_utc()))),
        )
    }
}

/// An area result as a `LazyFrame`: `lon`, `lat`, `step` (seconds), then one
/// column per requested variable, named by its code.
#[derive(Clone)]
pub struct AreaLazyFrame {
    pub frame: LazyFrame,
}

impl AreaLazyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    pub fn filter(&self, predicate: Expr) -> AreaLazyFrame {
        AreaLazyFrame::new(self.frame.clone().filter(predicate))
    }

    pub fn in_band(&self, band: StepBand) -> AreaLazyFrame {
        AreaLazyFrame::new(self.frame.clone().filter_step_band(band))
    }

    /// Rows belonging to the slider position `offset`.
    pub fn at_offset(&self, offset: HourOffset) -> AreaLazyFrame {
        self.in_band(offset.band())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::geo::LngLat;
    use crate::types::timeseries::{Timeseries, TimeseriesSample};
    use crate::types::variable::Variable;
    use crate::units::DisplayValue;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn get_range_is_inclusive() -> Result<(), Box<dyn std::error::Error>> {
        let reference = Utc.with_ymd_and_hms(2024, 11, 4, 0, 0, 0).unwrap();
        let samples = (0..6)
            .map(|h| TimeseriesSample {
                time: reference + TimeDelta::hours(h),
                value: DisplayValue::Value(h as f64),
            })
            .collect();
        let ts = Timeseries::new(
            Variable::WindGust,
            LngLat::new(0.0, 0.0)?,
            reference,
            samples,
        );

        let df = ts
            .to_frame()?
            .get_range(reference + TimeDelta::hours(1), reference + TimeDelta::hours(3))
            .frame
            .collect()?;
        let values: Vec<Option<f64>> = df.column("value")?.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
        Ok(())
    }
}

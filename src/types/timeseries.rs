//! Point query results: one converted reading per forecast step.

use crate::types::frames::TimeseriesLazyFrame;
use crate::types::geo::LngLat;
use crate::types::variable::Variable;
use crate::units::DisplayValue;
use chrono::{DateTime, Utc};
use polars::prelude::{col, df, DataType, IntoLazy, PolarsError, TimeUnit};

/// One reading at one instant, already in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeseriesSample {
    pub time: DateTime<Utc>,
    pub value: DisplayValue,
}

/// A point on the area chart, with the axis and tooltip labels the chart shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub value: Option<f64>,
    /// Axis tick, e.g. `11/4`.
    pub tick_label: String,
    /// Tooltip heading, e.g. `Nov 4, 1 AM`.
    pub tooltip_label: String,
}

/// Time-ordered readings for one variable at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeseries {
    variable: Variable,
    location: LngLat,
    reference_time: DateTime<Utc>,
    samples: Vec<TimeseriesSample>,
}

impl Timeseries {
    /// Samples are sorted by time; ties keep their input order.
    pub fn new(
        variable: Variable,
        location: LngLat,
        reference_time: DateTime<Utc>,
        mut samples: Vec<TimeseriesSample>,
    ) -> Self {
        samples.sort_by_key(|s| s.time);
        Self {
            variable,
            location,
            reference_time,
            samples,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn location(&self) -> LngLat {
        self.location
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    pub fn samples(&self) -> &[TimeseriesSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Chart dataset. Missing readings stay as gaps (`None`).
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.samples
            .iter()
            .map(|sample| ChartPoint {
                time: sample.time,
                value: sample.value.value(),
                tick_label: sample.time.format("%-m/%-d").to_string(),
                tooltip_label: sample.time.format("%b %-d, %-I %p").to_string(),
            })
            .collect()
    }

    /// The readings as a lazy frame with `time` (UTC, ms) and `value` columns.
    pub fn to_frame(&self) -> Result<TimeseriesLazyFrame, PolarsError> {
        let times: Vec<i64> = self
            .samples
            .iter()
            .map(|s| s.time.timestamp_millis())
            .collect();
        let values: Vec<Option<f64>> = self.samples.iter().map(|s| s.value.value()).collect();
        let df = df!("time" => times, "value" => values)?;
        Ok(TimeseriesLazyFrame::new(df.lazy().with_column(
            col("time").cast(DataType::Datetime(TimeUnit::Milliseconds, None)),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series() -> Timeseries {
        let t0 = Utc.with_ymd_and_hms(2024, 11, 4, 1, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 11, 4, 0, 0, 0).unwrap();
        Timeseries::new(
            Variable::Temperature2m,
            LngLat::new(-74.5, 40.0).unwrap(),
            t1,
            vec![
                TimeseriesSample {
                    time: t0,
                    value: DisplayValue::NotAvailable,
                },
                TimeseriesSample {
                    time: t1,
                    value: DisplayValue::Value(26.85),
                },
            ],
        )
    }

    #[test]
    fn samples_are_time_ordered() {
        let ts = series();
        assert!(ts.samples()[0].time < ts.samples()[1].time);
        assert_eq!(ts.samples()[0].value, DisplayValue::Value(26.85));
    }

    #[test]
    fn chart_points_keep_gaps_and_labels() {
        let points = series().chart_points();
        assert_eq!(points[0].value, Some(26.85));
        assert_eq!(points[1].value, None);
        assert_eq!(points[0].tick_label, "11/4");
        assert_eq!(points[1].tooltip_label, "Nov 4, 1 AM");
    }

    #[test]
    fn frame_has_time_and_value_columns() -> Result<(), Box<dyn std::error::Error>> {
        let df = series().to_frame()?.frame.collect()?;
        assert_eq!(df.height(), 2);
        assert!(matches!(
            df.column("time")?.dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, None)
        ));
        assert_eq!(df.column("value")?.f64()?.get(0), Some(26.85));
        assert_eq!(df.column("value")?.f64()?.get(1), None);
        Ok(())
    }
}

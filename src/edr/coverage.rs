//! Decoding of CoverageJSON (`f=cf_covjson`) position responses.
//!
//! Only the parts the timeseries chart needs are read: the `step` axis
//! (nanoseconds after the reference time), the `t` axis (reference time,
//! without zone suffix) and the value range for the requested variable.

use crate::edr::error::ResponseError;
use crate::types::geo::LngLat;
use crate::types::timeseries::{Timeseries, TimeseriesSample};
use crate::types::variable::Variable;
use crate::units::RawValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct CoverageDocument {
    pub domain: CoverageDomain,
    #[serde(default)]
    pub ranges: HashMap<String, CoverageRange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverageDomain {
    #[serde(default)]
    pub axes: HashMap<String, CoverageAxis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverageAxis {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverageRange {
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

impl CoverageDocument {
    fn axis(&self, name: &str) -> Result<&CoverageAxis, ResponseError> {
        self.domain
            .axes
            .get(name)
            .ok_or_else(|| ResponseError::MissingField(format!("domain.axes.{}", name)))
    }
}

/// Parses a reference time. The backend omits the zone; these are UTC.
pub fn parse_reference_time(raw: &str) -> Result<DateTime<Utc>, ResponseError> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    if let Ok(dt) = format!("{}Z", raw).parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(ResponseError::InvalidReferenceTime(raw.to_string()))
}

fn step_offset(nanos: f64) -> Result<TimeDelta, ResponseError> {
    if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
        return Err(ResponseError::InvalidStep(nanos));
    }
    Ok(TimeDelta::nanoseconds(nanos.round() as i64))
}

/// Builds the chart timeseries for `variable` at `location`.
///
/// Each raw value is converted to display units here and nowhere else. A
/// missing range or a range shorter than the step axis yields "not available"
/// readings rather than an error.
pub fn decode_timeseries(
    document: &CoverageDocument,
    variable: &Variable,
    location: LngLat,
) -> Result<Timeseries, ResponseError> {
    let steps = &document.axis("step")?.values;
    let reference_raw = document
        .axis("t")?
        .values
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| ResponseError::MissingField("domain.axes.t.values[0]".to_string()))?;
    let reference_time = parse_reference_time(reference_raw)?;

    let values: &[Option<f64>] = match document.ranges.get(variable.code()) {
        Some(range) => &range.values,
        None => {
            warn!(
                "Coverage has no range for '{}', all {} readings will be N/A",
                variable,
                steps.len()
            );
            &[]
        }
    };
    if !values.is_empty() && values.len() != steps.len() {
        warn!(
            "Coverage range for '{}' has {} values for {} steps",
            variable,
            values.len(),
            steps.len()
        );
    }

    let conversion = variable.conversion();
    let samples = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let nanos = step
                .as_f64()
                .ok_or_else(|| ResponseError::MissingField(format!("domain.axes.step.values[{}]", i)))?;
            let raw = RawValue::new(values.get(i).copied().flatten());
            Ok(TimeseriesSample {
                time: reference_time + step_offset(nanos)?,
                value: conversion.apply(raw),
            })
        })
        .collect::<Result<Vec<_>, ResponseError>>()?;

    Ok(Timeseries::new(
        variable.clone(),
        location,
        reference_time,
        samples,
    ))
}

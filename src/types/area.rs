//! Area query results: one sample per grid point inside the drawn polygon and
//! per forecast step.

use crate::edr::locate::SampleLocator;
use crate::filtering::StepBand;
use crate::types::frames::AreaLazyFrame;
use crate::types::geo::{wrap_near, LngLat};
use crate::types::variable::Variable;
use crate::units::DisplayValue;
use polars::prelude::{Column, DataFrame, IntoLazy, NamedFrom, PolarsError, Series};
use std::collections::BTreeMap;

/// One grid point at one forecast step, values in display units.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSample {
    /// Position as reported by the backend (longitude on 0..360).
    pub position: LngLat,
    /// Seconds after the reference time.
    pub step_seconds: f64,
    pub values: BTreeMap<Variable, DisplayValue>,
}

impl AreaSample {
    pub fn value(&self, variable: &Variable) -> DisplayValue {
        self.values
            .get(variable)
            .copied()
            .unwrap_or(DisplayValue::NotAvailable)
    }

    /// Hover popup for this sample, anchored on the world copy nearest `cursor`.
    pub fn popup(&self, cursor: LngLat, variables: &[Variable]) -> Popup {
        let anchor = LngLat {
            lng: wrap_near(self.position.lng, cursor.lng),
            lat: self.position.lat,
        };
        let rows = variables
            .iter()
            .map(|variable| PopupRow {
                label: variable.label().to_string(),
                value: format_with_unit(self.value(variable), variable),
            })
            .collect();
        Popup {
            anchor,
            title: anchor.to_string(),
            rows,
        }
    }
}

fn format_with_unit(value: DisplayValue, variable: &Variable) -> String {
    match value {
        DisplayValue::Value(_) => format!(
            "{}{}",
            value.format(variable.display_precision()),
            variable.display_unit()
        ),
        DisplayValue::NotAvailable => value.to_string(),
    }
}

/// Contents of the hover popup: a heading and a variable/value table.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub anchor: LngLat,
    pub title: String,
    pub rows: Vec<PopupRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupRow {
    pub label: String,
    pub value: String,
}

/// Everything an area query returned.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaResult {
    variables: Vec<Variable>,
    samples: Vec<AreaSample>,
}

impl AreaResult {
    pub fn new(variables: Vec<Variable>, samples: Vec<AreaSample>) -> Self {
        Self { variables, samples }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn samples(&self) -> &[AreaSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The samples inside `band`. Borrowed from the fetched data; nothing is
    /// refetched or converted again.
    pub fn visible(&self, band: StepBand) -> AreaSelection<'_> {
        let samples: Vec<&AreaSample> = self
            .samples
            .iter()
            .filter(|s| band.contains(s.step_seconds))
            .collect();
        AreaSelection {
            band,
            locator: SampleLocator::new(&samples),
            samples,
            variables: &self.variables,
        }
    }

    pub fn to_frame(&self) -> Result<AreaLazyFrame, PolarsError> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.variables.len() + 3);
        columns.push(Column::from(Series::new(
            "lon".into(),
            self.samples.iter().map(|s| s.position.lng).collect::<Vec<f64>>(),
        )));
        columns.push(Column::from(Series::new(
            "lat".into(),
            self.samples.iter().map(|s| s.position.lat).collect::<Vec<f64>>(),
        )));
        columns.push(Column::from(Series::new(
            "step".into(),
            self.samples.iter().map(|s| s.step_seconds).collect::<Vec<f64>>(),
        )));
        for variable in &self.variables {
            let values: Vec<Option<f64>> = self
                .samples
                .iter()
                .map(|s| s.value(variable).value())
                .collect();
            columns.push(Column::from(Series::new(variable.code().into(), values)));
        }
        Ok(AreaLazyFrame::new(DataFrame::new(columns)?.lazy()))
    }
}

/// The part of an [`AreaResult`] shown for one slider position.
#[derive(Debug)]
pub struct AreaSelection<'a> {
    band: StepBand,
    samples: Vec<&'a AreaSample>,
    variables: &'a [Variable],
    locator: SampleLocator,
}

impl<'a> AreaSelection<'a> {
    pub fn band(&self) -> StepBand {
        self.band
    }

    pub fn samples(&self) -> &[&'a AreaSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing falls in the band; shown as "no data".
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The visible sample nearest `cursor`, within `max_distance_km`.
    pub fn nearest(&self, cursor: LngLat, max_distance_km: f64) -> Option<&'a AreaSample> {
        self.locator
            .nearest(cursor, max_distance_km)
            .map(|index| self.samples[index])
    }

    /// Popup for the visible sample under the cursor, if any.
    pub fn popup_at(&self, cursor: LngLat, max_distance_km: f64) -> Option<Popup> {
        self.nearest(cursor, max_distance_km)
            .map(|sample| sample.popup(cursor, self.variables))
    }
}

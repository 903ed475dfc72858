//! Turns a selected geometry and a variable list into an EDR query URL.

use crate::query::error::QueryError;
use crate::types::geo::Geometry;
use crate::types::variable::Variable;
use bon::bon;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;

/// The `time` parameter: a model run date or an exact reference datetime.
///
/// The backend expects no zone suffix; both forms are interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl fmt::Display for QueryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTime::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            QueryTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl QueryTime {
    /// The reference time as a UTC instant; a bare date means midnight.
    pub fn as_utc(&self) -> DateTime<Utc> {
        match self {
            QueryTime::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
            QueryTime::DateTime(dt) => dt.and_utc(),
        }
    }
}

impl From<NaiveDate> for QueryTime {
    fn from(date: NaiveDate) -> Self {
        QueryTime::Date(date)
    }
}

impl From<NaiveDateTime> for QueryTime {
    fn from(dt: NaiveDateTime) -> Self {
        QueryTime::DateTime(dt)
    }
}

/// The `step` parameter: which forecast steps after the reference time to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSpec {
    /// A single step, `1%20hour`, `3%20hours`.
    Hours(u32),
    /// An inclusive span of steps, `1%20hours/6%20hours`.
    Range { start: u32, end: u32 },
    /// Passed through unchanged. Checked against a URL-safe alphabet when
    /// the query is built.
    Raw(String),
}

impl StepSpec {
    pub fn range(start: u32, end: u32) -> Result<Self, QueryError> {
        if start >= end {
            return Err(QueryError::InvalidStepRange { start, end });
        }
        Ok(StepSpec::Range { start, end })
    }

    /// A pass-through step, e.g. `PT1H/PT6H` or `0%20hours/12%20hours`.
    pub fn raw(step: impl Into<String>) -> Result<Self, QueryError> {
        let step = StepSpec::Raw(step.into());
        step.validate()?;
        Ok(step)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        match self {
            StepSpec::Hours(_) => Ok(()),
            StepSpec::Range { start, end } if start >= end => Err(QueryError::InvalidStepRange {
                start: *start,
                end: *end,
            }),
            StepSpec::Range { .. } => Ok(()),
            StepSpec::Raw(raw)
                if !raw.is_empty()
                    && raw
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || "%/-:._".contains(c)) =>
            {
                Ok(())
            }
            StepSpec::Raw(raw) => Err(QueryError::InvalidStep(raw.clone())),
        }
    }
}

impl fmt::Display for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSpec::Hours(1) => f.write_str("1%20hour"),
            StepSpec::Hours(h) => write!(f, "{}%20hours", h),
            StepSpec::Range { start, end } => write!(f, "{}%20hours/{}%20hours", start, end),
            StepSpec::Raw(raw) => f.write_str(raw),
        }
    }
}

/// The `f` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// CoverageJSON, used for point timeseries.
    CoverageJson,
    /// GeoJSON, one feature per sample, used for area scatter.
    GeoJson,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::CoverageJson => "cf_covjson",
            OutputFormat::GeoJson => "geojson",
        }
    }
}

/// A validated request: what to ask for, where, and when.
///
/// Only exists for as long as it takes to render the URL. Built through
/// [`QueryDescriptor::builder`], which refuses degenerate input up front.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    geometry: Geometry,
    variables: Vec<Variable>,
    time: QueryTime,
    step: Option<StepSpec>,
    format: OutputFormat,
}

#[bon]
impl QueryDescriptor {
    /// Validates and assembles a query.
    ///
    /// * `.geometry(...)`: **Required.** A [`crate::LngLat`] or [`crate::Polygon`].
    /// * `.variables(...)`: **Required.** At least one variable; duplicates are dropped.
    /// * `.time(...)`: **Required.** Reference time as a date or naive datetime.
    /// * `.step(StepSpec)`: Optional.
    /// * `.format(OutputFormat)`: Optional. Defaults to CoverageJSON for points and GeoJSON for polygons.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use flux_demos::{LngLat, QueryDescriptor, Variable};
    ///
    /// let query = QueryDescriptor::builder()
    ///     .geometry(LngLat::new(-74.5, 40.0)?)
    ///     .variables(vec![Variable::Temperature2m])
    ///     .time(NaiveDate::from_ymd_opt(2024, 11, 4).unwrap())
    ///     .build()?;
    /// assert_eq!(query.coords(), "POINT(285.5%2040)");
    /// # Ok::<(), flux_demos::QueryError>(())
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] geometry: Geometry,
        variables: Vec<Variable>,
        #[builder(into)] time: QueryTime,
        step: Option<StepSpec>,
        format: Option<OutputFormat>,
    ) -> Result<Self, QueryError> {
        let mut unique: Vec<Variable> = Vec::with_capacity(variables.len());
        for variable in variables {
            if !unique.contains(&variable) {
                unique.push(variable);
            }
        }
        if unique.is_empty() {
            return Err(QueryError::NoVariables);
        }
        for variable in &unique {
            variable.validate()?;
        }
        if let Some(step) = &step {
            step.validate()?;
        }

        let format = format.unwrap_or(match geometry {
            Geometry::Point(_) => OutputFormat::CoverageJson,
            Geometry::Polygon(_) => OutputFormat::GeoJson,
        });

        Ok(Self {
            geometry,
            variables: unique,
            time,
            step,
            format,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn time(&self) -> QueryTime {
        self.time
    }

    pub fn step(&self) -> Option<&StepSpec> {
        self.step.as_ref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The `coords` parameter value.
    pub fn coords(&self) -> String {
        self.geometry.to_wkt()
    }

    /// The `parameter-name` value, comma-joined.
    pub fn parameter_names(&self) -> String {
        self.variables
            .iter()
            .map(Variable::code)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// EDR query type path segment for this geometry.
    pub fn query_type(&self) -> &'static str {
        match self.geometry {
            Geometry::Point(_) => "position",
            Geometry::Polygon(_) => "area",
        }
    }
}

/// An EDR collection base, e.g. `https://host/edr/earthmover-demos/gfs/timeseries/edr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdrEndpoint {
    base: String,
}

impl EdrEndpoint {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Renders the full request URL for a query.
    ///
    /// Parameters are emitted in a fixed order: `coords`, `time`, `step` (when
    /// set), `f`, `parameter-name`.
    pub fn url(&self, query: &QueryDescriptor) -> String {
        let mut url = format!(
            "{}/{}?coords={}&time={}",
            self.base,
            query.query_type(),
            query.coords(),
            query.time()
        );
        if let Some(step) = query.step() {
            url.push_str(&format!("&step={}", step));
        }
        url.push_str(&format!(
            "&f={}&parameter-name={}",
            query.format().as_str(),
            query.parameter_names()
        ));
        url
    }
}

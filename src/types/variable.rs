//! Variable codes understood by the EDR collections, with the display metadata
//! and unit conversion that belongs to each.

use crate::query::error::QueryError;
use crate::units::Conversion;
use std::fmt;
use std::str::FromStr;

/// A requested model variable.
///
/// The three variables the demos chart and map are named; anything else is
/// passed through with no conversion and its code as label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    /// `t2m`: air temperature 2 m above ground, reported in Kelvin.
    Temperature2m,
    /// `prate`: precipitation rate, reported in m/s water equivalent.
    PrecipitationRate,
    /// `gust`: wind gust speed, reported in m/s.
    WindGust,
    /// Any other code, e.g. `u10`.
    Other(String),
}

impl Variable {
    pub fn code(&self) -> &str {
        match self {
            Variable::Temperature2m => "t2m",
            Variable::PrecipitationRate => "prate",
            Variable::WindGust => "gust",
            Variable::Other(code) => code,
        }
    }

    /// Label used in tables and selectors.
    pub fn label(&self) -> &str {
        match self {
            Variable::Temperature2m => "Temperature",
            Variable::PrecipitationRate => "Precipitation",
            Variable::WindGust => "Wind Gust",
            Variable::Other(code) => code,
        }
    }

    pub fn display_unit(&self) -> &'static str {
        match self {
            Variable::Temperature2m => "°C",
            Variable::PrecipitationRate => " mm/hr",
            Variable::WindGust => " m/s",
            Variable::Other(_) => "",
        }
    }

    /// Decimals shown in popups.
    pub fn display_precision(&self) -> usize {
        match self {
            Variable::PrecipitationRate => 2,
            _ => 1,
        }
    }

    pub fn conversion(&self) -> Conversion {
        match self {
            Variable::Temperature2m => Conversion::KelvinToCelsius,
            Variable::PrecipitationRate => Conversion::MetersPerSecondToMmPerHour,
            Variable::WindGust | Variable::Other(_) => Conversion::Identity,
        }
    }

    /// Rejects pass-through codes that could not be sent as a `parameter-name`.
    pub fn validate(&self) -> Result<(), QueryError> {
        match self {
            Variable::Other(code) if !is_safe_code(code) => {
                Err(QueryError::InvalidVariable(code.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Selector entry, e.g. `Air Temperature (°C)`.
    pub fn selector_label(&self) -> String {
        match self {
            Variable::Temperature2m => "Air Temperature (°C)".to_string(),
            Variable::PrecipitationRate => "Precipitation (mm/hr)".to_string(),
            Variable::WindGust => "Wind Gust (m/s)".to_string(),
            Variable::Other(code) => code.clone(),
        }
    }
}

// codes go straight into the query string, keep them to a safe alphabet
fn is_safe_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for Variable {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t2m" => Ok(Variable::Temperature2m),
            "prate" => Ok(Variable::PrecipitationRate),
            "gust" => Ok(Variable::WindGust),
            other if is_safe_code(other) => Ok(Variable::Other(other.to_string())),
            other => Err(QueryError::InvalidVariable(other.to_string())),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

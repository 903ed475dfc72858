//! Conversions from the raw physical units the EDR backend returns to the units
//! shown on popups and charts.
//!
//! Raw numbers arrive wrapped in [`RawValue`] and can only leave as a
//! [`DisplayValue`] through [`Conversion::apply`], which consumes them. A value
//! that has been converted therefore cannot be converted a second time.

use std::fmt;

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Seconds per hour, the factor between `kg m-2 s-1` (≈ mm/s of water) and mm/hr.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// A number exactly as the backend reported it. `None` means the field was
/// missing, `null`, or not a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawValue(Option<f64>);

impl RawValue {
    pub fn new(value: Option<f64>) -> Self {
        Self(value.filter(|v| !v.is_nan()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::new(Some(value))
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        Self::new(value)
    }
}

/// A value in display units, or the explicit "not available" marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayValue {
    Value(f64),
    NotAvailable,
}

impl DisplayValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            DisplayValue::Value(v) => Some(*v),
            DisplayValue::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DisplayValue::Value(_))
    }

    /// Formats with a fixed number of decimals, or `N/A`.
    pub fn format(&self, precision: usize) -> String {
        match self {
            DisplayValue::Value(v) => format!("{:.*}", precision, v),
            DisplayValue::NotAvailable => "N/A".to_string(),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Value(v) => write!(f, "{}", v),
            DisplayValue::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// How a variable's raw value maps to its display value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Kelvin to degrees Celsius.
    KelvinToCelsius,
    /// Precipitation rate in m/s (water equivalent) to mm/hr.
    MetersPerSecondToMmPerHour,
    /// Already in display units (wind gust in m/s, unknown variables).
    Identity,
}

impl Conversion {
    /// Converts a raw value. Missing input short-circuits to [`DisplayValue::NotAvailable`].
    ///
    /// ```
    /// use flux_demos::{Conversion, DisplayValue, RawValue};
    ///
    /// let celsius = Conversion::KelvinToCelsius.apply(RawValue::from(273.15));
    /// assert_eq!(celsius, DisplayValue::Value(0.0));
    ///
    /// let missing = Conversion::KelvinToCelsius.apply(RawValue::missing());
    /// assert_eq!(missing.to_string(), "N/A");
    /// ```
    pub fn apply(self, raw: RawValue) -> DisplayValue {
        let Some(value) = raw.0 else {
            return DisplayValue::NotAvailable;
        };
        DisplayValue::Value(match self {
            Conversion::KelvinToCelsius => kelvin_to_celsius(value),
            Conversion::MetersPerSecondToMmPerHour => mps_to_mm_per_hour(value),
            Conversion::Identity => value,
        })
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn mps_to_mm_per_hour(rate: f64) -> f64 {
    rate * SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_point_is_zero_celsius() {
        assert_eq!(
            Conversion::KelvinToCelsius.apply(RawValue::from(273.15)),
            DisplayValue::Value(0.0)
        );
    }

    #[test]
    fn missing_temperature_is_not_available() {
        let value = Conversion::KelvinToCelsius.apply(RawValue::missing());
        assert_eq!(value, DisplayValue::NotAvailable);
        assert_eq!(value.to_string(), "N/A");
        assert_eq!(value.format(1), "N/A");
    }

    #[test]
    fn nan_counts_as_missing() {
        assert_eq!(
            Conversion::Identity.apply(RawValue::from(f64::NAN)),
            DisplayValue::NotAvailable
        );
    }

    #[test]
    fn precipitation_rate_to_mm_per_hour() {
        let mm = Conversion::MetersPerSecondToMmPerHour
            .apply(RawValue::from(0.0002778))
            .value()
            .unwrap();
        assert!((mm - 1.0).abs() < 1e-3, "got {}", mm);
    }

    #[test]
    fn gust_passes_through() {
        assert_eq!(
            Conversion::Identity.apply(RawValue::from(12.5)),
            DisplayValue::Value(12.5)
        );
    }

    #[test]
    fn format_uses_fixed_precision() {
        assert_eq!(DisplayValue::Value(26.849999).format(2), "26.85");
        assert_eq!(DisplayValue::Value(1.0).format(1), "1.0");
    }
}

use std::fmt;

/// Weather model a demo draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    /// NOAA Global Forecast System.
    Gfs,
    /// NOAA High-Resolution Rapid Refresh (CONUS).
    Hrrr,
    /// ECMWF reanalysis.
    Era5,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dataset::Gfs => "GFS",
            Dataset::Hrrr => "HRRR",
            Dataset::Era5 => "ERA5",
        })
    }
}

use thiserror::Error;

/// Input rejected before any request is built.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Polygon needs at least 3 points, got {points}")]
    DegeneratePolygon { points: usize },

    #[error("At least one variable must be requested")]
    NoVariables,

    #[error("Invalid coordinate (lng {lng}, lat {lat})")]
    InvalidCoordinate { lng: f64, lat: f64 },

    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Invalid variable code '{0}'")]
    InvalidVariable(String),

    #[error("Hour offset {offset} outside allowed range {min}..={max}")]
    HourOffsetOutOfRange { offset: u32, min: u32, max: u32 },

    #[error("Invalid step range {start}..{end}")]
    InvalidStepRange { start: u32, end: u32 },

    #[error("Invalid step '{0}'")]
    InvalidStep(String),

    #[error("Tile ({x}, {y}) does not exist at zoom {z}")]
    InvalidTile { x: u32, y: u32, z: u8 },
}

use thiserror::Error;

/// A response that parsed as JSON but is missing what the views need.
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("Response has no '{0}' field")]
    MissingField(String),

    #[error("Reference time '{0}' is not a valid UTC datetime")]
    InvalidReferenceTime(String),

    #[error("Step offset {0} cannot be represented as a duration")]
    InvalidStep(f64),

    #[error("Feature {index} has no usable point geometry")]
    InvalidFeatureGeometry { index: usize },

    #[error("Feature {index} has no numeric 'step' property")]
    MissingStep { index: usize },
}

pub mod area;
pub mod dataset;
pub mod frames;
pub mod geo;
pub mod timeseries;
pub mod variable;

pub mod descriptor;
pub mod error;

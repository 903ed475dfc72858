pub mod coverage;
pub mod error;
pub mod features;
pub mod loader;
pub mod locate;

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod feature;
pub mod pipeline;
pub mod route;
pub mod scan;
pub mod store;
pub mod utils;

pub use config::{FeatureConfig, Opts};
pub use error::{Error, Result};
pub use pipeline::Pipeline;

pub mod config;
pub mod error;
pub mod estimate;
pub mod tuner;
pub mod utils;


pub use crate::config::OptimizeConfig;
pub use crate::error::TunerError;
pub use crate::estimate::*;
pub use crate::tuner::*;

pub mod config;
pub mod error;

pub use config::LocusConfig;
pub use error::{LocusError, Result};

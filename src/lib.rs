pub mod error;
pub mod axis;
pub mod artifact;
pub mod config;
pub mod record;
pub mod transfer;
pub mod script;
pub mod descriptor;
pub mod generator;
pub mod resolution;
pub mod logging;
pub mod utils;

pub use config::{Config, HostEnv, Packaging, ResolvedConfig};
pub use error::{Error, Result};
pub use generator::{Generator, SweepOutput};

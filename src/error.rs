// error.rs - Error type shared by the generator and the analysis tools

use std::path::PathBuf;
use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a sweep (or an analysis run).
///
/// All variants are terminal: the binaries log them and exit non-zero.
#[derive(Debug, Error)]
pub enum Error {
    /// A file or directory the jobs depend on is absent.
    #[error("missing {what}: {}", .path.display())]
    MissingPrerequisite { what: &'static str, path: PathBuf },

    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    /// Output of a previous sweep is in the way; nothing is overwritten.
    #[error("{} already exists, refusing to overwrite a previous sweep", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot select software stack: {0}")]
    StackDetection(String),

    #[error("descriptor declares {declared} instances, {expected} needed for {records} job records")]
    InstanceCountMismatch { declared: usize, expected: usize, records: usize },

    #[error("'{0}' does not follow the SIM_<detector>_<particle>_<theta>_deg_<energy>_GeV_<events>_evts.<ext> scheme")]
    InvalidArtifactName(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

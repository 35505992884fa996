//! Artifact naming scheme.
//!
//! `SIM_<detector>_<particle>_<theta>_deg_<energy>_GeV_<events>_evts.<ext>`
//!
//! This is the only contract between the generator and whatever consumes
//! the simulation output. Detector names may contain `_`; no other field
//! can (see `axis`), so names are parsed from the right.

use crate::axis::JobSpec;
use crate::error::{Error, Result};

const PREFIX: &str = "SIM";

pub fn stem(spec: &JobSpec) -> String {
    format!(
        "{PREFIX}_{}_{}_{}_deg_{}_GeV_{}_evts",
        spec.detector, spec.particle, spec.theta, spec.energy, spec.events
    )
}

/// A parsed artifact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub spec:      JobSpec,
    pub extension: String,
}

impl Artifact {
    /// Parse a file name (no directory part) back into its job combination.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = || Error::InvalidArtifactName(name.to_string());

        let (stem, extension) = name.rsplit_once('.').ok_or_else(invalid)?;
        if extension.is_empty() || !stem.ends_with("_evts") {
            return Err(invalid());
        }
        let body = stem
            .strip_prefix(PREFIX)
            .and_then(|s| s.strip_prefix('_'))
            .ok_or_else(invalid)?;

        let fields: Vec<&str> = body.split('_').collect();
        // detector (≥1 field) + particle theta deg energy GeV events evts
        if fields.len() < 8 {
            return Err(invalid());
        }
        let tail = &fields[fields.len() - 7..];
        if tail[2] != "deg" || tail[4] != "GeV" || tail[6] != "evts" {
            return Err(invalid());
        }
        let detector = fields[..fields.len() - 7].join("_");
        if detector.is_empty() || tail.iter().any(|f| f.is_empty()) {
            return Err(invalid());
        }

        Ok(Self {
            spec: JobSpec {
                detector,
                particle: tail[0].to_string(),
                theta:    tail[1].to_string(),
                energy:   tail[3].to_string(),
                events:   tail[5].to_string(),
            },
            extension: extension.to_string(),
        })
    }
}

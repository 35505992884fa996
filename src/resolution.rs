// resolution.rs - Transverse-momentum resolution from simulated single-particle samples
//
// Each artifact of a sweep yields one point σ(Δp_T / p²_T,true) at a given
// (θ, p). Points of equal θ are fitted with
//
//     σ(p) = a + b / (p · sin^{3/2} θ)
//
// which is linear in (a, b), so ordinary least squares suffices.

use crate::artifact::Artifact;
use crate::error::{Error, Result};
use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// One reconstructed track matched to its MC particle.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackSample {
    pub artifact: String,
    pub mc_pdg:   i64,
    pub reco_pt:  f64,
    pub mc_pt:    f64,
    /// Polar angle in radians.
    pub mc_theta: f64,
    pub mc_p:     f64,
}

impl TrackSample {
    /// Unmatched or degenerate tracks carry no resolution information.
    pub fn is_usable(&self) -> bool {
        self.mc_pdg != 0 && self.mc_pt != 0.0 && self.mc_theta != 0.0
    }

    /// Δp_T / p²_T,true
    pub fn residual(&self) -> f64 {
        (self.reco_pt - self.mc_pt) / (self.mc_pt * self.mc_pt)
    }
}

/// Per-artifact summary: Gaussian parameters of the residual distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionPoint {
    pub artifact:     String,
    pub theta_deg:    i64,
    pub momentum_gev: i64,
    pub mean:         f64,
    pub sigma:        f64,
    pub n_samples:    usize,
}

/// Fit result for one polar angle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionFit {
    pub theta_deg: i64,
    pub a:         f64,
    pub b:         f64,
    pub a_err:     f64,
    pub b_err:     f64,
    pub n_points:  usize,
}

impl ResolutionFit {
    pub fn eval(&self, p: f64) -> f64 {
        self.a + self.b * lever(p, self.theta_deg as f64)
    }
}

/// Which artifacts take part, mirroring a `<species>*.<ext>` glob.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    pub species:   Option<String>,
    pub extension: Option<String>,
}

impl ArtifactFilter {
    /// Sweep artifacts match on their particle field; anything else on the
    /// file-name prefix.
    pub fn matches(&self, artifact: &str) -> bool {
        let name = Path::new(artifact)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| artifact.to_string());
        if let Some(ext) = &self.extension {
            if !name.ends_with(&format!(".{ext}")) {
                return false;
            }
        }
        match &self.species {
            None => true,
            Some(species) => match Artifact::parse(&name) {
                Ok(a) => a.spec.particle.starts_with(species.as_str()),
                Err(_) => name.starts_with(species.as_str()),
            },
        }
    }
}

/// Samples grouped by artifact.
#[derive(Debug, Default)]
pub struct ResolutionAnalysis {
    samples: BTreeMap<String, Vec<TrackSample>>,
}

impl ResolutionAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, s: TrackSample) {
        if s.is_usable() {
            self.samples.entry(s.artifact.clone()).or_default().push(s);
        }
    }

    pub fn n_artifacts(&self) -> usize {
        self.samples.len()
    }

    /// Read a CSV with header `artifact,mc_pdg,reco_pt,mc_pt,mc_theta,mc_p`.
    pub fn from_csv(path: &Path, filter: &ArtifactFilter) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut analysis = Self::new();
        for row in rdr.deserialize() {
            let s: TrackSample = row?;
            if filter.matches(&s.artifact) {
                analysis.add_sample(s);
            }
        }
        Ok(analysis)
    }

    /// One point per artifact, sorted by (θ, p).
    pub fn points(&self) -> Vec<ResolutionPoint> {
        let mut points: Vec<ResolutionPoint> = self
            .samples
            .par_iter()
            .map(|(artifact, samples)| summarize(artifact, samples))
            .collect();
        points.sort_by(|a, b| {
            (a.theta_deg, a.momentum_gev, &a.artifact).cmp(&(b.theta_deg, b.momentum_gev, &b.artifact))
        });
        points
    }
}

fn summarize(artifact: &str, samples: &[TrackSample]) -> ResolutionPoint {
    let n = samples.len() as f64;
    let residuals: Vec<f64> = samples.iter().map(TrackSample::residual).collect();
    let mean = residuals.iter().sum::<f64>() / n;
    // Maximum-likelihood σ of a Gaussian, i.e. the population standard deviation.
    let sigma = (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();

    let theta = samples.iter().map(|s| s.mc_theta.to_degrees().round()).sum::<f64>() / n;
    let p     = samples.iter().map(|s| s.mc_p.round()).sum::<f64>() / n;

    ResolutionPoint {
        artifact:     artifact.to_string(),
        theta_deg:    theta.round() as i64,
        momentum_gev: p.round() as i64,
        mean,
        sigma,
        n_samples:    samples.len(),
    }
}

/// 1 / (p · sin^{3/2} θ)
fn lever(p: f64, theta_deg: f64) -> f64 {
    1.0 / (p * theta_deg.to_radians().sin().powf(1.5))
}

/// Least-squares fit of `σ = a + b·x`, `x = 1/(p sin^{3/2}θ)`, for one θ.
///
/// Errors are the square roots of the covariance diagonal scaled by the
/// residual variance; with exactly two points they are infinite.
/// Returns `None` with fewer than two distinct momenta.
pub fn fit_resolution(theta_deg: i64, points: &[(f64, f64)]) -> Option<ResolutionFit> {
    let mut momenta: Vec<f64> = points.iter().map(|&(p, _)| p).collect();
    momenta.sort_by(|a, b| a.total_cmp(b));
    momenta.dedup();
    if momenta.len() < 2 || momenta.iter().any(|&p| p <= 0.0) {
        return None;
    }

    let mut ata = Matrix2::<f64>::zeros();
    let mut aty = Vector2::<f64>::zeros();
    for &(p, y) in points {
        let row = Vector2::new(1.0, lever(p, theta_deg as f64));
        ata += row * row.transpose();
        aty += row * y;
    }
    let cov = ata.try_inverse()?;
    let beta = cov * aty;
    let (a, b) = (beta[0], beta[1]);

    let dof = points.len() as f64 - 2.0;
    let (a_err, b_err) = if dof > 0.0 {
        let ss: f64 = points
            .iter()
            .map(|&(p, y)| (y - a - b * lever(p, theta_deg as f64)).powi(2))
            .sum();
        let s2 = ss / dof;
        ((cov[(0, 0)] * s2).sqrt(), (cov[(1, 1)] * s2).sqrt())
    } else {
        (f64::INFINITY, f64::INFINITY)
    };

    Some(ResolutionFit { theta_deg, a, b, a_err, b_err, n_points: points.len() })
}

/// Fit every θ group; groups that cannot be fitted are skipped with a warning.
pub fn fit_by_theta(points: &[ResolutionPoint]) -> Vec<ResolutionFit> {
    let mut groups: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    for pt in points {
        groups.entry(pt.theta_deg).or_default().push((pt.momentum_gev as f64, pt.sigma));
    }
    groups
        .into_iter()
        .filter_map(|(theta, pts)| {
            let fit = fit_resolution(theta, &pts);
            if fit.is_none() {
                warn!(theta, n = pts.len(), "not enough distinct momenta to fit");
            }
            fit
        })
        .collect()
}

/// Write any serializable rows as CSV with a header.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| Error::io(path, e))
}

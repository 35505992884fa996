// axis.rs - Parameter axes and their Cartesian product
//
// The sweep is enumerated in a fixed nested order, outermost first:
//     detector → particle → theta → energy → events
// so job index `i` always maps to the same combination.

use crate::artifact;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// One sweep dimension: a name and an ordered list of string levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterAxis {
    name:   &'static str,
    levels: Vec<String>,
}

impl ParameterAxis {
    pub fn new<I, S>(name: &'static str, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name, levels: levels.into_iter().map(Into::into).collect() }
    }

    pub fn name(&self) -> &'static str { self.name }
    pub fn levels(&self) -> &[String] { &self.levels }
    pub fn len(&self) -> usize { self.levels.len() }
    pub fn is_empty(&self) -> bool { self.levels.is_empty() }

    /// Levels end up in file names and unquoted shell arguments, so only a
    /// conservative character set is accepted. `_` separates the fields of
    /// an artifact name and is therefore reserved for the detector axis
    /// (the name is parsed from the right).
    fn validate(&self, allow_underscore: bool) -> Result<()> {
        if self.levels.is_empty() {
            return Err(Error::InvalidConfig(format!("axis '{}' has no levels", self.name)));
        }
        let mut seen = HashSet::new();
        for level in &self.levels {
            if level.is_empty() {
                return Err(Error::InvalidConfig(format!("axis '{}' has an empty level", self.name)));
            }
            let bad = level.chars().find(|&c| {
                !(c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-') || (allow_underscore && c == '_'))
            });
            if let Some(c) = bad {
                return Err(Error::InvalidConfig(format!(
                    "axis '{}': level '{level}' contains '{c}'", self.name
                )));
            }
            if !seen.insert(level.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "axis '{}': level '{level}' is listed twice", self.name
                )));
            }
        }
        Ok(())
    }
}

/// One element of the Cartesian product of all axes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobSpec {
    pub detector: String,
    pub particle: String,
    pub theta:    String,
    pub energy:   String,
    pub events:   String,
}

impl JobSpec {
    /// Artifact name without extension, e.g. `SIM_CLD_o2_v05_mu-_10_deg_1_GeV_100_evts`.
    pub fn stem(&self) -> String {
        artifact::stem(self)
    }

    /// Full artifact file name for the given format extension.
    pub fn artifact_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.stem())
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} θ={}° E={} GeV n={}",
            self.detector, self.particle, self.theta, self.energy, self.events
        )
    }
}

/// The full set of axes of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    detectors: ParameterAxis,
    particles: ParameterAxis,
    thetas:    ParameterAxis,
    energies:  ParameterAxis,
    events:    ParameterAxis,
}

impl Sweep {
    /// Build and validate a sweep. Fails if any axis is empty, repeats a
    /// level, or carries characters that would break artifact naming.
    pub fn new(
        detectors: ParameterAxis,
        particles: ParameterAxis,
        thetas:    ParameterAxis,
        energies:  ParameterAxis,
        events:    ParameterAxis,
    ) -> Result<Self> {
        detectors.validate(true)?;
        for axis in [&particles, &thetas, &energies, &events] {
            axis.validate(false)?;
        }
        for n in events.levels() {
            match n.parse::<u64>() {
                Ok(v) if v > 0 => {}
                _ => return Err(Error::InvalidConfig(format!(
                    "event count '{n}' is not a positive integer"
                ))),
            }
        }
        Ok(Self { detectors, particles, thetas, energies, events })
    }

    /// Axes in enumeration order, outermost first.
    pub fn axes(&self) -> [&ParameterAxis; 5] {
        [&self.detectors, &self.particles, &self.thetas, &self.energies, &self.events]
    }

    /// Number of combinations: the product of the axis cardinalities.
    pub fn len(&self) -> usize {
        self.axes().iter().map(|a| a.len()).product()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// The combination at position `index` of the enumeration.
    pub fn combination(&self, index: usize) -> Option<JobSpec> {
        if index >= self.len() {
            return None;
        }
        // Mixed-radix decomposition, innermost axis varies fastest.
        let mut rest = index;
        let mut pick = |axis: &ParameterAxis| {
            let level = axis.levels()[rest % axis.len()].clone();
            rest /= axis.len();
            level
        };
        let events   = pick(&self.events);
        let energy   = pick(&self.energies);
        let theta    = pick(&self.thetas);
        let particle = pick(&self.particles);
        let detector = pick(&self.detectors);
        Some(JobSpec { detector, particle, theta, energy, events })
    }

    /// Lazy, restartable enumeration of every combination.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations { sweep: self, next: 0, end: self.len() }
    }
}

/// Iterator over the Cartesian product of a [`Sweep`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    sweep: &'a Sweep,
    next:  usize,
    end:   usize,
}

impl Iterator for Combinations<'_> {
    type Item = JobSpec;

    fn next(&mut self) -> Option<JobSpec> {
        if self.next >= self.end {
            return None;
        }
        let spec = self.sweep.combination(self.next);
        self.next += 1;
        spec
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<JobSpec> {
        self.next = self.next.saturating_add(n).min(self.end);
        self.next()
    }
}

impl ExactSizeIterator for Combinations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Sweep {
        Sweep::new(
            ParameterAxis::new("detector", ["CLD_o2_v05", "CLD_o3_v01"]),
            ParameterAxis::new("particle", ["mu-"]),
            ParameterAxis::new("theta", ["10", "20", "30"]),
            ParameterAxis::new("energy", ["1", "2"]),
            ParameterAxis::new("events", ["100"]),
        )
        .unwrap()
    }

    #[test]
    fn innermost_axis_varies_fastest() {
        let s = small();
        let first: Vec<_> = s.combinations().take(3).map(|c| (c.theta, c.energy)).collect();
        assert_eq!(first, vec![
            ("10".to_string(), "1".to_string()),
            ("10".to_string(), "2".to_string()),
            ("20".to_string(), "1".to_string()),
        ]);
        let last = s.combinations().last().unwrap();
        assert_eq!(last.detector, "CLD_o3_v01");
        assert_eq!(last.theta, "30");
        assert_eq!(last.energy, "2");
    }

    #[test]
    fn nth_matches_random_access() {
        let s = small();
        let mut it = s.combinations();
        assert_eq!(it.nth(7), s.combination(7));
        assert_eq!(it.len(), s.len() - 8);
        assert!(s.combination(s.len()).is_none());
    }

    #[test]
    fn underscore_only_allowed_for_detectors() {
        let err = Sweep::new(
            ParameterAxis::new("detector", ["CLD"]),
            ParameterAxis::new("particle", ["mu_minus"]),
            ParameterAxis::new("theta", ["10"]),
            ParameterAxis::new("energy", ["1"]),
            ParameterAxis::new("events", ["10"]),
        );
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }
}

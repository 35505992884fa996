// config.rs - Sweep configuration (TOML) and its resolution against the host
//
// `Config` is what the user writes; `ResolvedConfig` is what the generator
// consumes. Everything ambient (home directory, working directory,
// environment variables, OS release) is read once into `HostEnv` and only
// ever looked at through it.

use crate::axis::{ParameterAxis, Sweep};
use crate::descriptor::JobFlavour;
use crate::error::{Error, Result};
use crate::transfer::Transfer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const STABLE_SETUP:    &str = "/cvmfs/sw.hsf.org/key4hep/setup.sh";
pub const NIGHTLIES_SETUP: &str = "/cvmfs/sw-nightlies.hsf.org/key4hep/setup.sh";

// -----------------------------------------------------------------------------
// User-facing configuration
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxesConfig {
    #[serde(default = "AxesConfig::default_detectors")]
    pub detectors: Vec<String>,
    #[serde(default = "AxesConfig::default_particles")]
    pub particles: Vec<String>,
    #[serde(default = "AxesConfig::default_thetas")]
    pub thetas: Vec<String>,
    #[serde(default = "AxesConfig::default_energies")]
    pub energies: Vec<String>,
    #[serde(default = "AxesConfig::default_events")]
    pub events: Vec<String>,
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl AxesConfig {
    fn default_detectors() -> Vec<String> { strings(&["CLD_o2_v05"]) }
    fn default_particles() -> Vec<String> { strings(&["mu-", "e-", "pi-"]) }
    fn default_thetas() -> Vec<String> {
        strings(&["10", "20", "30", "40", "50", "60", "70", "80", "89"])
    }
    fn default_energies() -> Vec<String> {
        strings(&["1", "2", "5", "10", "20", "50", "100", "200"])
    }
    fn default_events() -> Vec<String> { strings(&["100"]) }

    pub fn to_sweep(&self) -> Result<Sweep> {
        Sweep::new(
            ParameterAxis::new("detector", self.detectors.iter().cloned()),
            ParameterAxis::new("particle", self.particles.iter().cloned()),
            ParameterAxis::new("theta", self.thetas.iter().cloned()),
            ParameterAxis::new("energy", self.energies.iter().cloned()),
            ParameterAxis::new("events", self.events.iter().cloned()),
        )
    }
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            detectors: Self::default_detectors(),
            particles: Self::default_particles(),
            thetas:    Self::default_thetas(),
            energies:  Self::default_energies(),
            events:    Self::default_events(),
        }
    }
}

/// Which Key4hep software stack the wrappers source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SoftwareStack {
    Stable,
    #[default]
    Nightlies,
    /// Pick from `/etc/os-release`: stable on EL7, nightlies on anything newer.
    /// Unlike a silent fallback, failing to read the release is an error.
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub stack: SoftwareStack,
    /// Explicit setup script; takes precedence over `stack`.
    #[serde(default)]
    pub setup_script: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_executable")]
    pub executable: String,
    #[serde(default = "SimulationConfig::default_steering_file")]
    pub steering_file: String,
    /// Overrides the geometry environment variable when set.
    #[serde(default)]
    pub geometry_root: Option<String>,
    #[serde(default = "SimulationConfig::default_geometry_env")]
    pub geometry_env: String,
    #[serde(default = "SimulationConfig::default_compact_subdir")]
    pub compact_subdir: String,
    #[serde(default = "SimulationConfig::default_output_format")]
    pub output_format: String,
    #[serde(default = "SimulationConfig::default_fixed_flags")]
    pub fixed_flags: Vec<String>,
    /// Additional files the jobs need (checked and shipped with the job).
    #[serde(default)]
    pub extra_inputs: Vec<String>,
    /// Master seed for reproducible per-job seeds; OS entropy when unset.
    #[serde(default)]
    pub master_seed: Option<u64>,
}

impl SimulationConfig {
    fn default_executable() -> String { "ddsim".into() }
    fn default_steering_file() -> String { "~/Public/ddsim_steering_CLD.py".into() }
    fn default_geometry_env() -> String { "K4GEO".into() }
    fn default_compact_subdir() -> String { "FCCee/CLD/compact".into() }
    fn default_output_format() -> String { "root".into() }
    fn default_fixed_flags() -> Vec<String> { strings(&["--random.enableEventSeed"]) }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            executable:     Self::default_executable(),
            steering_file:  Self::default_steering_file(),
            geometry_root:  None,
            geometry_env:   Self::default_geometry_env(),
            compact_subdir: Self::default_compact_subdir(),
            output_format:  Self::default_output_format(),
            fixed_flags:    Self::default_fixed_flags(),
            extra_inputs:   Vec::new(),
            master_seed:    None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransferKind {
    #[default]
    Copy,
    Move,
    Xrootd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_job_dir")]
    pub job_dir: String,
    /// Defaults to `<job_dir>/arguments.txt`.
    #[serde(default)]
    pub argument_table: Option<String>,
    /// Where the simulation writes inside the batch sandbox.
    #[serde(default = "OutputConfig::default_working_dir")]
    pub working_dir: String,
    /// Durable destination of the artifacts.
    #[serde(default = "OutputConfig::default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub transfer: TransferKind,
    #[serde(default = "OutputConfig::default_entry_point")]
    pub xrootd_entry_point: String,
    #[serde(default = "OutputConfig::default_marker_suffix")]
    pub marker_suffix: String,
    #[serde(default = "OutputConfig::default_diagnostics_dir")]
    pub diagnostics_dir: String,
}

impl OutputConfig {
    fn default_job_dir() -> String { "condor_jobs".into() }
    fn default_working_dir() -> String { ".".into() }
    fn default_output_dir() -> String { "~/condor_output".into() }
    fn default_entry_point() -> String { "root://eosuser.cern.ch".into() }
    fn default_marker_suffix() -> String { "kk".into() }
    fn default_diagnostics_dir() -> String { "~/Public".into() }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            job_dir:            Self::default_job_dir(),
            argument_table:     None,
            working_dir:        Self::default_working_dir(),
            output_dir:         Self::default_output_dir(),
            transfer:           TransferKind::default(),
            xrootd_entry_point: Self::default_entry_point(),
            marker_suffix:      Self::default_marker_suffix(),
            diagnostics_dir:    Self::default_diagnostics_dir(),
        }
    }
}

/// How a batch instance obtains its job record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Packaging {
    /// One `run_job.sh` that picks line `$(ProcId)` of the argument table.
    #[default]
    ArgumentTable,
    /// One script per job, queued by file glob.
    PerJob,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    #[serde(default)]
    pub packaging: Packaging,
    /// Ship steering file and argument table into the job sandbox.
    #[serde(default = "BatchConfig::default_transfer_inputs")]
    pub transfer_inputs: bool,
    #[serde(default = "BatchConfig::default_job_flavour")]
    pub job_flavour: Option<JobFlavour>,
    #[serde(default = "BatchConfig::default_accounting_group")]
    pub accounting_group: Option<String>,
    /// Jobs run back to back by one batch instance.
    #[serde(default = "BatchConfig::default_jobs_per_instance")]
    pub jobs_per_instance: usize,
}

impl BatchConfig {
    fn default_transfer_inputs() -> bool { true }
    fn default_job_flavour() -> Option<JobFlavour> { Some(JobFlavour::Microcentury) }
    fn default_accounting_group() -> Option<String> { Some("group_u_FCC.local_gen".into()) }
    fn default_jobs_per_instance() -> usize { 1 }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            packaging:        Packaging::default(),
            transfer_inputs:  Self::default_transfer_inputs(),
            job_flavour:      Self::default_job_flavour(),
            accounting_group: Self::default_accounting_group(),
            jobs_per_instance: Self::default_jobs_per_instance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub axes: AxesConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&text).map_err(|source| Error::ConfigParse { path: path.to_path_buf(), source })
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Validate and resolve against the host. Nothing is checked on disk yet;
    /// that is the generator's pre-flight.
    pub fn resolve(&self, host: &HostEnv) -> Result<ResolvedConfig> {
        let sweep = self.axes.to_sweep()?;

        let sim = &self.simulation;
        let out = &self.output;

        let geometry_root = match &sim.geometry_root {
            Some(root) => host.expand(root)?,
            None => {
                let raw = host
                    .var(&sim.geometry_env)
                    .ok_or_else(|| Error::MissingEnvVar(sim.geometry_env.clone()))?;
                host.expand(raw)?
            }
        };

        let job_dir = host.expand(&out.job_dir)?;
        let argument_table = match &out.argument_table {
            Some(p) => host.expand(p)?,
            None => job_dir.join("arguments.txt"),
        };

        let transfer = match out.transfer {
            TransferKind::Copy => Transfer::Copy,
            TransferKind::Move => Transfer::Move,
            TransferKind::Xrootd => {
                if !out.xrootd_entry_point.starts_with("root://") {
                    return Err(Error::InvalidConfig(format!(
                        "xrootd entry point '{}' must start with root://", out.xrootd_entry_point
                    )));
                }
                Transfer::Xrootd { entry_point: out.xrootd_entry_point.clone() }
            }
        };
        // A remote destination is a path on the storage system, not on this host.
        let output_dir = match transfer {
            Transfer::Xrootd { .. } if !out.output_dir.starts_with('/') => {
                return Err(Error::InvalidConfig(format!(
                    "remote output_dir '{}' must be absolute", out.output_dir
                )));
            }
            Transfer::Xrootd { .. } => PathBuf::from(&out.output_dir),
            _ => host.expand(&out.output_dir)?,
        };

        if sim.output_format.is_empty() || !sim.output_format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(format!("bad output format '{}'", sim.output_format)));
        }
        if self.batch.jobs_per_instance == 0 {
            return Err(Error::InvalidConfig("jobs_per_instance must be at least 1".into()));
        }
        if out.marker_suffix.is_empty() || !out.marker_suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(format!("bad marker suffix '{}'", out.marker_suffix)));
        }

        let resolved = ResolvedConfig {
            sweep,
            setup_script:     self.environment.setup_script_for(host)?,
            executable:       sim.executable.clone(),
            steering_file:    host.expand(&sim.steering_file)?,
            geometry_root,
            compact_subdir:   sim.compact_subdir.trim_matches('/').to_string(),
            output_format:    sim.output_format.clone(),
            fixed_flags:      sim.fixed_flags.clone(),
            extra_inputs:     sim.extra_inputs.iter().map(|p| host.expand(p)).collect::<Result<_>>()?,
            master_seed:      sim.master_seed,
            job_dir,
            argument_table,
            working_dir:      out.working_dir.trim_end_matches('/').to_string(),
            output_dir,
            transfer,
            marker_suffix:    out.marker_suffix.clone(),
            diagnostics_dir:  host.expand(&out.diagnostics_dir)?,
            packaging:        self.batch.packaging,
            transfer_inputs:  self.batch.transfer_inputs,
            job_flavour:      self.batch.job_flavour,
            accounting_group: self.batch.accounting_group.clone(),
            jobs_per_instance: self.batch.jobs_per_instance,
        };
        resolved.check_shell_safe()?;
        Ok(resolved)
    }
}

impl EnvironmentConfig {
    fn setup_script_for(&self, host: &HostEnv) -> Result<String> {
        if let Some(script) = &self.setup_script {
            return Ok(script.clone());
        }
        let stack = match self.stack {
            SoftwareStack::Auto => {
                let text = host
                    .os_release
                    .as_deref()
                    .ok_or_else(|| Error::StackDetection("/etc/os-release is not readable".into()))?;
                stack_for_os_release(text)?
            }
            other => other,
        };
        Ok(match stack {
            SoftwareStack::Stable => STABLE_SETUP.to_string(),
            _ => NIGHTLIES_SETUP.to_string(),
        })
    }
}

/// EL7 hosts get the stable stack, newer releases the nightlies.
pub fn stack_for_os_release(text: &str) -> Result<SoftwareStack> {
    let version = text
        .lines()
        .find_map(|l| l.strip_prefix("VERSION_ID="))
        .map(|v| v.trim().trim_matches('"'))
        .ok_or_else(|| Error::StackDetection("no VERSION_ID in os-release".into()))?;
    let major: u32 = version
        .split('.')
        .next()
        .and_then(|m| m.parse().ok())
        .ok_or_else(|| Error::StackDetection(format!("unrecognised VERSION_ID '{version}'")))?;
    Ok(if major > 7 { SoftwareStack::Nightlies } else { SoftwareStack::Stable })
}

// -----------------------------------------------------------------------------
// Host snapshot
// -----------------------------------------------------------------------------

/// Process-wide state captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct HostEnv {
    pub home:       Option<PathBuf>,
    pub cwd:        PathBuf,
    pub vars:       HashMap<String, String>,
    pub os_release: Option<String>,
}

impl HostEnv {
    pub fn capture() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(Self {
            home:       std::env::var_os("HOME").map(PathBuf::from),
            cwd,
            vars:       std::env::vars().collect(),
            os_release: fs::read_to_string("/etc/os-release").ok(),
        })
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// `~/x` → `$HOME/x`, relative → under the working directory.
    pub fn expand(&self, raw: &str) -> Result<PathBuf> {
        let path = if raw == "~" || raw.starts_with("~/") {
            let home = self.home.as_ref().ok_or_else(|| Error::MissingEnvVar("HOME".into()))?;
            home.join(raw.trim_start_matches('~').trim_start_matches('/'))
        } else {
            PathBuf::from(raw)
        };
        Ok(if path.is_absolute() { path } else { self.cwd.join(path) })
    }
}

// -----------------------------------------------------------------------------
// Resolved configuration
// -----------------------------------------------------------------------------

/// Fully resolved, validated input of the generator.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub sweep:            Sweep,
    pub setup_script:     String,
    pub executable:       String,
    pub steering_file:    PathBuf,
    pub geometry_root:    PathBuf,
    pub compact_subdir:   String,
    pub output_format:    String,
    pub fixed_flags:      Vec<String>,
    pub extra_inputs:     Vec<PathBuf>,
    pub master_seed:      Option<u64>,
    pub job_dir:          PathBuf,
    pub argument_table:   PathBuf,
    pub working_dir:      String,
    pub output_dir:       PathBuf,
    pub transfer:         Transfer,
    pub marker_suffix:    String,
    pub diagnostics_dir:  PathBuf,
    pub packaging:        Packaging,
    pub transfer_inputs:  bool,
    pub job_flavour:      Option<JobFlavour>,
    pub accounting_group: Option<String>,
    pub jobs_per_instance: usize,
}

impl ResolvedConfig {
    /// Batch instances needed for `records` jobs.
    pub fn instance_count(&self, records: usize) -> usize {
        records.div_ceil(self.jobs_per_instance)
    }

    /// Paths and flags are written unquoted into the argument table and the
    /// wrappers; whitespace, quotes or shell metacharacters would split them
    /// or expand differently in the two packagings.
    fn check_shell_safe(&self) -> Result<()> {
        let unsafe_char = |s: &str| {
            s.chars().any(|c| {
                c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '\\' | '$' | ';' | '&' | '|' | '<' | '>')
            })
        };
        let mut fields: Vec<(&str, String)> = vec![
            ("setup_script", self.setup_script.clone()),
            ("executable", self.executable.clone()),
            ("steering_file", self.steering_file.display().to_string()),
            ("geometry_root", self.geometry_root.display().to_string()),
            ("compact_subdir", self.compact_subdir.clone()),
            ("working_dir", self.working_dir.clone()),
            ("output_dir", self.output_dir.display().to_string()),
            ("diagnostics_dir", self.diagnostics_dir.display().to_string()),
            ("argument_table", self.argument_table.display().to_string()),
        ];
        fields.extend(self.fixed_flags.iter().map(|f| ("fixed_flags", f.clone())));
        fields.extend(self.extra_inputs.iter().map(|p| ("extra_inputs", p.display().to_string())));
        for (name, value) in fields {
            if value.is_empty() || unsafe_char(&value) {
                return Err(Error::InvalidConfig(format!("{name} '{value}' is empty or not shell-safe")));
            }
        }
        Ok(())
    }

    /// Name under which the steering file is passed to the simulation:
    /// its basename when shipped into the sandbox, the full path otherwise.
    pub fn steering_reference(&self) -> String {
        if self.transfer_inputs {
            if let Some(name) = self.steering_file.file_name() {
                return name.to_string_lossy().into_owned();
            }
        }
        self.steering_file.display().to_string()
    }

    /// Same rule for the argument table as seen from inside a running job.
    pub fn argument_table_reference(&self) -> String {
        if self.transfer_inputs {
            if let Some(name) = self.argument_table.file_name() {
                return name.to_string_lossy().into_owned();
            }
        }
        self.argument_table.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostEnv {
        let mut vars = HashMap::new();
        vars.insert("K4GEO".to_string(), "/opt/k4geo".to_string());
        HostEnv {
            home: Some(PathBuf::from("/home/alice")),
            cwd: PathBuf::from("/work"),
            vars,
            os_release: None,
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [axes]
            thetas = ["10", "20"]

            [batch]
            packaging = "per-job"
            job_flavour = "workday"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.axes.thetas, vec!["10", "20"]);
        assert_eq!(cfg.axes.particles, vec!["mu-", "e-", "pi-"]);
        assert_eq!(cfg.batch.packaging, Packaging::PerJob);
        assert_eq!(cfg.batch.job_flavour, Some(JobFlavour::Workday));
        assert!(cfg.batch.transfer_inputs);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("[axes]\ntheta = [\"10\"]\n").is_err());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = Config::default().to_toml().unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.axes.energies, AxesConfig::default().energies);
        assert_eq!(back.output.job_dir, "condor_jobs");
    }

    #[test]
    fn resolve_expands_home_and_cwd() {
        let r = Config::default().resolve(&host()).unwrap();
        assert_eq!(r.steering_file, PathBuf::from("/home/alice/Public/ddsim_steering_CLD.py"));
        assert_eq!(r.job_dir, PathBuf::from("/work/condor_jobs"));
        assert_eq!(r.argument_table, PathBuf::from("/work/condor_jobs/arguments.txt"));
        assert_eq!(r.geometry_root, PathBuf::from("/opt/k4geo"));
        assert_eq!(r.setup_script, NIGHTLIES_SETUP);
        assert_eq!(r.steering_reference(), "ddsim_steering_CLD.py");
        assert_eq!(r.sweep.len(), 1 * 3 * 9 * 8 * 1);
    }

    #[test]
    fn missing_geometry_variable_is_fatal() {
        let mut h = host();
        h.vars.clear();
        assert!(matches!(Config::default().resolve(&h), Err(Error::MissingEnvVar(v)) if v == "K4GEO"));
    }

    #[test]
    fn auto_stack_requires_os_release() {
        let mut cfg = Config::default();
        cfg.environment.stack = SoftwareStack::Auto;
        assert!(matches!(cfg.resolve(&host()), Err(Error::StackDetection(_))));

        let mut h = host();
        h.os_release = Some("NAME=\"CentOS Linux\"\nVERSION_ID=\"7\"\n".into());
        assert_eq!(cfg.resolve(&h).unwrap().setup_script, STABLE_SETUP);
        h.os_release = Some("NAME=\"AlmaLinux\"\nVERSION_ID=\"9.3\"\n".into());
        assert_eq!(cfg.resolve(&h).unwrap().setup_script, NIGHTLIES_SETUP);
    }

    #[test]
    fn whitespace_in_paths_is_rejected() {
        let mut cfg = Config::default();
        cfg.output.output_dir = "/data/my output".into();
        assert!(matches!(cfg.resolve(&host()), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn shell_metacharacters_are_rejected() {
        for dir in ["/data/$USER/out", "/data/a;rm", "/data/a&b", "/data/a|b", "/data/a>b"] {
            let mut cfg = Config::default();
            cfg.output.output_dir = dir.into();
            assert!(matches!(cfg.resolve(&host()), Err(Error::InvalidConfig(_))), "{dir} accepted");
        }
        let mut cfg = Config::default();
        cfg.simulation.fixed_flags = vec!["--random.enableEventSeed;".into()];
        assert!(matches!(cfg.resolve(&host()), Err(Error::InvalidConfig(_))));

        let mut cfg = Config::default();
        cfg.simulation.fixed_flags.push("--part.minimalKineticEnergy".into());
        cfg.simulation.fixed_flags.push("1*MeV".into());
        assert!(cfg.resolve(&host()).is_ok());
    }

    #[test]
    fn jobs_per_instance_rounds_instances_up() {
        let mut cfg = Config::default();
        cfg.batch.jobs_per_instance = 0;
        assert!(matches!(cfg.resolve(&host()), Err(Error::InvalidConfig(_))));

        cfg.batch.jobs_per_instance = 4;
        let r = cfg.resolve(&host()).unwrap();
        assert_eq!(r.instance_count(6), 2);
        assert_eq!(r.instance_count(8), 2);
        assert_eq!(r.instance_count(216), 54);
        assert_eq!(Config::default().resolve(&host()).unwrap().instance_count(6), 6);
    }
}

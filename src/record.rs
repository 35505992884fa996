// record.rs - One job of the sweep with its simulation arguments

use crate::axis::JobSpec;
use crate::config::ResolvedConfig;

/// A combination plus everything needed to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    /// Position in the enumeration; equals the HTCondor `$(ProcId)`.
    pub index:        usize,
    pub spec:         JobSpec,
    pub artifact:     String,
    /// Where the simulation writes inside the job sandbox.
    pub local_output: String,
    /// Durable destination of the artifact.
    pub final_output: String,
    pub seed:         u64,
    /// Simulation arguments, one flag or value per element.
    pub args:         Vec<String>,
}

impl JobRecord {
    /// Deterministic for a given (config, combination, seed).
    pub fn render(cfg: &ResolvedConfig, index: usize, spec: JobSpec, seed: u64) -> Self {
        let artifact     = spec.artifact_name(&cfg.output_format);
        let local_output = format!("{}/{artifact}", cfg.working_dir);
        let final_output = cfg.output_dir.join(&artifact).display().to_string();

        let compact = cfg
            .geometry_root
            .join(&cfg.compact_subdir)
            .join(&spec.detector)
            .join(format!("{}.xml", spec.detector));

        let mut args: Vec<String> = vec![
            "--compactFile".into(),        compact.display().to_string(),
            "--outputFile".into(),         local_output.clone(),
            "--steeringFile".into(),       cfg.steering_reference(),
            "--random.seed".into(),        seed.to_string(),
            "--numberOfEvents".into(),     spec.events.clone(),
            "--enableGun".into(),
            "--gun.particle".into(),       spec.particle.clone(),
            "--gun.energy".into(),         format!("{}*GeV", spec.energy),
            "--gun.distribution".into(),   "uniform".into(),
            "--gun.thetaMin".into(),       format!("{}*deg", spec.theta),
            "--gun.thetaMax".into(),       format!("{}*deg", spec.theta),
        ];
        args.extend(cfg.fixed_flags.iter().cloned());

        Self { index, spec, artifact, local_output, final_output, seed, args }
    }

    /// Simulation arguments as a single command-line string.
    pub fn argument_string(&self) -> String {
        self.args.join(" ")
    }

    /// Fields of this record's argument-table line.
    pub fn table_fields(&self) -> impl Iterator<Item = &str> {
        [self.local_output.as_str(), self.final_output.as_str()]
            .into_iter()
            .chain(self.args.iter().map(String::as_str))
    }

    /// File name of the per-job wrapper.
    pub fn script_name(&self) -> String {
        format!("{}.sh", self.spec.stem())
    }
}

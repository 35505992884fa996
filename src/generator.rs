//! Parameter-sweep job generator.
//!
//! One synchronous pass from a [`ResolvedConfig`] to a job directory holding
//! the argument table, the wrapper script(s) and the submit descriptor.
//! Pre-flight checks run before anything is created; if a write fails
//! afterwards the freshly created job directory is removed again.

use crate::axis::Combinations;
use crate::config::{Packaging, ResolvedConfig};
use crate::descriptor::{BatchDescriptor, QueueRule, DESCRIPTOR_NAME};
use crate::error::{Error, Result};
use crate::record::JobRecord;
use crate::script::{self, PER_JOB_PATTERN, RUNNER_NAME};
use crate::utils::rng::SeedStream;
use csv::{QuoteStyle, WriterBuilder};
use indicatif::ProgressBar;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What `write_outputs` produced.
#[derive(Debug, Clone)]
pub struct SweepOutput {
    pub job_dir:        PathBuf,
    pub argument_table: PathBuf,
    pub scripts:        Vec<PathBuf>,
    pub descriptor:     PathBuf,
    pub records:        usize,
    pub instances:      usize,
}

pub struct Generator {
    cfg: ResolvedConfig,
}

impl Generator {
    pub fn new(cfg: ResolvedConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.cfg
    }

    /// All combinations in enumeration order; restartable.
    pub fn enumerate(&self) -> Combinations<'_> {
        self.cfg.sweep.combinations()
    }

    /// A new seed stream per call, so every pass gets fresh seeds.
    fn seeds(&self) -> SeedStream {
        match self.cfg.master_seed {
            Some(master) => SeedStream::from_master(master),
            None => SeedStream::from_entropy(),
        }
    }

    pub fn render_job_record(&self, index: usize, seed: u64) -> Option<JobRecord> {
        let spec = self.cfg.sweep.combination(index)?;
        Some(JobRecord::render(&self.cfg, index, spec, seed))
    }

    /// Lazily render every job record with its own seed.
    pub fn records(&self) -> impl Iterator<Item = JobRecord> + '_ {
        self.enumerate()
            .zip(self.seeds())
            .enumerate()
            .map(move |(index, (spec, seed))| JobRecord::render(&self.cfg, index, spec, seed))
    }

    // -------------------------------------------------------------------------
    // Pre-flight
    // -------------------------------------------------------------------------

    /// Refuse to run on missing inputs or leftovers of a previous sweep.
    pub fn preflight(&self) -> Result<()> {
        let cfg = &self.cfg;

        require_file("steering file", &cfg.steering_file)?;
        require_dir("geometry directory", &cfg.geometry_root)?;
        // A bare name is looked up on PATH after the stack is sourced, on the
        // worker node; only explicit paths can be checked here.
        let exe = Path::new(&cfg.executable);
        if exe.components().count() > 1 {
            require_file("simulation executable", exe)?;
        }
        for input in &cfg.extra_inputs {
            require_file("extra input", input)?;
        }

        for path in [&cfg.job_dir, &cfg.argument_table] {
            if path.exists() {
                return Err(Error::AlreadyExists { path: path.clone() });
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Descriptor
    // -------------------------------------------------------------------------

    /// Descriptor for `records` jobs, `jobs_per_instance` of them per instance.
    pub fn descriptor(&self, records: usize) -> BatchDescriptor {
        let cfg = &self.cfg;
        let instances = cfg.instance_count(records);

        let mut inputs = Vec::new();
        if cfg.transfer_inputs {
            inputs.push(cfg.steering_file.display().to_string());
            if cfg.packaging == Packaging::ArgumentTable {
                inputs.push(cfg.argument_table.display().to_string());
            }
            inputs.extend(cfg.extra_inputs.iter().map(|p| p.display().to_string()));
        }

        let (executable, arguments, queue) = match cfg.packaging {
            Packaging::ArgumentTable => (
                RUNNER_NAME.to_string(),
                Some("$(ProcId)".to_string()),
                QueueRule::Count(instances),
            ),
            Packaging::PerJob => (
                "$(filename)".to_string(),
                None,
                QueueRule::Matching { pattern: PER_JOB_PATTERN.to_string(), matched: instances },
            ),
        };

        BatchDescriptor {
            executable,
            arguments,
            transfer_input_files: inputs,
            job_flavour: cfg.job_flavour,
            accounting_group: cfg.accounting_group.clone(),
            queue,
        }
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Run pre-flight, then write table, wrappers and descriptor.
    pub fn write_outputs(&self, bar: &ProgressBar) -> Result<SweepOutput> {
        self.preflight()?;
        let cfg = &self.cfg;

        if cfg.transfer.is_local() {
            fs::create_dir_all(&cfg.output_dir).map_err(|e| Error::io(&cfg.output_dir, e))?;
        }
        if let Some(parent) = cfg.job_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        // Non-recursive: fails if a concurrent run created it first.
        fs::create_dir(&cfg.job_dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists { path: cfg.job_dir.clone() },
            _ => Error::io(&cfg.job_dir, e),
        })?;
        info!(job_dir = %cfg.job_dir.display(), "created job directory");

        match self.write_into_job_dir(bar) {
            Ok(out) => Ok(out),
            Err(err) => {
                warn!("generation failed, removing {}", cfg.job_dir.display());
                if let Err(e) = fs::remove_dir_all(&cfg.job_dir) {
                    warn!("could not remove {}: {e}", cfg.job_dir.display());
                }
                let ours = !matches!(&err, Error::AlreadyExists { path } if *path == cfg.argument_table);
                if ours && !cfg.argument_table.starts_with(&cfg.job_dir) {
                    let _ = fs::remove_file(&cfg.argument_table);
                }
                Err(err)
            }
        }
    }

    fn write_into_job_dir(&self, bar: &ProgressBar) -> Result<SweepOutput> {
        let cfg = &self.cfg;
        bar.set_length(cfg.sweep.len() as u64);

        let table_file = create_new(&cfg.argument_table)?;
        let mut table = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .flexible(true)
            .from_writer(table_file);

        let mut scripts = Vec::new();
        let mut chunk = Vec::with_capacity(cfg.jobs_per_instance);
        let mut count = 0usize;
        for record in self.records() {
            table.write_record(record.table_fields())?;
            debug!(index = record.index, seed = record.seed, artifact = %record.artifact, "job record");
            count += 1;
            bar.inc(1);
            if cfg.packaging == Packaging::PerJob {
                chunk.push(record);
                if chunk.len() == cfg.jobs_per_instance {
                    scripts.push(self.write_chunk(scripts.len(), &chunk)?);
                    chunk.clear();
                }
            }
        }
        if !chunk.is_empty() {
            scripts.push(self.write_chunk(scripts.len(), &chunk)?);
        }
        table.flush().map_err(|e| Error::io(&cfg.argument_table, e))?;

        if cfg.packaging == Packaging::ArgumentTable {
            let path = cfg.job_dir.join(RUNNER_NAME);
            write_executable(&path, &script::table_runner(cfg))?;
            scripts.push(path);
        }

        let descriptor = self.descriptor(count);
        let expected = cfg.instance_count(cfg.sweep.len());
        let declared = descriptor.instance_count();
        let per_job_ok = cfg.packaging != Packaging::PerJob || scripts.len() == expected;
        if declared != expected || count != cfg.sweep.len() || !per_job_ok {
            return Err(Error::InstanceCountMismatch { declared, expected, records: count });
        }
        let descriptor_path = cfg.job_dir.join(DESCRIPTOR_NAME);
        let mut f = create_new(&descriptor_path)?;
        f.write_all(descriptor.render().as_bytes())
            .map_err(|e| Error::io(&descriptor_path, e))?;

        bar.finish();
        info!(records = count, instances = declared, scripts = scripts.len(), "sweep written");

        Ok(SweepOutput {
            job_dir:        cfg.job_dir.clone(),
            argument_table: cfg.argument_table.clone(),
            scripts,
            descriptor:     descriptor_path,
            records:        count,
            instances:      declared,
        })
    }

    fn write_chunk(&self, chunk: usize, records: &[JobRecord]) -> Result<PathBuf> {
        let path = self.cfg.job_dir.join(script::per_job_script_name(&self.cfg, chunk, records));
        write_executable(&path, &script::per_job_script(&self.cfg, records))?;
        Ok(path)
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::MissingPrerequisite { what, path: path.to_path_buf() })
    }
}

fn require_dir(what: &'static str, path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::MissingPrerequisite { what, path: path.to_path_buf() })
    }
}

fn create_new(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists { path: path.to_path_buf() },
            _ => Error::io(path, e),
        })
}

fn write_executable(path: &Path, contents: &str) -> Result<()> {
    let mut f = create_new(path)?;
    f.write_all(contents.as_bytes()).map_err(|e| Error::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}

//! Generate an HTCondor parameter sweep of single-particle detector simulations
//! (see `sweep --print-config` for every run parameter).
//
//  Generate:  `cargo run --release -- --config sweep.toml`
//  Submit:    `cd condor_jobs && condor_submit condor_script.sub`

use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use sweep::{Config, Generator, HostEnv, Packaging};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "sweep", version, about = "Write Condor job files for a simulation parameter sweep")]
struct Cli {
    /// Sweep configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Job directory (must not exist yet)
    #[arg(long)]
    job_dir: Option<String>,

    /// Durable output directory for the artifacts
    #[arg(long)]
    output_dir: Option<String>,

    /// How instances find their job
    #[arg(long, value_enum)]
    packaging: Option<Packaging>,

    /// Jobs run back to back by each batch instance
    #[arg(long)]
    jobs_per_instance: Option<usize>,

    /// Master seed for reproducible per-job seeds
    #[arg(long)]
    master_seed: Option<u64>,

    /// Check and preview, but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors, no progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = if cli.quiet { -1 } else { cli.verbose.min(i8::MAX as u8) as i8 };
    sweep::logging::init(verbosity);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cli.job_dir         { cfg.output.job_dir = dir; }
    if let Some(dir) = cli.output_dir      { cfg.output.output_dir = dir; }
    if let Some(p)   = cli.packaging       { cfg.batch.packaging = p; }
    if let Some(k)   = cli.jobs_per_instance { cfg.batch.jobs_per_instance = k; }
    if let Some(s)   = cli.master_seed     { cfg.simulation.master_seed = Some(s); }

    if cli.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    let host = HostEnv::capture()?;
    let resolved = cfg.resolve(&host)?;
    let generator = Generator::new(resolved);
    let rc = generator.config();

    println!("Sweep configuration:");
    for axis in rc.sweep.axes() {
        println!("  {:<9} {:>3} × {}", axis.name(), axis.len(), axis.levels().join(" "));
    }
    println!(
        "  → {} jobs in {} instance(s), packaging {:?}, transfer {}",
        rc.sweep.len(),
        rc.instance_count(rc.sweep.len()),
        rc.packaging,
        rc.transfer.describe()
    );
    info!(setup = %rc.setup_script, steering = %rc.steering_file.display(), "environment");

    if cli.dry_run {
        generator.preflight()?;
        for record in generator.records().take(3) {
            println!("\n[{}] {}\n    {} {}", record.index, record.artifact, rc.executable, record.argument_string());
        }
        println!("\n{}", generator.descriptor(rc.sweep.len()).render());
        println!("Dry run: nothing written.");
        return Ok(());
    }

    let bar = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(rc.sweep.len() as u64);
        if let Ok(style) = ProgressStyle::with_template(" {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]") {
            bar.set_style(style);
        }
        bar
    };

    let out = generator.write_outputs(&bar)?;

    println!("\nWrote {} job records for {} instance(s):", out.records, out.instances);
    println!("  arguments  {}", out.argument_table.display());
    println!("  wrappers   {} script(s) in {}", out.scripts.len(), out.job_dir.display());
    println!("  descriptor {}", out.descriptor.display());
    println!("\nTo submit:");
    println!("  cd {} && condor_submit {}", out.job_dir.display(), sweep::descriptor::DESCRIPTOR_NAME);
    Ok(())
}

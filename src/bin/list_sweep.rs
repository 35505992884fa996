// src/bin/list_sweep.rs - List every job of a sweep without generating it

use clap::Parser;
use csv::WriterBuilder;
use std::path::PathBuf;
use sweep::Config;

#[derive(Parser)]
struct Cli {
    /// Sweep configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file
    #[arg(long, default_value = "sweep.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    sweep::logging::init(0);

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let sweep = cfg.axes.to_sweep()?;
    let ext = &cfg.simulation.output_format;

    let mut wtr = WriterBuilder::new().from_path(&args.output)?;
    wtr.write_record(["index", "detector", "particle", "theta_deg", "energy_gev", "events", "artifact"])?;
    for (i, spec) in sweep.combinations().enumerate() {
        wtr.write_record([
            i.to_string(),
            spec.detector.clone(),
            spec.particle.clone(),
            spec.theta.clone(),
            spec.energy.clone(),
            spec.events.clone(),
            spec.artifact_name(ext),
        ])?;
    }
    wtr.flush()?;

    println!("Listed {} jobs in {}", sweep.len(), args.output.display());
    for axis in sweep.axes() {
        println!("  {}: {}", axis.name(), axis.levels().join(", "));
    }
    Ok(())
}

// src/bin/resolution_fit.rs - Momentum resolution vs. p, one fit per polar angle

use clap::Parser;
use std::path::PathBuf;
use sweep::resolution::{fit_by_theta, write_csv, ArtifactFilter, ResolutionAnalysis};
use tracing::info;

#[derive(Parser)]
struct Cli {
    /// Matched-track samples: artifact,mc_pdg,reco_pt,mc_pt,mc_theta,mc_p
    #[arg(long)]
    input: PathBuf,

    /// Only artifacts of this particle species (prefix match, e.g. "mu")
    #[arg(long)]
    species: Option<String>,

    /// Only artifacts with this extension
    #[arg(long, default_value = "root")]
    extension: String,

    /// Per-artifact σ(Δp_T/p_T²) points
    #[arg(long, default_value = "resolution_points.csv")]
    points: PathBuf,

    /// Fit parameters per θ
    #[arg(long, default_value = "resolution_fit.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    sweep::logging::init(0);

    let filter = ArtifactFilter { species: args.species.clone(), extension: Some(args.extension.clone()) };
    println!("Reading {}", args.input.display());
    let analysis = ResolutionAnalysis::from_csv(&args.input, &filter)?;
    info!(artifacts = analysis.n_artifacts(), "samples loaded");

    let points = analysis.points();
    write_csv(&args.points, &points)?;

    let fits = fit_by_theta(&points);
    write_csv(&args.output, &fits)?;

    println!("\nσ(Δp_T / p²_T) = a + b / (p · sin^3/2 θ)");
    println!("  {:>5}  {:>12}  {:>12}  {:>12}  {:>12}  {:>3}", "θ", "a", "±", "b", "±", "n");
    for f in &fits {
        println!(
            "  {:>5}  {:>12.3e}  {:>12.3e}  {:>12.3e}  {:>12.3e}  {:>3}",
            f.theta_deg, f.a, f.a_err, f.b, f.b_err, f.n_points
        );
    }
    println!("\n{} points → {}", points.len(), args.points.display());
    println!("{} fits   → {}", fits.len(), args.output.display());
    Ok(())
}

use anyhow::Context;
use clap::Parser;
use generator::profile::build_rays;
use rlancore::LocatorConfig;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline RLAN interference locator driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Gates per synthetic ray
    #[arg(long)]
    n_gates: Option<usize>,
    /// Number of synthetic rays
    #[arg(long)]
    n_rays: Option<usize>,
    /// Seed for the ray generator
    #[arg(long)]
    seed: Option<u64>,
    /// Print the locator parameters before running
    #[arg(long, default_value_t = false)]
    print_params: bool,
    /// Write per-gate diagnostics for every ray as JSON lines
    #[arg(long)]
    diagnostics: Option<PathBuf>,
    /// Write the run summary as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    }
    .with_overrides(args.n_gates, args.n_rays, args.seed);

    if args.print_params {
        print_params(&workflow_config.locator)?;
    }

    let rays = build_rays(&workflow_config.generator, workflow_config.n_rays)
        .context("generating synthetic rays")?;
    let runner = Runner::new(workflow_config.clone());
    let result = runner.execute(&rays, args.diagnostics.is_some())?;

    println!(
        "RLAN run -> rays {}, skipped {}, flagged gates {}, outside interference {}",
        result.metrics.rays_processed,
        result.metrics.rays_skipped,
        result.total_flagged(),
        result.total_false_alarms()
    );

    if let Some(path) = &args.diagnostics {
        create_parent(path)?;
        let file = File::create(path)
            .with_context(|| format!("creating diagnostics file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for output in &result.outputs {
            let line = output.to_json().context("serializing ray diagnostics")?;
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
    }

    if let Some(path) = &args.report {
        create_parent(path)?;
        let report = serde_json::to_string_pretty(&result).context("serializing run report")?;
        fs::write(path, report).with_context(|| format!("writing report {}", path.display()))?;
    }

    Ok(())
}

fn print_params(config: &LocatorConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    config
        .print_params(&mut out)
        .context("printing locator parameters")?;
    Ok(())
}

fn create_parent(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}
